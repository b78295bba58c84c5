//! HTTP client for the remote speech synthesis provider.

use crate::config::TtsConfig;
use crate::error::VoiceError;
use neo_types::{AudioEncoding, ChannelLayout, Locale, SpeechModel, OUTPUT_SAMPLE_RATE};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

/// Provider error bodies are truncated to this many bytes in error messages.
const MAX_ERROR_BODY_BYTES: usize = 512;

/// JSON body of a synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechRequest<'a> {
    pub voice_id: &'a str,
    pub text: &'a str,
    pub multi_native_locale: Locale,
    pub model: SpeechModel,
    pub format: AudioEncoding,
    #[serde(rename = "sampleRate")]
    pub sample_rate: u32,
    #[serde(rename = "channelType")]
    pub channel_type: ChannelLayout,
}

/// Posts synthesis requests and returns the compressed payload.
#[derive(Clone)]
pub struct SpeechClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: SpeechModel,
    format: AudioEncoding,
}

impl fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechClient")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("format", &self.format)
            .finish()
    }
}

impl SpeechClient {
    /// Builds a client with the configured hard request timeout.
    pub fn new(config: &TtsConfig) -> Result<Self, VoiceError> {
        if config.api_key.trim().is_empty() {
            return Err(VoiceError::Config(
                "TTS API key is not configured. Set tts.api_key in config \
                 or the MURF_API_KEY environment variable."
                    .to_string(),
            ));
        }

        if config.request_timeout_secs == 0 {
            return Err(VoiceError::Config(
                "tts.request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model,
            format: config.format,
        })
    }

    /// Encoding the provider is asked to answer with.
    pub fn format(&self) -> AudioEncoding {
        self.format
    }

    /// Performs one synthesis request. `text` must already be sanitized.
    ///
    /// Any transport error, timeout, or non-200 status is a
    /// [`VoiceError::SynthesisFailed`]; the body of a failed response is never
    /// treated as audio.
    pub async fn fetch(
        &self,
        text: &str,
        voice_id: &str,
        locale: Locale,
    ) -> Result<Vec<u8>, VoiceError> {
        if text.is_empty() {
            return Err(VoiceError::synthesis("nothing to synthesize: text is empty"));
        }
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::synthesis(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let body = SpeechRequest {
            voice_id,
            text,
            multi_native_locale: locale,
            model: self.model,
            format: self.format,
            sample_rate: OUTPUT_SAMPLE_RATE,
            channel_type: ChannelLayout::Mono,
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                VoiceError::synthesis(format!("provider request {}: {}", kind, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = truncate(&body, MAX_ERROR_BODY_BYTES);
            warn!(status = status.as_u16(), body, "TTS provider rejected request");
            return Err(VoiceError::SynthesisFailed {
                status: Some(status.as_u16()),
                message: format!("provider returned {}: {}", status, body),
            });
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| VoiceError::synthesis(format!("failed to read provider payload: {}", e)))?;

        debug!(bytes = payload.len(), voice_id, %locale, "received synthesis payload");
        Ok(payload.to_vec())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
