use neo_types::{AudioEncoding, SpeechModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Murf streaming synthesis endpoint.
pub const DEFAULT_TTS_API_URL: &str = "https://api.murf.ai/v1/speech/stream";

/// Voice a new session starts with.
pub const DEFAULT_VOICE_ID: &str = "en-US-zion";

/// Voice forced for Devanagari text.
pub const DEFAULT_HINDI_VOICE_ID: &str = "en-US-matthew";

fn default_token_ttl_seconds() -> u64 {
    6 * 3600
}

fn default_room_prefix() -> String {
    "neo-nomad-".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    #[serde(default)]
    pub url: String,
    /// Browser-facing URL handed out with join tokens. Empty means `url`.
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// JWT token TTL in seconds for LiveKit join tokens. Default: 21600 (6 hours).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
    /// Prefix of the per-user room name.
    #[serde(default = "default_room_prefix")]
    pub room_prefix: String,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            public_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
            room_prefix: default_room_prefix(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("public_url", &self.public_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("room_prefix", &self.room_prefix)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_TTS_API_URL.to_string()
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_hindi_voice_id() -> String {
    DEFAULT_HINDI_VOICE_ID.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_failure_backoff_ms() -> u64 {
    1000
}

fn default_decode_workers() -> usize {
    crate::pool::DEFAULT_DECODE_WORKERS
}

/// Settings for the remote synthesis provider and the decode pipeline.
#[derive(Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default)]
    pub model: SpeechModel,
    #[serde(default)]
    pub format: AudioEncoding,
    /// Voice a session starts with until a control signal changes it.
    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,
    /// Voice forced for Devanagari text.
    #[serde(default = "default_hindi_voice_id")]
    pub hindi_voice_id: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Pause before reporting a failed provider request.
    #[serde(default = "default_failure_backoff_ms")]
    pub failure_backoff_ms: u64,
    /// Concurrent decode jobs.
    #[serde(default = "default_decode_workers")]
    pub decode_workers: usize,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            model: SpeechModel::default(),
            format: AudioEncoding::default(),
            default_voice_id: default_voice_id(),
            hindi_voice_id: default_hindi_voice_id(),
            request_timeout_secs: default_request_timeout_secs(),
            failure_backoff_ms: default_failure_backoff_ms(),
            decode_workers: default_decode_workers(),
        }
    }
}

impl fmt::Debug for TtsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtsConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("format", &self.format)
            .field("default_voice_id", &self.default_voice_id)
            .field("hindi_voice_id", &self.hindi_voice_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("failure_backoff_ms", &self.failure_backoff_ms)
            .field("decode_workers", &self.decode_workers)
            .finish()
    }
}

impl TtsConfig {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_millis(self.failure_backoff_ms)
    }
}
