use crate::chunker::FrameChunker;
use crate::client::SpeechClient;
use crate::config::TtsConfig;
use crate::decoder::decode_to_pcm;
use crate::error::VoiceError;
use crate::frame::SynthesizedAudio;
use crate::pool::DecodePool;
use crate::selector::{VoicePreference, VoiceSelector};
use crate::sink::FrameSink;
use crate::text::sanitize_text;
use neo_types::{AudioEncoding, Locale};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One unit of text on its way to the provider.
///
/// Built at the start of a synthesis request with the voice and locale chosen
/// for it; never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub request_id: String,
    pub text: String,
    pub voice_id: String,
    pub locale: Locale,
}

/// Outcome of a fully delivered utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisReport {
    pub request_id: String,
    pub voice_id: String,
    pub locale: Locale,
    /// Frames enqueued on the sink, including the padded final frame.
    pub frames: usize,
    /// PCM bytes produced by the decoder, before padding.
    pub pcm_bytes: usize,
}

/// Service for turning text into a frame sequence on a [`FrameSink`].
///
/// Cheap to clone. Concurrent calls are allowed, but two utterances written
/// to the same sink must be serialized by the caller or their frames will
/// interleave.
#[derive(Debug, Clone)]
pub struct TtsService {
    client: SpeechClient,
    selector: VoiceSelector,
    pool: DecodePool,
    failure_backoff: Duration,
}

impl TtsService {
    /// Creates a new `TtsService` from provider and pipeline settings.
    pub fn new(config: &TtsConfig) -> Result<Self, VoiceError> {
        Ok(Self {
            client: SpeechClient::new(config)?,
            selector: VoiceSelector::new(config.hindi_voice_id.clone()),
            pool: DecodePool::new(config.decode_workers),
            failure_backoff: config.failure_backoff(),
        })
    }

    pub fn selector(&self) -> &VoiceSelector {
        &self.selector
    }

    /// Sanitizes `text` and picks its voice from the current preference.
    pub fn prepare(&self, text: &str, preference: &VoicePreference) -> Utterance {
        let text = sanitize_text(text);
        let selection = self.selector.select(&text, preference);
        Utterance {
            request_id: Uuid::new_v4().to_string(),
            text,
            voice_id: selection.voice_id,
            locale: selection.locale,
        }
    }

    /// Synthesizes `text` and streams its frames into `sink`.
    ///
    /// Returns once every frame of the utterance has been enqueued. On
    /// [`VoiceError::SynthesisFailed`] nothing was enqueued and the call waits
    /// out the failure backoff first. On [`VoiceError::DecodeFailed`] frames
    /// enqueued before the failure stay valid. Cancelling the sink's flag
    /// abandons the request and returns [`VoiceError::Cancelled`].
    pub async fn synthesize(
        &self,
        text: &str,
        preference: &VoicePreference,
        sink: &FrameSink,
    ) -> Result<SynthesisReport, VoiceError> {
        let utterance = self.prepare(text, preference);
        self.synthesize_utterance(utterance, sink).await
    }

    pub async fn synthesize_utterance(
        &self,
        utterance: Utterance,
        sink: &FrameSink,
    ) -> Result<SynthesisReport, VoiceError> {
        let cancel = sink.cancel_flag().clone();
        if cancel.is_cancelled() {
            return Err(VoiceError::Cancelled);
        }

        debug!(
            request_id = %utterance.request_id,
            voice_id = %utterance.voice_id,
            locale = %utterance.locale,
            chars = utterance.text.chars().count(),
            "starting synthesis"
        );

        let fetched = tokio::select! {
            result = self.client.fetch(&utterance.text, &utterance.voice_id, utterance.locale) => result,
            () = cancel.cancelled() => return Err(VoiceError::Cancelled),
        };

        let payload = match fetched {
            Ok(payload) => payload,
            Err(e) => {
                warn!(request_id = %utterance.request_id, "TTS request failed: {}", e);
                // Keep a failing provider from being hammered by immediate resubmits.
                tokio::select! {
                    () = tokio::time::sleep(self.failure_backoff) => {}
                    () = cancel.cancelled() => return Err(VoiceError::Cancelled),
                }
                return Err(e);
            }
        };

        let encoding = self.client.format();
        let job_sink = sink.clone();
        let request_id = utterance.request_id.clone();
        let (frames, pcm_bytes) = self
            .pool
            .run(move || decode_into_sink(payload, encoding, request_id, &job_sink))
            .await
            .inspect_err(|e| {
                if !matches!(e, VoiceError::Cancelled) {
                    warn!(request_id = %utterance.request_id, "TTS decode failed: {}", e);
                }
            })?;

        info!(
            request_id = %utterance.request_id,
            voice_id = %utterance.voice_id,
            locale = %utterance.locale,
            frames,
            "synthesis complete"
        );

        Ok(SynthesisReport {
            request_id: utterance.request_id,
            voice_id: utterance.voice_id,
            locale: utterance.locale,
            frames,
            pcm_bytes,
        })
    }
}

/// Decodes `payload`, chunks the PCM into frames, and enqueues them.
///
/// Returns `(frames, pcm_bytes)`. On error the sub-frame remainder is dropped
/// rather than padded.
pub fn decode_into_sink(
    payload: Vec<u8>,
    encoding: AudioEncoding,
    request_id: String,
    sink: &FrameSink,
) -> Result<(usize, usize), VoiceError> {
    decode_into(payload, encoding, request_id, |audio| sink.send(audio))
}

/// Frames decoded PCM and hands each frame to `deliver` in order.
///
/// The padded final frame is only produced after a clean end of stream; any
/// error from the decoder or from `deliver` stops delivery at once.
pub(crate) fn decode_into<F>(
    payload: Vec<u8>,
    encoding: AudioEncoding,
    request_id: String,
    mut deliver: F,
) -> Result<(usize, usize), VoiceError>
where
    F: FnMut(SynthesizedAudio) -> Result<(), VoiceError>,
{
    let mut chunker = FrameChunker::new(request_id);
    let mut frames = 0usize;

    decode_to_pcm(payload, encoding, |pcm| {
        chunker.push(pcm);
        while let Some(audio) = chunker.next_frame() {
            deliver(audio)?;
            frames += 1;
        }
        Ok(())
    })?;

    let pcm_bytes = chunker.pushed_bytes();
    if let Some(last) = chunker.finish() {
        deliver(last)?;
        frames += 1;
    }
    Ok((frames, pcm_bytes))
}
