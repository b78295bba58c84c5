use crate::error::VoiceError;
use crate::selector::{voice_preference, VoiceControl, VoicePreference};
use crate::sink::{CancelFlag, FrameReceiver, FrameSink};
use crate::tts::{SynthesisReport, TtsService};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// The agent's voice in one LiveKit room.
///
/// Owns the room's voice preference and output sink. Utterances are spoken
/// one at a time so frames of different utterances never interleave on the
/// sink. The media transport consumes the [`FrameReceiver`] returned by
/// [`connect`](Self::connect).
#[derive(Debug)]
pub struct AgentVoiceSession {
    room_name: String,
    tts: Arc<TtsService>,
    control: VoiceControl,
    preference: VoicePreference,
    sink: FrameSink,
    cancel: CancelFlag,
    speaking: Mutex<()>,
}

impl AgentVoiceSession {
    /// Opens a session for `room_name` starting with `default_voice_id`.
    pub fn connect(
        room_name: &str,
        tts: Arc<TtsService>,
        default_voice_id: &str,
    ) -> (Self, FrameReceiver) {
        info!(room = room_name, voice_id = default_voice_id, "agent voice session opened");

        let cancel = CancelFlag::new();
        let (sink, frames) = FrameSink::channel(cancel.clone());
        let (control, preference) = voice_preference(default_voice_id);

        let session = Self {
            room_name: room_name.to_string(),
            tts,
            control,
            preference,
            sink,
            cancel,
            speaking: Mutex::new(()),
        };
        (session, frames)
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// Changes the voice used for subsequent utterances.
    ///
    /// An utterance already in flight keeps the voice it started with.
    pub fn set_voice(&self, voice_id: &str) -> Result<(), VoiceError> {
        self.control.set_voice(voice_id)?;
        info!(room = %self.room_name, voice_id = voice_id.trim(), "switching voice");
        Ok(())
    }

    pub fn current_voice(&self) -> String {
        self.preference.current()
    }

    /// Speaks `text`, waiting for any earlier utterance to finish first.
    pub async fn say(&self, text: &str) -> Result<SynthesisReport, VoiceError> {
        let _turn = tokio::select! {
            guard = self.speaking.lock() => guard,
            () = self.cancel.cancelled() => return Err(VoiceError::Cancelled),
        };
        self.tts.synthesize(text, &self.preference, &self.sink).await
    }

    /// Tears the session down. In-flight synthesis is abandoned and no further
    /// frame reaches the receiver.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            info!(room = %self.room_name, "agent voice session closed");
            self.cancel.cancel();
        }
    }

    /// Flag raised by [`close`](Self::close). The frame consumer watches it
    /// so queued frames of a closed session are never played.
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn is_closed(&self) -> bool {
        self.sink.is_closed()
    }
}

impl Drop for AgentVoiceSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
