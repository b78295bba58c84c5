use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("LiveKit API error: {0}")]
    LiveKit(#[from] livekit_api::access_token::AccessTokenError),

    #[error("Room service error: {0}")]
    RoomService(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The provider request failed: transport error, timeout, or a non-200
    /// status. `status` is set when the provider answered.
    #[error("synthesis failed: {message}")]
    SynthesisFailed {
        status: Option<u16>,
        message: String,
    },

    /// The payload could not be decoded into PCM.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// The owning session was torn down before the utterance finished.
    #[error("synthesis cancelled")]
    Cancelled,
}

impl VoiceError {
    pub(crate) fn synthesis(message: impl Into<String>) -> Self {
        Self::SynthesisFailed {
            status: None,
            message: message.into(),
        }
    }
}
