//! Voice pipeline for the neo-nomad agent.
//!
//! Turns text utterances into a real-time sequence of 20 ms PCM frames for
//! the LiveKit media transport. The provider answers each synthesis request
//! with one complete compressed payload; this crate decodes it, resamples it
//! to 24 kHz mono s16le, re-chunks it into fixed 960-byte frames, and hands
//! the frames to an ordered, non-blocking sink tagged with the utterance's
//! correlation id.
//!
//! Pipeline, leaves first:
//!
//! - [`client`]: one HTTP request per utterance to the provider.
//! - [`decoder`]: container/codec decode plus streaming resample.
//! - [`chunker`]: fixed-size framing with silence padding at end of stream.
//! - [`selector`]: per-utterance voice/locale choice from the session's
//!   voice preference.
//! - [`sink`]: the output channel and its cancellation flag.
//!
//! [`TtsService`] wires these together; [`AgentVoiceSession`] owns one room's
//! preference and sink and serializes its utterances. [`VoiceService`] issues
//! LiveKit join tokens and manages rooms.

pub mod agent;
pub mod chunker;
pub mod client;
pub mod config;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod pool;
pub mod selector;
pub mod service;
pub mod sink;
pub mod text;
pub mod tts;

pub use agent::AgentVoiceSession;
pub use chunker::FrameChunker;
pub use client::SpeechClient;
pub use config::{LiveKitConfig, TtsConfig, DEFAULT_HINDI_VOICE_ID, DEFAULT_VOICE_ID};
pub use error::VoiceError;
pub use frame::{AudioFrame, SynthesizedAudio};
pub use pool::DecodePool;
pub use selector::{voice_preference, VoiceControl, VoicePreference, VoiceSelection, VoiceSelector};
pub use service::VoiceService;
pub use sink::{CancelFlag, FrameReceiver, FrameSink};
pub use text::{contains_devanagari, sanitize_text};
pub use tts::{SynthesisReport, TtsService, Utterance};
