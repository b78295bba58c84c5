//! Shared types and constants for the neo-nomad voice backend.
//!
//! This crate holds the definitions that cross crate boundaries: the provider
//! request enums (locale, model, encoding, channel layout) and the fixed PCM
//! format every synthesized frame is delivered in.

pub mod voice;

pub use voice::{AudioEncoding, ChannelLayout, Locale, SpeechModel};

/// Sample rate of every PCM frame handed to the media transport.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;

/// Channel count of every PCM frame handed to the media transport.
pub const OUTPUT_CHANNELS: u16 = 1;

/// Bytes per sample (signed 16-bit little-endian).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Wall-clock duration of one frame in milliseconds.
pub const FRAME_DURATION_MS: u32 = 20;

/// Samples per channel in one frame (480 at 24 kHz).
pub const SAMPLES_PER_FRAME: u32 = OUTPUT_SAMPLE_RATE * FRAME_DURATION_MS / 1000;

/// Payload length of one frame in bytes (960 at 24 kHz, mono, 16-bit).
pub const FRAME_BYTES: usize =
    SAMPLES_PER_FRAME as usize * OUTPUT_CHANNELS as usize * BYTES_PER_SAMPLE;
