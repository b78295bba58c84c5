use neo_types::{BYTES_PER_SAMPLE, FRAME_BYTES, OUTPUT_CHANNELS, OUTPUT_SAMPLE_RATE};
use std::time::Duration;

/// One block of interleaved s16le PCM ready for the media transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub num_channels: u16,
    pub samples_per_channel: u32,
}

impl AudioFrame {
    /// Wraps PCM bytes in the fixed output format (24 kHz mono s16le).
    pub fn from_pcm(data: Vec<u8>) -> Self {
        let samples_per_channel =
            (data.len() / (BYTES_PER_SAMPLE * OUTPUT_CHANNELS as usize)) as u32;
        Self {
            data,
            sample_rate: OUTPUT_SAMPLE_RATE,
            num_channels: OUTPUT_CHANNELS,
            samples_per_channel,
        }
    }

    /// Playback duration of this frame.
    pub fn duration(&self) -> Duration {
        Duration::from_micros(
            u64::from(self.samples_per_channel) * 1_000_000 / u64::from(self.sample_rate),
        )
    }

    /// Returns `true` if the payload is exactly one full output frame.
    pub fn is_full_frame(&self) -> bool {
        self.data.len() == FRAME_BYTES
    }

    /// Decodes the payload back into samples.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.data
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
    }
}

/// A frame tagged with the correlation id of the utterance that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub request_id: String,
    pub frame: AudioFrame,
}
