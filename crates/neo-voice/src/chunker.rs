//! Re-segments a continuous PCM byte stream into fixed 20 ms frames.

use crate::frame::{AudioFrame, SynthesizedAudio};
use neo_types::FRAME_BYTES;

/// Per-utterance frame chunker.
///
/// Bytes are appended with [`push`](Self::push) and full frames are taken
/// with [`next_frame`](Self::next_frame). The sub-frame remainder stays in
/// the decode buffer until more bytes arrive or [`finish`](Self::finish)
/// pads it with silence.
#[derive(Debug)]
pub struct FrameChunker {
    request_id: String,
    buffer: Vec<u8>,
    pushed: usize,
}

impl FrameChunker {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            buffer: Vec::with_capacity(FRAME_BYTES * 2),
            pushed: 0,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Appends decoded PCM to the decode buffer.
    pub fn push(&mut self, pcm: &[u8]) {
        self.buffer.extend_from_slice(pcm);
        self.pushed += pcm.len();
    }

    /// Total PCM bytes pushed so far, before padding.
    pub fn pushed_bytes(&self) -> usize {
        self.pushed
    }

    /// Bytes waiting for a frame boundary.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Takes the next full frame off the front of the buffer, if any.
    pub fn next_frame(&mut self) -> Option<SynthesizedAudio> {
        if self.buffer.len() < FRAME_BYTES {
            return None;
        }
        let data: Vec<u8> = self.buffer.drain(..FRAME_BYTES).collect();
        Some(self.tag(data))
    }

    /// Ends the stream. A non-empty remainder is zero-padded to a full frame;
    /// an empty buffer yields nothing.
    ///
    /// Must be called after draining [`next_frame`](Self::next_frame).
    pub fn finish(mut self) -> Option<SynthesizedAudio> {
        debug_assert!(self.buffer.len() < FRAME_BYTES);
        if self.buffer.is_empty() {
            return None;
        }
        let mut data = std::mem::take(&mut self.buffer);
        data.resize(FRAME_BYTES, 0);
        Some(self.tag(data))
    }

    fn tag(&self, data: Vec<u8>) -> SynthesizedAudio {
        SynthesizedAudio {
            request_id: self.request_id.clone(),
            frame: AudioFrame::from_pcm(data),
        }
    }
}
