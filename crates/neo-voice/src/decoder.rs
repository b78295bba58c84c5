//! Compressed audio decoding and resampling to the fixed output format.
//!
//! The decoder walks the container packet by packet, down-mixes each decoded
//! block to mono, streams it through a resampler to 24 kHz, and hands s16le
//! bytes to a callback as soon as they are available. Everything here is
//! blocking CPU work and runs on the decode pool, never on the async runtime.

use crate::error::VoiceError;
use neo_types::{AudioEncoding, OUTPUT_SAMPLE_RATE};
use rubato::{FftFixedIn, Resampler};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Input frames per resampler pass.
const RESAMPLE_CHUNK: usize = 1024;

/// FFT sub-chunks per resampler pass.
const RESAMPLE_SUB_CHUNKS: usize = 2;

/// Upper bound on zero-fed passes used to drain the resampler delay line.
const MAX_FLUSH_PASSES: usize = 8;

/// What the decoder saw in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    pub input_sample_rate: u32,
    pub input_channels: usize,
    /// PCM bytes handed to the callback (24 kHz mono s16le).
    pub pcm_bytes: usize,
}

/// Decodes `payload` and streams 24 kHz mono s16le PCM into `on_pcm`.
///
/// Blocks arrive in temporal order. An error returned by `on_pcm` aborts
/// decoding and is passed through unchanged; bytes already delivered stay
/// delivered.
pub fn decode_to_pcm<F>(
    payload: Vec<u8>,
    encoding: AudioEncoding,
    mut on_pcm: F,
) -> Result<DecodeStats, VoiceError>
where
    F: FnMut(&[u8]) -> Result<(), VoiceError>,
{
    if payload.is_empty() {
        return Err(VoiceError::DecodeFailed("empty audio payload".to_string()));
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(payload)), Default::default());
    let mut hint = Hint::new();
    hint.with_extension(encoding.extension());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| VoiceError::DecodeFailed(format!("unrecognized audio container: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| VoiceError::DecodeFailed("no decodable audio track".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| VoiceError::DecodeFailed(format!("unsupported codec: {}", e)))?;

    let mut stats = DecodeStats {
        input_sample_rate: track.codec_params.sample_rate.unwrap_or(0),
        input_channels: track.codec_params.channels.map(|c| c.count()).unwrap_or(0),
        pcm_bytes: 0,
    };
    let mut resampler: Option<StreamResampler> = None;
    let mut mono = Vec::new();
    let mut pcm = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(VoiceError::DecodeFailed(format!(
                    "failed to read packet: {}",
                    e
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                debug!(error = e, "skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(VoiceError::DecodeFailed(format!("decoder error: {}", e))),
        };

        let spec = *decoded.spec();
        if decoded.frames() == 0 {
            continue;
        }
        let channels = spec.channels.count().max(1);
        let mut samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        samples.copy_interleaved_ref(decoded);

        downmix(samples.samples(), channels, &mut mono);
        stats.input_sample_rate = spec.rate;
        stats.input_channels = channels;

        let current = match resampler.take() {
            Some(r) if r.input_rate() == spec.rate => r,
            Some(mut stale) => {
                // Sample rate changed mid-stream: drain the old resampler first.
                let tail = stale.flush()?;
                stats.pcm_bytes += emit(&tail, &mut pcm, &mut on_pcm)?;
                StreamResampler::new(spec.rate)?
            }
            None => StreamResampler::new(spec.rate)?,
        };
        let resampler = resampler.insert(current);

        let out = resampler.push(&mono)?;
        stats.pcm_bytes += emit(&out, &mut pcm, &mut on_pcm)?;
    }

    if let Some(mut resampler) = resampler {
        let tail = resampler.flush()?;
        stats.pcm_bytes += emit(&tail, &mut pcm, &mut on_pcm)?;
    }

    if stats.pcm_bytes == 0 {
        return Err(VoiceError::DecodeFailed(
            "payload contained no audio samples".to_string(),
        ));
    }

    Ok(stats)
}

/// Averages interleaved channels into `out` (cleared first).
fn downmix(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    out.clear();
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

/// Converts `samples` to s16le into the reusable `scratch` buffer and passes
/// it on. Returns the number of bytes delivered.
fn emit<F>(samples: &[f32], scratch: &mut Vec<u8>, on_pcm: &mut F) -> Result<usize, VoiceError>
where
    F: FnMut(&[u8]) -> Result<(), VoiceError>,
{
    if samples.is_empty() {
        return Ok(0);
    }
    scratch.clear();
    scratch.extend(samples.iter().flat_map(|&s| f32_to_i16(s).to_le_bytes()));
    on_pcm(scratch)?;
    Ok(scratch.len())
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Streaming mono resampler to the output rate.
///
/// Keeps its own input remainder between pushes, drops the leading output
/// delay, and on [`flush`](Self::flush) trims the tail so the total output is
/// `ceil(input_len * 24000 / input_rate)` samples. Input already at 24 kHz
/// passes through untouched.
pub(crate) struct StreamResampler {
    input_rate: u32,
    inner: Option<FftFixedIn<f32>>,
    pending: Vec<f32>,
    consumed: usize,
    produced: usize,
    skip: usize,
}

impl StreamResampler {
    pub(crate) fn new(input_rate: u32) -> Result<Self, VoiceError> {
        if input_rate == 0 {
            return Err(VoiceError::DecodeFailed(
                "stream reports a sample rate of 0".to_string(),
            ));
        }

        let inner = if input_rate == OUTPUT_SAMPLE_RATE {
            None
        } else {
            Some(
                FftFixedIn::<f32>::new(
                    input_rate as usize,
                    OUTPUT_SAMPLE_RATE as usize,
                    RESAMPLE_CHUNK,
                    RESAMPLE_SUB_CHUNKS,
                    1,
                )
                .map_err(|e| VoiceError::DecodeFailed(format!("resampler setup failed: {}", e)))?,
            )
        };
        let skip = inner.as_ref().map(|r| r.output_delay()).unwrap_or(0);

        Ok(Self {
            input_rate,
            inner,
            pending: Vec::new(),
            consumed: 0,
            produced: 0,
            skip,
        })
    }

    pub(crate) fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub(crate) fn push(&mut self, samples: &[f32]) -> Result<Vec<f32>, VoiceError> {
        self.consumed += samples.len();
        let Some(inner) = self.inner.as_mut() else {
            self.produced += samples.len();
            return Ok(samples.to_vec());
        };

        self.pending.extend_from_slice(samples);
        let mut out = Vec::new();
        let mut offset = 0;
        loop {
            let needed = inner.input_frames_next();
            if self.pending.len() - offset < needed {
                break;
            }
            let block = inner
                .process(&[&self.pending[offset..offset + needed]], None)
                .map_err(|e| VoiceError::DecodeFailed(format!("resampling failed: {}", e)))?;
            offset += needed;
            Self::take_output(&mut self.skip, &mut self.produced, block, &mut out);
        }
        self.pending.drain(..offset);
        Ok(out)
    }

    pub(crate) fn flush(&mut self) -> Result<Vec<f32>, VoiceError> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(Vec::new());
        };

        let expected = (self.consumed as u64 * u64::from(OUTPUT_SAMPLE_RATE))
            .div_ceil(u64::from(self.input_rate)) as usize;
        let mut out = Vec::new();

        if !self.pending.is_empty() {
            let block = inner
                .process_partial(Some(&[&self.pending[..]]), None)
                .map_err(|e| VoiceError::DecodeFailed(format!("resampling failed: {}", e)))?;
            self.pending.clear();
            Self::take_output(&mut self.skip, &mut self.produced, block, &mut out);
        }

        let mut passes = 0;
        while self.produced < expected && passes < MAX_FLUSH_PASSES {
            let block = inner
                .process_partial(None::<&[Vec<f32>]>, None)
                .map_err(|e| VoiceError::DecodeFailed(format!("resampling failed: {}", e)))?;
            Self::take_output(&mut self.skip, &mut self.produced, block, &mut out);
            passes += 1;
        }

        let overshoot = self.produced.saturating_sub(expected).min(out.len());
        out.truncate(out.len() - overshoot);
        self.produced -= overshoot;
        Ok(out)
    }

    fn take_output(skip: &mut usize, produced: &mut usize, block: Vec<Vec<f32>>, out: &mut Vec<f32>) {
        let samples = block.into_iter().next().unwrap_or_default();
        let skipped = (*skip).min(samples.len());
        *skip -= skipped;
        out.extend_from_slice(&samples[skipped..]);
        *produced += samples.len() - skipped;
    }
}
