//! Voice, locale, and provider request parameter definitions.
//!
//! These are the values that end up in a synthesis request body, so their
//! serialized forms must match what the provider expects byte for byte.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locale sent to the provider as `multi_native_locale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// American English.
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    /// Hindi (India).
    #[serde(rename = "hi-IN")]
    HiIn,
}

impl Locale {
    /// Returns the BCP 47 tag for this locale.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::HiIn => "hi-IN",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider synthesis model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpeechModel {
    /// Low-latency streaming model.
    #[default]
    Falcon,
    /// Higher quality, higher latency model.
    Gen2,
}

/// Compressed container the provider should answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    Wav,
}

impl AudioEncoding {
    /// File extension used as a probe hint when decoding.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

/// Channel layout requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelLayout {
    #[default]
    Mono,
    Stereo,
}
