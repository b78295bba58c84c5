//! Voice preference cell and per-utterance voice/locale selection.
//!
//! The preference is a single-writer cell: [`VoiceControl`] is the only handle
//! that can change it and is owned by the session's control path, while any
//! number of [`VoicePreference`] readers observe the latest value. The
//! selector only ever reads.

use crate::error::VoiceError;
use crate::text::contains_devanagari;
use neo_types::Locale;
use tokio::sync::watch;

/// Writer half of the voice preference cell.
#[derive(Debug)]
pub struct VoiceControl {
    tx: watch::Sender<String>,
}

/// Reader half of the voice preference cell.
#[derive(Debug, Clone)]
pub struct VoicePreference {
    rx: watch::Receiver<String>,
}

/// Creates a preference cell initialized to `default_voice_id`.
pub fn voice_preference(default_voice_id: impl Into<String>) -> (VoiceControl, VoicePreference) {
    let (tx, rx) = watch::channel(default_voice_id.into());
    (VoiceControl { tx }, VoicePreference { rx })
}

impl VoiceControl {
    /// Replaces the current voice id. Takes effect from the next utterance.
    pub fn set_voice(&self, voice_id: &str) -> Result<(), VoiceError> {
        let voice_id = voice_id.trim();
        if voice_id.is_empty() {
            return Err(VoiceError::Config("voice id must not be empty".to_string()));
        }
        // send_replace never fails, even with no live readers.
        self.tx.send_replace(voice_id.to_string());
        Ok(())
    }

    /// Returns a new reader for this cell.
    pub fn subscribe(&self) -> VoicePreference {
        VoicePreference {
            rx: self.tx.subscribe(),
        }
    }
}

impl VoicePreference {
    /// Returns the current voice id.
    pub fn current(&self) -> String {
        self.rx.borrow().clone()
    }
}

/// Result of voice selection for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelection {
    pub voice_id: String,
    pub locale: Locale,
}

/// Picks the voice and locale for an utterance.
#[derive(Debug, Clone)]
pub struct VoiceSelector {
    hindi_voice_id: String,
}

impl VoiceSelector {
    pub fn new(hindi_voice_id: impl Into<String>) -> Self {
        Self {
            hindi_voice_id: hindi_voice_id.into(),
        }
    }

    /// Voice forced for any text containing Devanagari.
    pub fn hindi_voice_id(&self) -> &str {
        &self.hindi_voice_id
    }

    /// Devanagari text is spoken with the fixed Hindi voice in `hi-IN`,
    /// regardless of the preference. Anything else uses the preferred voice
    /// in `en-US`.
    pub fn select(&self, text: &str, preference: &VoicePreference) -> VoiceSelection {
        if contains_devanagari(text) {
            VoiceSelection {
                voice_id: self.hindi_voice_id.clone(),
                locale: Locale::HiIn,
            }
        } else {
            VoiceSelection {
                voice_id: preference.current(),
                locale: Locale::EnUs,
            }
        }
    }
}
