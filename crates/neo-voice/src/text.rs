//! Text inspection helpers shared by the synthesis client and the selector.

use std::ops::RangeInclusive;

/// Devanagari Unicode block.
const DEVANAGARI: RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Collapses every run of whitespace (spaces, tabs, newlines) into a single
/// space and trims both ends.
///
/// Some providers treat a newline as an end-of-utterance marker, so raw
/// newlines must never reach the wire. Applying this twice yields the same
/// string as applying it once.
pub fn sanitize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `true` if any character of `text` is in the Devanagari block.
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(|c| DEVANAGARI.contains(&c))
}
