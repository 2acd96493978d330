//! Speech synthesis and audio artifact handling

pub mod store;
mod tts;

pub use store::AudioStore;
pub use tts::TextToSpeech;

use async_trait::async_trait;

use crate::Result;

/// External capability that converts text into playable audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns error if the synthesis collaborator fails
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Split text into sentence-like segments at `.`, `!` or `?` followed by
/// whitespace
///
/// Segments come back trimmed and in original order; text without a terminal
/// yields itself as the single segment.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut prev_terminal = false;

    for (i, c) in text.char_indices() {
        if prev_terminal && c.is_whitespace() {
            let segment = text[start..i].trim();
            if !segment.is_empty() {
                segments.push(segment);
            }
            start = i;
        }
        prev_terminal = matches!(c, '.' | '!' | '?');
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        segments.push(tail);
    }

    segments
}
