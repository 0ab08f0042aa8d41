//! Lyrics data types

use serde::{Deserialize, Serialize};

/// A single timed line of lyrics
///
/// `second_text` carries the translation (or any second language) aligned to
/// the same timestamp as `text`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    /// Start time in milliseconds
    pub time_ms: u64,
    /// Primary lyric text
    pub text: String,
    /// Translated / second-language text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_text: Option<String>,
}

impl LyricLine {
    pub fn new(time_ms: u64, text: impl Into<String>) -> Self {
        Self {
            time_ms,
            text: text.into(),
            second_text: None,
        }
    }

    /// Builder for a bilingual line
    pub fn with_second_text(mut self, second_text: impl Into<String>) -> Self {
        self.second_text = Some(second_text.into());
        self
    }

    /// Whether a non-empty translation is attached
    pub fn has_second_text(&self) -> bool {
        self.second_text.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Errors that can occur while reading lyric sources
#[derive(Debug, Clone)]
pub enum LyricError {
    Io(String),
    Empty,
}

impl std::fmt::Display for LyricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LyricError::Io(e) => write!(f, "IO error: {}", e),
            LyricError::Empty => write!(f, "Lyric source is empty"),
        }
    }
}

impl std::error::Error for LyricError {}
