//! Validated feedback input.
//!
//! `FeedbackInput` is the only way text enters a run. Construction validates;
//! everything downstream can rely on the text being non-blank and bounded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SentioError, SentioResult};

/// Default upper bound on feedback length, in characters.
pub const DEFAULT_MAX_FEEDBACK_CHARS: usize = 4_000;

/// A single piece of free-text customer feedback, validated on construction.
///
/// Invariants guaranteed by [`FeedbackInput::new`]:
/// - the text is not empty after trimming
/// - the text is at most `max_chars` characters long
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackInput {
    text: String,
    received_at: DateTime<Utc>,
}

impl FeedbackInput {
    /// Validate raw text and wrap it as feedback input.
    ///
    /// Rejects text that is empty (or whitespace-only) and text longer than
    /// `max_chars` characters. The boundary is inclusive: exactly `max_chars`
    /// characters is accepted.
    pub fn new(text: impl Into<String>, max_chars: usize) -> SentioResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SentioError::Validation {
                reason: "feedback text is empty".to_string(),
            });
        }
        let len = text.chars().count();
        if len > max_chars {
            return Err(SentioError::Validation {
                reason: format!("feedback text is {len} characters, limit is {max_chars}"),
            });
        }
        Ok(Self {
            text,
            received_at: Utc::now(),
        })
    }

    /// The feedback text, exactly as submitted.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Wall-clock time the feedback was accepted (UTC).
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_text() {
        let input = FeedbackInput::new("The delivery was late.", DEFAULT_MAX_FEEDBACK_CHARS);
        assert!(input.is_ok());
        assert_eq!(input.unwrap().text(), "The delivery was late.");
    }

    #[test]
    fn rejects_empty_text() {
        let err = FeedbackInput::new("", DEFAULT_MAX_FEEDBACK_CHARS).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn rejects_whitespace_only_text() {
        let err = FeedbackInput::new("   \n\t  ", DEFAULT_MAX_FEEDBACK_CHARS).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    /// The length limit is inclusive: exactly at the limit passes, one past fails.
    #[test]
    fn length_boundary_is_inclusive() {
        let at_limit = "x".repeat(100);
        assert!(FeedbackInput::new(at_limit, 100).is_ok());

        let over_limit = "x".repeat(101);
        let err = FeedbackInput::new(over_limit, 100).unwrap_err();
        assert!(matches!(err, SentioError::Validation { .. }));
        assert!(err.to_string().contains("101"));
    }

    /// Length is measured in characters, not bytes.
    #[test]
    fn length_counts_characters_not_bytes() {
        let text = "é".repeat(100); // 100 chars, 200 bytes
        assert!(FeedbackInput::new(text, 100).is_ok());
    }
}
