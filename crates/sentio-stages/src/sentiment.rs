//! Sentiment classification stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use sentio_contracts::{
    analysis::{Sentiment, SentimentLabel},
    schema::GeneratedPayload,
    stage::{FailureReason, StageId, StageInput, StageOutcome, StagePayload, StagePurpose},
};
use sentio_engine::Stage;
use sentio_genai::{GenerationRequest, TextGenerator};

use crate::ids;

/// Classifies the overall sentiment of the feedback text.
///
/// A root stage: it reads the raw feedback and nothing else. Capability
/// answers are normalized before they become a payload; an unrecognized or
/// missing label degrades to neutral at zero confidence with a note rather
/// than failing the stage, and out-of-range confidence values are clamped
/// into `[0.0, 1.0]`.
pub struct SentimentStage {
    generator: Arc<dyn TextGenerator>,
}

impl SentimentStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Stage for SentimentStage {
    fn id(&self) -> StageId {
        ids::sentiment()
    }

    async fn execute(&self, input: StageInput) -> StageOutcome {
        let request = GenerationRequest::new(StagePurpose::Sentiment, input.feedback.text());
        match self.generator.generate(request).await {
            Ok(GeneratedPayload::Sentiment { label, confidence }) => {
                let outcome = normalize_sentiment(label, confidence);
                if let StageOutcome::Completed {
                    note: Some(note), ..
                } = &outcome
                {
                    debug!(stage = %self.id(), note = %note, "soft default applied");
                }
                outcome
            }
            Ok(other) => StageOutcome::Failed {
                reason: FailureReason::Parse,
                message: format!("expected a sentiment payload, got {other:?}"),
            },
            Err(err) => StageOutcome::from_generation_error(&err),
        }
    }
}

/// Turn a shape-checked capability answer into a well-formed sentiment.
///
/// Every soft default taken on the way is recorded as a note; the outcome
/// is always `Completed`.
fn normalize_sentiment(label: Option<String>, confidence: Option<f64>) -> StageOutcome {
    let mut notes: Vec<String> = vec![];

    let parsed = match label {
        Some(raw) => {
            let parsed = SentimentLabel::parse(&raw);
            if parsed.is_none() {
                notes.push(format!(
                    "unrecognized sentiment label '{raw}', defaulted to neutral"
                ));
            }
            parsed
        }
        None => {
            notes.push("missing sentiment label, defaulted to neutral".to_string());
            None
        }
    };

    // A defaulted label carries no usable confidence.
    let (label, confidence) = match parsed {
        Some(label) => {
            let confidence = match confidence {
                Some(raw) => {
                    let (clamped, changed) = clamp_confidence(raw);
                    if changed {
                        notes.push(format!(
                            "confidence {raw} out of range, clamped to {clamped}"
                        ));
                    }
                    clamped
                }
                None => {
                    notes.push("missing confidence, defaulted to 0.0".to_string());
                    0.0
                }
            };
            (label, confidence)
        }
        None => (SentimentLabel::Neutral, 0.0),
    };

    let payload = StagePayload::Sentiment(Sentiment { label, confidence });
    if notes.is_empty() {
        StageOutcome::completed(payload)
    } else {
        StageOutcome::completed_with_note(payload, notes.join("; "))
    }
}

/// Clamp into `[0.0, 1.0]`. NaN counts as out of range and becomes 0.0.
fn clamp_confidence(raw: f64) -> (f64, bool) {
    if raw.is_nan() {
        (0.0, true)
    } else if raw < 0.0 {
        (0.0, true)
    } else if raw > 1.0 {
        (1.0, true)
    } else {
        (raw, false)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
