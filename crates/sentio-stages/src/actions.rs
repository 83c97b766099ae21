//! Department action item stages.
//!
//! One [`ActionItemStage`] instance runs per department, each depending on
//! both root stages. A failed dependency never fails an action stage; the
//! stage substitutes a documented default (neutral sentiment, no themes),
//! records the substitution as a note, and keeps going.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use sentio_contracts::{
    analysis::{ActionItem, Department, Sentiment},
    schema::GeneratedPayload,
    stage::{
        FailureReason, StageId, StageInput, StageOutcome, StagePayload, StagePurpose,
    },
};
use sentio_engine::Stage;
use sentio_genai::{GenerationRequest, TextGenerator};

use crate::ids;

/// Generates follow-up actions from one department's perspective.
pub struct ActionItemStage {
    department: Department,
    generator: Arc<dyn TextGenerator>,
}

impl ActionItemStage {
    pub fn new(department: Department, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            department,
            generator,
        }
    }

    pub fn department(&self) -> Department {
        self.department
    }
}

#[async_trait]
impl Stage for ActionItemStage {
    fn id(&self) -> StageId {
        ids::action_generator(self.department)
    }

    async fn execute(&self, input: StageInput) -> StageOutcome {
        let mut notes: Vec<String> = vec![];

        // ── Read dependencies, substituting defaults for failed ones ─────────
        let sentiment = match input.upstream_payload(&ids::sentiment()) {
            Some(StagePayload::Sentiment(sentiment)) => sentiment.clone(),
            _ => {
                notes.push("sentiment unavailable, assumed neutral".to_string());
                Sentiment::neutral()
            }
        };
        let themes = match input.upstream_payload(&ids::themes()) {
            Some(StagePayload::Themes(themes)) => themes.clone(),
            _ => {
                notes.push("themes unavailable, assumed none".to_string());
                vec![]
            }
        };
        if let Some(note) = notes.first() {
            debug!(stage = %self.id(), note = %note, "degraded dependency input");
        }

        // ── Call the capability with the composed context ─────────────────────
        let request = GenerationRequest::new(
            StagePurpose::Actions(self.department),
            compose_context(input.feedback.text(), &sentiment, &themes),
        );
        match self.generator.generate(request).await {
            Ok(GeneratedPayload::Actions(raw)) => {
                normalize_actions(raw, self.department, notes)
            }
            Ok(other) => StageOutcome::Failed {
                reason: FailureReason::Parse,
                message: format!("expected an actions payload, got {other:?}"),
            },
            Err(err) => StageOutcome::from_generation_error(&err),
        }
    }
}

/// The context block an action stage hands to the capability: the raw
/// feedback plus whatever the root stages concluded about it.
fn compose_context(feedback: &str, sentiment: &Sentiment, themes: &[String]) -> String {
    let themes = if themes.is_empty() {
        "none".to_string()
    } else {
        themes.join(", ")
    };
    format!(
        "Feedback: {feedback}\nSentiment: {} (confidence {:.2})\nThemes: {themes}",
        sentiment.label, sentiment.confidence
    )
}

/// Tag raw action texts with the owning department, dropping blanks.
fn normalize_actions(
    raw: Vec<String>,
    department: Department,
    mut notes: Vec<String>,
) -> StageOutcome {
    let mut items: Vec<ActionItem> = Vec::with_capacity(raw.len());
    let mut blanks = 0usize;
    for text in raw {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            blanks += 1;
            continue;
        }
        items.push(ActionItem {
            text: trimmed.to_string(),
            department,
        });
    }
    if blanks > 0 {
        notes.push(format!("{blanks} blank action(s) dropped"));
    }

    let payload = StagePayload::Actions(items);
    if notes.is_empty() {
        StageOutcome::completed(payload)
    } else {
        StageOutcome::completed_with_note(payload, notes.join("; "))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
