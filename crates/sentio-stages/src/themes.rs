//! Theme extraction stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use sentio_contracts::{
    schema::GeneratedPayload,
    stage::{FailureReason, StageId, StageInput, StageOutcome, StagePayload, StagePurpose},
};
use sentio_engine::Stage;
use sentio_genai::{GenerationRequest, TextGenerator};

use crate::ids;

/// Extracts the main themes mentioned in the feedback.
///
/// A root stage, independent of sentiment classification. Raw theme lists
/// are cleaned up before they become a payload: entries are trimmed, blanks
/// dropped, duplicates removed case-insensitively (first casing wins), and
/// the list is capped at the configured maximum. An empty list is a valid
/// result and means the feedback had no clear themes.
pub struct ThemeStage {
    generator: Arc<dyn TextGenerator>,
    max_themes: usize,
}

impl ThemeStage {
    pub fn new(generator: Arc<dyn TextGenerator>, max_themes: usize) -> Self {
        Self {
            generator,
            max_themes,
        }
    }
}

#[async_trait]
impl Stage for ThemeStage {
    fn id(&self) -> StageId {
        ids::themes()
    }

    async fn execute(&self, input: StageInput) -> StageOutcome {
        let request = GenerationRequest::new(StagePurpose::Themes, input.feedback.text());
        match self.generator.generate(request).await {
            Ok(GeneratedPayload::Themes(raw)) => {
                let outcome = normalize_themes(raw, self.max_themes);
                if let StageOutcome::Completed {
                    note: Some(note), ..
                } = &outcome
                {
                    debug!(stage = %self.id(), note = %note, "theme list cleaned up");
                }
                outcome
            }
            Ok(other) => StageOutcome::Failed {
                reason: FailureReason::Parse,
                message: format!("expected a themes payload, got {other:?}"),
            },
            Err(err) => StageOutcome::from_generation_error(&err),
        }
    }
}

/// Clean up a raw theme list. Always completes; cleanup steps that changed
/// the list are recorded as a note.
fn normalize_themes(raw: Vec<String>, max_themes: usize) -> StageOutcome {
    let mut notes: Vec<String> = vec![];
    let mut themes: Vec<String> = Vec::with_capacity(raw.len());
    let mut seen: Vec<String> = vec![];

    let mut blanks = 0usize;
    let mut duplicates = 0usize;

    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            blanks += 1;
            continue;
        }
        let folded = trimmed.to_lowercase();
        if seen.contains(&folded) {
            duplicates += 1;
            continue;
        }
        seen.push(folded);
        themes.push(trimmed.to_string());
    }

    if blanks > 0 {
        notes.push(format!("{blanks} blank theme{} dropped", plural(blanks)));
    }
    if duplicates > 0 {
        notes.push(format!(
            "{duplicates} duplicate theme{} dropped",
            plural(duplicates)
        ));
    }
    if themes.len() > max_themes {
        themes.truncate(max_themes);
        notes.push(format!("theme list capped at {max_themes}"));
    }

    let payload = StagePayload::Themes(themes);
    if notes.is_empty() {
        StageOutcome::completed(payload)
    } else {
        StageOutcome::completed_with_note(payload, notes.join("; "))
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{root_input, CannedGenerator, CannedReply};

    fn stage_with(reply: CannedReply) -> ThemeStage {
        ThemeStage::new(Arc::new(CannedGenerator::new(reply)), 8)
    }

    fn themes_reply(themes: &[&str]) -> CannedReply {
        CannedReply::Payload(GeneratedPayload::Themes(
            themes.iter().map(|s| s.to_string()).collect(),
        ))
    }

    fn expect_themes(outcome: &StageOutcome) -> (&[String], Option<&str>) {
        match outcome {
            StageOutcome::Completed {
                payload: StagePayload::Themes(themes),
                note,
            } => (themes, note.as_deref()),
            other => panic!("expected completed themes, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn clean_list_passes_through_without_note() {
        let stage = stage_with(themes_reply(&["delivery", "support quality"]));
        let outcome = stage.execute(root_input("Late box, great agent.")).await;
        let (themes, note) = expect_themes(&outcome);
        assert_eq!(themes, ["delivery", "support quality"]);
        assert!(note.is_none());
    }

    #[tokio::test]
    async fn blank_entries_are_trimmed_and_dropped() {
        let stage = stage_with(themes_reply(&["  delivery  ", "", "   "]));
        let outcome = stage.execute(root_input("Late box.")).await;
        let (themes, note) = expect_themes(&outcome);
        assert_eq!(themes, ["delivery"]);
        assert!(note.unwrap().contains("2 blank themes dropped"));
    }

    /// Deduplication is case-insensitive and keeps the first casing seen.
    #[tokio::test]
    async fn duplicates_fold_case_and_keep_first_casing() {
        let stage = stage_with(themes_reply(&["Delivery", "delivery", "DELIVERY", "price"]));
        let outcome = stage.execute(root_input("Late and expensive.")).await;
        let (themes, note) = expect_themes(&outcome);
        assert_eq!(themes, ["Delivery", "price"]);
        assert!(note.unwrap().contains("2 duplicate themes dropped"));

        let stage = stage_with(themes_reply(&["Pricing", "pricing", "Support"]));
        let outcome = stage.execute(root_input("Costs too much.")).await;
        let (themes, note) = expect_themes(&outcome);
        assert_eq!(themes, ["Pricing", "Support"]);
        assert!(note.unwrap().contains("1 duplicate theme dropped"));
    }

    #[tokio::test]
    async fn list_is_capped_at_the_configured_maximum() {
        let generator = Arc::new(CannedGenerator::new(themes_reply(&[
            "a", "b", "c", "d", "e",
        ])));
        let stage = ThemeStage::new(generator, 3);
        let outcome = stage.execute(root_input("Many topics.")).await;
        let (themes, note) = expect_themes(&outcome);
        assert_eq!(themes, ["a", "b", "c"]);
        assert!(note.unwrap().contains("capped at 3"));
    }

    /// No clear themes is an answer, not an error.
    #[tokio::test]
    async fn empty_list_is_a_valid_payload() {
        let stage = stage_with(themes_reply(&[]));
        let outcome = stage.execute(root_input("Hm.")).await;
        let (themes, note) = expect_themes(&outcome);
        assert!(themes.is_empty());
        assert!(note.is_none());
    }

    #[tokio::test]
    async fn provider_error_fails_the_stage() {
        let stage = stage_with(CannedReply::ProviderError);
        let outcome = stage.execute(root_input("Anything.")).await;
        assert!(matches!(
            outcome,
            StageOutcome::Failed {
                reason: FailureReason::Provider,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn wrong_payload_kind_is_a_parse_failure() {
        let stage = stage_with(CannedReply::Payload(GeneratedPayload::Sentiment {
            label: Some("positive".to_string()),
            confidence: Some(0.9),
        }));
        let outcome = stage.execute(root_input("Anything.")).await;
        match outcome {
            StageOutcome::Failed { reason, message } => {
                assert_eq!(reason, FailureReason::Parse);
                assert!(message.contains("expected a themes payload"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
