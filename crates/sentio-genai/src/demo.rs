//! Deterministic demo generator.
//!
//! Answers every generation request from small keyword tables, with no
//! network and no credentials. The same input text always produces the same
//! payload, which is what makes the end-to-end pipeline testable and the
//! demo CLI usable offline.
//!
//! The tables deliberately mirror a support team's first-pass triage:
//! negative cues dominate positive ones (a message that says "love" and
//! "broken" is a complaint), themes come from a fixed vocabulary of things
//! customers mention, and each department has a canned playbook.

use async_trait::async_trait;

use sentio_contracts::{
    analysis::Department,
    config::RunMode,
    error::GenerationError,
    schema::GeneratedPayload,
    stage::StagePurpose,
};

use crate::generator::{GenerationRequest, TextGenerator};

/// Words that mark feedback as negative. Checked before positive cues.
const NEGATIVE_CUES: &[&str] = &[
    "hate", "terrible", "awful", "worst", "complaint", "problem", "issue", "broken",
];

/// Words that mark feedback as positive.
const POSITIVE_CUES: &[&str] = &[
    "love", "amazing", "excellent", "great", "fantastic", "wonderful", "praise",
];

/// Words that mark feedback as carrying a suggestion.
const SUGGESTION_CUES: &[&str] = &[
    "suggest", "could", "should", "improve", "idea", "recommendation",
];

/// The fixed vocabulary of themes the demo can recognize, in report order.
const THEME_VOCABULARY: &[&str] = &[
    "product", "service", "staff", "website", "app", "delivery", "quality", "price", "support",
];

/// Fallback theme when nothing from the vocabulary matches.
const GENERAL_THEME: &str = "general feedback";

/// Theme words that put feedback on the product team's desk.
const PRODUCT_THEMES: &[&str] = &["product", "app", "website", "quality", "price"];

const CUSTOMER_SERVICE_RECOVERY: &[&str] = &[
    "Contact customer within 24 hours to address concerns",
    "Investigate reported issues and provide solutions",
    "Follow up to ensure customer satisfaction",
];

const CUSTOMER_SERVICE_QUERY: &[&str] = &[
    "Provide detailed response to customer query",
    "Update FAQ if this is a common question",
    "Ensure knowledge base has relevant information",
];

const HR_RECOGNITION: &[&str] = &[
    "Share positive feedback with relevant team members",
    "Consider featuring this feedback in marketing materials",
    "Recognize employees mentioned in the feedback",
];

const PRODUCT_SUGGESTION: &[&str] = &[
    "Review suggestion with product development team",
    "Assess feasibility of implementing suggested improvements",
    "Consider including in product roadmap",
];

const PRODUCT_REVIEW: &[&str] = &[
    "Share feedback with the product development team",
    "Evaluate the mentioned product areas for follow-up",
];

/// A [`TextGenerator`] that needs nothing but the request text.
#[derive(Debug, Default)]
pub struct DemoGenerator;

impl DemoGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextGenerator for DemoGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedPayload, GenerationError> {
        let text = request.input.to_lowercase();
        let payload = match request.purpose {
            StagePurpose::Sentiment => sentiment_of(&text),
            StagePurpose::Themes => GeneratedPayload::Themes(themes_of(&text)),
            StagePurpose::Actions(department) => {
                GeneratedPayload::Actions(actions_for(department, &text))
            }
        };
        Ok(payload)
    }

    async fn health(&self) -> Result<(), GenerationError> {
        Ok(())
    }

    fn mode(&self) -> RunMode {
        RunMode::Demo
    }
}

fn count_hits(text: &str, cues: &[&str]) -> usize {
    cues.iter().filter(|cue| text.contains(*cue)).count()
}

/// Negative cues take precedence over positive ones; confidence grows with
/// the number of matching cues, capped below certainty.
fn sentiment_of(text: &str) -> GeneratedPayload {
    let negative = count_hits(text, NEGATIVE_CUES);
    let positive = count_hits(text, POSITIVE_CUES);

    let (label, hits) = if negative > 0 {
        ("Negative", negative)
    } else if positive > 0 {
        ("Positive", positive)
    } else {
        ("Neutral", 0)
    };

    let confidence = if hits == 0 {
        0.5
    } else {
        (0.6 + 0.1 * hits as f64).min(0.95)
    };

    GeneratedPayload::Sentiment {
        label: Some(label.to_string()),
        confidence: Some(confidence),
    }
}

fn themes_of(text: &str) -> Vec<String> {
    let themes: Vec<String> = THEME_VOCABULARY
        .iter()
        .filter(|keyword| text.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .collect();
    if themes.is_empty() {
        vec![GENERAL_THEME.to_string()]
    } else {
        themes
    }
}

fn actions_for(department: Department, text: &str) -> Vec<String> {
    let negative = count_hits(text, NEGATIVE_CUES) > 0;
    let positive = count_hits(text, POSITIVE_CUES) > 0;
    let suggestion = count_hits(text, SUGGESTION_CUES) > 0;

    let playbook: &[&str] = match department {
        Department::CustomerService => {
            if negative {
                CUSTOMER_SERVICE_RECOVERY
            } else if !positive && !suggestion {
                CUSTOMER_SERVICE_QUERY
            } else {
                &[]
            }
        }
        Department::Hr => {
            if positive && !negative {
                HR_RECOGNITION
            } else {
                &[]
            }
        }
        Department::Product => {
            if suggestion {
                PRODUCT_SUGGESTION
            } else if PRODUCT_THEMES.iter().any(|t| text.contains(t)) {
                PRODUCT_REVIEW
            } else {
                &[]
            }
        }
    };
    playbook.iter().map(|s| s.to_string()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sentio_contracts::stage::StagePurpose;

    async fn generate(purpose: StagePurpose, text: &str) -> GeneratedPayload {
        DemoGenerator::new()
            .generate(GenerationRequest::new(purpose, text))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn same_input_same_output() {
        let text = "The delivery was terrible and the app is broken.";
        let first = generate(StagePurpose::Sentiment, text).await;
        let second = generate(StagePurpose::Sentiment, text).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn negative_cues_win_over_positive_ones() {
        let payload =
            generate(StagePurpose::Sentiment, "I love this but the screen is broken").await;
        match payload {
            GeneratedPayload::Sentiment { label, .. } => {
                assert_eq!(label.as_deref(), Some("Negative"));
            }
            other => panic!("expected sentiment payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn praise_classifies_positive_with_growing_confidence() {
        let payload = generate(
            StagePurpose::Sentiment,
            "I love the new product features, they are amazing!",
        )
        .await;
        match payload {
            GeneratedPayload::Sentiment { label, confidence } => {
                assert_eq!(label.as_deref(), Some("Positive"));
                let confidence = confidence.unwrap();
                assert!(confidence > 0.5, "confidence {confidence} not > 0.5");
                assert!(confidence <= 0.95);
            }
            other => panic!("expected sentiment payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cueless_text_is_neutral() {
        let payload = generate(StagePurpose::Sentiment, "How do I change my address?").await;
        match payload {
            GeneratedPayload::Sentiment { label, confidence } => {
                assert_eq!(label.as_deref(), Some("Neutral"));
                assert_eq!(confidence, Some(0.5));
            }
            other => panic!("expected sentiment payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn themes_come_from_the_vocabulary() {
        let payload = generate(
            StagePurpose::Themes,
            "The website is slow and the delivery was late.",
        )
        .await;
        assert_eq!(
            payload,
            GeneratedPayload::Themes(vec!["website".to_string(), "delivery".to_string()])
        );
    }

    #[tokio::test]
    async fn unmatched_text_falls_back_to_general_feedback() {
        let payload = generate(StagePurpose::Themes, "Meh.").await;
        assert_eq!(
            payload,
            GeneratedPayload::Themes(vec!["general feedback".to_string()])
        );
    }

    #[tokio::test]
    async fn complaints_reach_customer_service() {
        let payload = generate(
            StagePurpose::Actions(Department::CustomerService),
            "My order arrived broken, this is a real problem.",
        )
        .await;
        match payload {
            GeneratedPayload::Actions(actions) => {
                assert_eq!(actions.len(), 3);
                assert!(actions[0].contains("24 hours"));
            }
            other => panic!("expected actions payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn praise_reaches_hr_but_not_customer_service() {
        let text = "The staff were wonderful, absolutely excellent service!";
        let hr = generate(StagePurpose::Actions(Department::Hr), text).await;
        let cs = generate(StagePurpose::Actions(Department::CustomerService), text).await;
        assert!(matches!(hr, GeneratedPayload::Actions(ref a) if !a.is_empty()));
        assert!(matches!(cs, GeneratedPayload::Actions(ref a) if a.is_empty()));
    }

    #[tokio::test]
    async fn suggestions_reach_the_product_team() {
        let payload = generate(
            StagePurpose::Actions(Department::Product),
            "You should improve the search, here is an idea.",
        )
        .await;
        match payload {
            GeneratedPayload::Actions(actions) => {
                assert!(actions.iter().any(|a| a.contains("roadmap")));
            }
            other => panic!("expected actions payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn product_mentions_reach_the_product_team_without_suggestion_cues() {
        let payload = generate(
            StagePurpose::Actions(Department::Product),
            "I love the new product features, they are amazing!",
        )
        .await;
        assert!(matches!(payload, GeneratedPayload::Actions(ref a) if !a.is_empty()));
    }

    #[tokio::test]
    async fn plain_queries_get_query_handling_actions() {
        let payload = generate(
            StagePurpose::Actions(Department::CustomerService),
            "Where can I download my invoice?",
        )
        .await;
        match payload {
            GeneratedPayload::Actions(actions) => {
                assert!(actions.iter().any(|a| a.contains("query")));
            }
            other => panic!("expected actions payload, got {other:?}"),
        }
    }
}
