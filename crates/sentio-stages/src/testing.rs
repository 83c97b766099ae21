//! Shared fixtures for the stage test modules.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sentio_contracts::{
    analysis::{Sentiment, SentimentLabel},
    config::RunMode,
    error::GenerationError,
    feedback::{FeedbackInput, DEFAULT_MAX_FEEDBACK_CHARS},
    schema::GeneratedPayload,
    stage::{FailureReason, StageId, StageInput, StageOutcome, StagePayload, StageResult},
};
use sentio_genai::{GenerationRequest, TextGenerator};

pub fn feedback(text: &str) -> Arc<FeedbackInput> {
    Arc::new(FeedbackInput::new(text, DEFAULT_MAX_FEEDBACK_CHARS).unwrap())
}

pub fn root_input(text: &str) -> StageInput {
    StageInput::root(feedback(text))
}

pub fn completed_sentiment(label: SentimentLabel, confidence: f64) -> StageResult {
    StageResult {
        stage: crate::ids::sentiment(),
        outcome: StageOutcome::completed(StagePayload::Sentiment(Sentiment {
            label,
            confidence,
        })),
        elapsed_ms: 5,
    }
}

pub fn completed_themes(themes: &[&str]) -> StageResult {
    StageResult {
        stage: crate::ids::themes(),
        outcome: StageOutcome::completed(StagePayload::Themes(
            themes.iter().map(|s| s.to_string()).collect(),
        )),
        elapsed_ms: 5,
    }
}

pub fn failed(stage: StageId) -> StageResult {
    StageResult {
        stage,
        outcome: StageOutcome::Failed {
            reason: FailureReason::Provider,
            message: "mock provider outage".to_string(),
        },
        elapsed_ms: 5,
    }
}

/// What a [`CannedGenerator`] answers with.
pub enum CannedReply {
    Payload(GeneratedPayload),
    ProviderError,
    ParseError,
}

/// A generator that always answers with one canned reply and records the
/// requests it received.
pub struct CannedGenerator {
    reply: CannedReply,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl CannedGenerator {
    pub fn new(reply: CannedReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(vec![]),
        }
    }

    pub fn last_input(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .expect("generator was never called")
            .input
            .clone()
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedPayload, GenerationError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            CannedReply::Payload(payload) => Ok(payload.clone()),
            CannedReply::ProviderError => Err(GenerationError::Provider {
                reason: "mock provider outage".to_string(),
            }),
            CannedReply::ParseError => Err(GenerationError::Parse {
                reason: "mock shape mismatch".to_string(),
            }),
        }
    }

    async fn health(&self) -> Result<(), GenerationError> {
        Ok(())
    }

    fn mode(&self) -> RunMode {
        RunMode::Demo
    }
}
