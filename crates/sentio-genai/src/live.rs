//! Live generation over a chat-completions HTTP API.
//!
//! One request per stage call: a purpose-specific instruction plus the
//! stage's input, with the provider constrained to JSON output. The reply's
//! message content is parsed as JSON and checked against the request's
//! response schema.
//!
//! Transport failures and non-success statuses are retried with exponential
//! backoff. Schema mismatches are not retried; a well-formed reply that says
//! the wrong thing is reported as a parse failure straight away.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sentio_contracts::{
    analysis::Department,
    config::{ProviderConfig, RunMode},
    error::{GenerationError, SentioError, SentioResult},
    schema::{GeneratedPayload, ResponseSchema},
    stage::StagePurpose,
};

use crate::generator::{GenerationRequest, TextGenerator};

/// A [`TextGenerator`] backed by a real provider.
pub struct LiveGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    attempts: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

impl LiveGenerator {
    /// Build a client from provider settings and an already-resolved API key.
    pub fn new(settings: &ProviderConfig, api_key: String) -> SentioResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| SentioError::Config {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            attempts: settings.max_retries.clamp(1, 5),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }
}

/// The system instruction for a purpose. Each one pins the exact JSON shape
/// the matching [`ResponseSchema`] will accept.
fn instruction_for(purpose: StagePurpose) -> String {
    match purpose {
        StagePurpose::Sentiment => concat!(
            "You classify the sentiment of customer feedback. ",
            "Respond with a JSON object of the form ",
            r#"{"label": "positive" | "neutral" | "negative", "confidence": <number from 0 to 1>}."#
        )
        .to_string(),
        StagePurpose::Themes => concat!(
            "You extract the main themes a customer mentions in feedback. ",
            "Respond with a JSON object of the form ",
            r#"{"themes": ["<short theme>", ...]}. Keep each theme to a few words."#
        )
        .to_string(),
        StagePurpose::Actions(department) => format!(
            concat!(
                "You propose follow-up actions for the {} department based on analyzed ",
                "customer feedback. Respond with a JSON object of the form ",
                r#"{{"actions": ["<concrete action>", ...]}}. "#,
                "Propose at most five actions; answer with an empty list when nothing ",
                "applies to this department."
            ),
            department_name(department)
        ),
    }
}

fn department_name(department: Department) -> &'static str {
    match department {
        Department::Hr => "HR",
        Department::CustomerService => "customer service",
        Department::Product => "product",
    }
}

/// Parse a reply's message content against the expected schema.
fn decode_content(
    schema: ResponseSchema,
    content: &str,
) -> Result<GeneratedPayload, GenerationError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| GenerationError::Parse {
            reason: format!("reply content is not valid JSON: {e}"),
        })?;
    schema.decode(&value)
}

#[async_trait]
impl TextGenerator for LiveGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedPayload, GenerationError> {
        let instruction = instruction_for(request.purpose);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.input,
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(purpose = %request.purpose, model = %self.model, "requesting generation");

        // Retry transport and status failures with exponential backoff.
        let mut last_err: Option<GenerationError> = None;
        for i in 0..self.attempts {
            if i > 0 {
                let delay_ms = 200u64 * (1u64 << (i - 1));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let response = match self
                .client
                .post(self.chat_url())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(purpose = %request.purpose, attempt = i + 1, error = %e, "provider request failed");
                    last_err = Some(GenerationError::Provider {
                        reason: format!("request failed: {e}"),
                    });
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                warn!(purpose = %request.purpose, attempt = i + 1, %status, "provider returned error status");
                last_err = Some(GenerationError::Provider {
                    reason: format!("provider returned {status}: {error_text}"),
                });
                continue;
            }

            let reply: ChatResponse = match response.json().await {
                Ok(reply) => reply,
                Err(e) => {
                    last_err = Some(GenerationError::Provider {
                        reason: format!("malformed provider envelope: {e}"),
                    });
                    continue;
                }
            };

            let content = match reply.choices.into_iter().next() {
                Some(choice) => choice.message.content,
                None => {
                    last_err = Some(GenerationError::Provider {
                        reason: "provider returned no choices".to_string(),
                    });
                    continue;
                }
            };

            // A syntactically fine reply with the wrong shape will not
            // improve on retry; surface it to the stage.
            return decode_content(request.schema, &content);
        }

        Err(last_err.unwrap_or_else(|| GenerationError::Provider {
            reason: "provider call failed with no recorded error".to_string(),
        }))
    }

    async fn health(&self) -> Result<(), GenerationError> {
        let response = self
            .client
            .get(self.models_url())
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| GenerationError::Provider {
                reason: format!("health probe failed: {e}"),
            })?;
        if !response.status().is_success() {
            return Err(GenerationError::Provider {
                reason: format!("health probe returned {}", response.status()),
            });
        }
        Ok(())
    }

    fn mode(&self) -> RunMode {
        RunMode::Live
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
