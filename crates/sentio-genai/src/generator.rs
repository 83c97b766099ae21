//! The generation capability seam.
//!
//! Stages never talk to a provider directly; they go through the
//! [`TextGenerator`] trait. Two implementations exist: [`LiveGenerator`]
//! speaks to a real provider over HTTP, [`DemoGenerator`] answers
//! deterministically from keyword tables. Which one backs a process is
//! decided exactly once, at startup, by [`create_generator`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use sentio_contracts::{
    config::{RunMode, WorkflowConfig},
    error::{GenerationError, SentioError, SentioResult},
    schema::{GeneratedPayload, ResponseSchema},
    stage::StagePurpose,
};

use crate::demo::DemoGenerator;
use crate::live::LiveGenerator;

/// One call into the generation capability.
///
/// The purpose selects the capability's instructions; the schema states the
/// shape the caller expects back. The two always agree because
/// [`GenerationRequest::new`] derives the schema from the purpose.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub purpose: StagePurpose,
    pub input: String,
    pub schema: ResponseSchema,
}

impl GenerationRequest {
    pub fn new(purpose: StagePurpose, input: impl Into<String>) -> Self {
        let schema = match purpose {
            StagePurpose::Sentiment => ResponseSchema::Sentiment,
            StagePurpose::Themes => ResponseSchema::Themes,
            StagePurpose::Actions(_) => ResponseSchema::Actions,
        };
        Self {
            purpose,
            input: input.into(),
            schema,
        }
    }
}

/// A backend that can satisfy generation requests.
///
/// Implementations must be safe to share across concurrently running stages;
/// the engine calls `generate` from several tasks at once.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a payload for the request, or report why it could not.
    async fn generate(&self, request: GenerationRequest)
        -> Result<GeneratedPayload, GenerationError>;

    /// Cheap reachability probe, used by the `health` command.
    async fn health(&self) -> Result<(), GenerationError>;

    /// Which mode this backend serves.
    fn mode(&self) -> RunMode;
}

impl std::fmt::Debug for dyn TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerator")
            .field("mode", &self.mode())
            .finish()
    }
}

/// Build the generator the configuration asks for.
///
/// In live mode the provider API key is read here, once, from the
/// environment variable named by `provider.api_key_env`; a missing or
/// placeholder key is a configuration error at startup, not a mid-run
/// surprise.
pub fn create_generator(config: &WorkflowConfig) -> SentioResult<Arc<dyn TextGenerator>> {
    match config.mode {
        RunMode::Demo => {
            info!("using deterministic demo generator");
            Ok(Arc::new(DemoGenerator::new()))
        }
        RunMode::Live => {
            let var = &config.provider.api_key_env;
            let key = std::env::var(var).unwrap_or_default();
            if is_placeholder(&key) {
                return Err(SentioError::Config {
                    reason: format!("live mode requires an API key in ${var}"),
                });
            }
            info!(model = %config.provider.model, "using live generation provider");
            Ok(Arc::new(LiveGenerator::new(&config.provider, key)?))
        }
    }
}

fn is_placeholder(key: &str) -> bool {
    let t = key.trim();
    t.is_empty()
        || t.contains("${")
        || t.eq_ignore_ascii_case("your-api-key-here")
        || t.eq_ignore_ascii_case("changeme")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sentio_contracts::analysis::Department;

    #[test]
    fn request_schema_follows_purpose() {
        let req = GenerationRequest::new(StagePurpose::Sentiment, "text");
        assert_eq!(req.schema, ResponseSchema::Sentiment);

        let req = GenerationRequest::new(StagePurpose::Themes, "text");
        assert_eq!(req.schema, ResponseSchema::Themes);

        let req = GenerationRequest::new(StagePurpose::Actions(Department::Hr), "text");
        assert_eq!(req.schema, ResponseSchema::Actions);
    }

    #[test]
    fn demo_mode_needs_no_credentials() {
        let config = WorkflowConfig::default();
        let generator = create_generator(&config).unwrap();
        assert_eq!(generator.mode(), RunMode::Demo);
    }

    #[test]
    fn live_mode_without_key_is_a_config_error() {
        let mut config = WorkflowConfig::default();
        config.mode = RunMode::Live;
        // A variable name that no environment sets.
        config.provider.api_key_env = "SENTIO_TEST_UNSET_KEY_93A1".to_string();
        let err = create_generator(&config).unwrap_err();
        assert!(matches!(err, SentioError::Config { .. }));
        assert!(err.to_string().contains("SENTIO_TEST_UNSET_KEY_93A1"));
    }

    #[test]
    fn placeholder_keys_are_rejected() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("   "));
        assert!(is_placeholder("${OPENAI_API_KEY}"));
        assert!(is_placeholder("your-api-key-here"));
        assert!(is_placeholder("CHANGEME"));
        assert!(!is_placeholder("sk-real-key"));
    }
}
