//! Stage identity, payloads, and per-stage results.
//!
//! A run is a graph of stages. Each stage finishes in exactly one of two
//! ways, and both are ordinary values:
//!
//! - `StageOutcome::Completed` with a typed payload (and an optional note
//!   when a soft default was applied)
//! - `StageOutcome::Failed` with a machine-readable reason code
//!
//! Failures flow downstream as data. A dependent stage receives its
//! upstream's failed `StageResult` in its input and decides how to degrade;
//! nothing is retried and nothing panics across the stage boundary.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    analysis::{ActionItem, Department, Sentiment},
    error::GenerationError,
    feedback::FeedbackInput,
};

/// Stable, human-readable identifier for a stage within a workflow graph.
///
/// Appears in log fields, run reports, and dependency declarations.
/// Example: StageId("sentiment-classifier")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageId(pub String);

impl StageId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a stage asks the generation capability to do.
///
/// The purpose selects the capability's instruction set; for action
/// generation it also carries the department whose perspective applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagePurpose {
    /// Classify overall sentiment of the feedback.
    Sentiment,
    /// Extract the main themes mentioned in the feedback.
    Themes,
    /// Generate follow-up actions from one department's perspective.
    Actions(Department),
}

impl fmt::Display for StagePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sentiment => f.write_str("sentiment"),
            Self::Themes => f.write_str("themes"),
            Self::Actions(dept) => write!(f, "{}-actions", dept.slug()),
        }
    }
}

/// The typed payload of a successfully completed stage.
///
/// By the time a payload exists, stage-level normalization has already run:
/// confidence is clamped, themes are deduplicated and capped, action texts
/// are non-blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StagePayload {
    Sentiment(Sentiment),
    Themes(Vec<String>),
    Actions(Vec<ActionItem>),
}

/// Machine-readable reason code for a failed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReason {
    /// The generation capability's provider was unreachable or errored.
    Provider,
    /// The capability answered with a payload that did not match the schema.
    Parse,
    /// The stage was still pending when the overall run deadline expired.
    Deadline,
    /// The stage itself misbehaved (panicked or was lost by the runtime).
    Internal,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Parse => "parse",
            Self::Deadline => "deadline",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&GenerationError> for FailureReason {
    fn from(err: &GenerationError) -> Self {
        match err {
            GenerationError::Provider { .. } => Self::Provider,
            GenerationError::Parse { .. } => Self::Parse,
        }
    }
}

/// How a single stage finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    /// The stage produced a payload. `note` records any soft default that
    /// was applied on the way (e.g. an unrecognized label coerced to
    /// neutral); a note does not make the stage failed.
    Completed {
        payload: StagePayload,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// The stage produced no payload. Dependents substitute documented
    /// defaults; the aggregator reports the reason in the run report.
    Failed {
        reason: FailureReason,
        message: String,
    },
}

impl StageOutcome {
    /// A completed outcome with no note attached.
    pub fn completed(payload: StagePayload) -> Self {
        Self::Completed {
            payload,
            note: None,
        }
    }

    /// A completed outcome carrying a soft-default note.
    pub fn completed_with_note(payload: StagePayload, note: impl Into<String>) -> Self {
        Self::Completed {
            payload,
            note: Some(note.into()),
        }
    }

    /// A failure marker built from a capability error.
    pub fn from_generation_error(err: &GenerationError) -> Self {
        Self::Failed {
            reason: FailureReason::from(err),
            message: err.to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// The recorded result of one stage within one run.
///
/// Exactly one `StageResult` exists per stage per run, whether the stage
/// completed, failed on its own, or was cut off by the deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: StageId,
    pub outcome: StageOutcome,
    /// Stage execution time in milliseconds, as measured by the engine.
    pub elapsed_ms: u64,
}

impl StageResult {
    /// The payload, if the stage completed.
    pub fn payload(&self) -> Option<&StagePayload> {
        match &self.outcome {
            StageOutcome::Completed { payload, .. } => Some(payload),
            StageOutcome::Failed { .. } => None,
        }
    }

    /// The soft-default note, if one was recorded.
    pub fn note(&self) -> Option<&str> {
        match &self.outcome {
            StageOutcome::Completed { note, .. } => note.as_deref(),
            StageOutcome::Failed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome.is_completed()
    }

    /// The failure reason, if the stage failed.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match &self.outcome {
            StageOutcome::Failed { reason, .. } => Some(*reason),
            StageOutcome::Completed { .. } => None,
        }
    }
}

/// Everything a stage sees when it executes.
///
/// `upstream` holds the results of exactly the stage's declared
/// dependencies, failed ones included. Stages read their dependencies from
/// here and from nowhere else; there is no shared mutable state between
/// sibling stages.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub feedback: Arc<FeedbackInput>,
    pub upstream: HashMap<StageId, StageResult>,
}

impl StageInput {
    /// Input for a root stage with no dependencies.
    pub fn root(feedback: Arc<FeedbackInput>) -> Self {
        Self {
            feedback,
            upstream: HashMap::new(),
        }
    }

    /// The payload of a completed upstream stage, `None` if the stage is
    /// absent from the input or failed.
    pub fn upstream_payload(&self, stage: &StageId) -> Option<&StagePayload> {
        self.upstream.get(stage).and_then(StageResult::payload)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
