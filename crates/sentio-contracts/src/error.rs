//! Error types for the Sentio analysis pipeline.
//!
//! Two layers of failure exist and they never mix:
//!
//! - [`GenerationError`] is returned by a generation capability. It is always
//!   absorbed by the stage that made the call and recorded as a failed
//!   `StageResult`; it never crosses the engine boundary.
//! - [`SentioError`] is the caller-facing error. Only input validation,
//!   configuration problems, graph construction, and total-run failure are
//!   allowed to surface here.

use thiserror::Error;

/// A failure reported by a generation capability for a single stage call.
///
/// Stages convert this into a failure-marker `StageResult`; downstream stages
/// and the aggregator see the marker, never the error itself.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider could not be reached, timed out, or answered with a
    /// non-success status.
    #[error("provider call failed: {reason}")]
    Provider { reason: String },

    /// The provider answered, but the payload did not match the expected
    /// response schema (wrong shape, wrong types, not JSON at all).
    #[error("response did not match expected schema: {reason}")]
    Parse { reason: String },
}

/// The caller-facing error type for the Sentio workflow.
///
/// Everything else that can go wrong during a run (a provider outage, a
/// malformed response, a stage blowing its deadline) is represented as data
/// inside the run report, not as an `Err`.
#[derive(Debug, Error)]
pub enum SentioError {
    /// The submitted feedback failed validation before the run started.
    #[error("invalid feedback input: {reason}")]
    Validation { reason: String },

    /// The workflow graph is malformed (duplicate stage, unknown dependency,
    /// or a dependency cycle). Raised at construction time, never mid-run.
    #[error("invalid workflow graph: {reason}")]
    InvalidGraph { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The run produced nothing usable: no stage reached a result of its own
    /// before the overall deadline.
    #[error("analysis unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Convenience alias used throughout the Sentio crates.
pub type SentioResult<T> = Result<T, SentioError>;
