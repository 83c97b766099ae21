//! Run identity and run-level reporting.
//!
//! `RunReport` is the engine's account of what happened during one run: one
//! `StageTrace` per stage in the graph, plus overall status and timing. It
//! travels alongside the `AnalysisResult` so callers can tell a clean run
//! from a degraded one without parsing the summary text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::stage::{FailureReason, StageId, StageResult};

/// Unique identifier for a single analysis run.
///
/// Appears in every log line and in the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    /// Create a new, unique run ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Terminal status of a run that produced an analysis.
///
/// Runs rejected before the graph started (input validation) never get a
/// report; they surface as `SentioError::Validation` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every stage completed.
    Completed,
    /// At least one stage failed; the analysis contains documented defaults
    /// where failed stages would have contributed.
    PartiallyFailed,
}

/// One stage's entry in the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    pub stage: StageId,
    pub completed: bool,
    /// Failure reason code, present iff the stage failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Soft-default note recorded by a completed stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub elapsed_ms: u64,
}

impl From<&StageResult> for StageTrace {
    fn from(result: &StageResult) -> Self {
        Self {
            stage: result.stage.clone(),
            completed: result.is_completed(),
            reason: result.failure_reason(),
            note: result.note().map(str::to_string),
            elapsed_ms: result.elapsed_ms,
        }
    }
}

/// The engine's account of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub status: RunStatus,
    /// When the feedback was accepted (UTC).
    pub received_at: DateTime<Utc>,
    /// Total run wall-clock time in milliseconds.
    pub elapsed_ms: u64,
    /// One trace per stage, in graph declaration order.
    pub stages: Vec<StageTrace>,
}

impl RunReport {
    /// Number of stages that did not complete.
    pub fn failed_stages(&self) -> usize {
        self.stages.iter().filter(|t| !t.completed).count()
    }

    /// True when the deadline expired and the run produced nothing of its
    /// own: no stage completed, so the analysis is defaults all the way
    /// down. Boundaries surface this as a service-unavailable condition.
    pub fn is_unavailable(&self) -> bool {
        self.stages
            .iter()
            .any(|t| t.reason == Some(FailureReason::Deadline))
            && self.stages.iter().all(|t| !t.completed)
    }
}

/// Everything a finished run hands back: the analysis and the report
/// describing how it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub analysis: AnalysisResult,
    pub report: RunReport,
}

impl RunOutcome {
    /// See [`RunReport::is_unavailable`].
    pub fn is_unavailable(&self) -> bool {
        self.report.is_unavailable()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Sentiment;
    use crate::stage::{StageOutcome, StagePayload};

    fn trace(stage: &str, reason: Option<FailureReason>) -> StageTrace {
        StageTrace {
            stage: StageId::new(stage),
            completed: reason.is_none(),
            reason,
            note: None,
            elapsed_ms: 5,
        }
    }

    fn report_with(stages: Vec<StageTrace>) -> RunReport {
        RunReport {
            run_id: RunId::new(),
            status: RunStatus::PartiallyFailed,
            received_at: Utc::now(),
            elapsed_ms: 100,
            stages,
        }
    }

    #[test]
    fn run_ids_are_unique() {
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| RunId::new().to_string()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn trace_from_completed_result_has_no_reason() {
        let result = StageResult {
            stage: StageId::new("sentiment-classifier"),
            outcome: StageOutcome::completed(StagePayload::Sentiment(Sentiment::neutral())),
            elapsed_ms: 33,
        };
        let trace = StageTrace::from(&result);
        assert!(trace.completed);
        assert_eq!(trace.reason, None);
        assert_eq!(trace.elapsed_ms, 33);
    }

    #[test]
    fn deadline_with_zero_completed_means_unavailable() {
        let report = report_with(vec![
            trace("a", Some(FailureReason::Deadline)),
            trace("b", Some(FailureReason::Deadline)),
        ]);
        assert!(report.is_unavailable());

        // Same verdict when one stage failed on its own before the
        // deadline swept the rest: still nothing completed.
        let report = report_with(vec![
            trace("a", Some(FailureReason::Provider)),
            trace("b", Some(FailureReason::Deadline)),
        ]);
        assert!(report.is_unavailable());
    }

    /// A single completed stage is a real partial result, so the run stays
    /// available however many siblings the deadline cut off.
    #[test]
    fn any_completed_stage_keeps_run_available() {
        let report = report_with(vec![
            trace("a", None),
            trace("b", Some(FailureReason::Deadline)),
        ]);
        assert!(!report.is_unavailable());
    }

    /// Failures alone never make a run unavailable. Without a deadline in
    /// the mix the aggregate still ships, filled with documented defaults.
    #[test]
    fn all_provider_failures_stay_available() {
        let report = report_with(vec![
            trace("a", Some(FailureReason::Provider)),
            trace("b", Some(FailureReason::Parse)),
        ]);
        assert!(!report.is_unavailable());
    }

    #[test]
    fn failed_stage_count() {
        let report = report_with(vec![
            trace("a", None),
            trace("b", Some(FailureReason::Parse)),
            trace("c", Some(FailureReason::Provider)),
        ]);
        assert_eq!(report.failed_stages(), 2);
    }
}
