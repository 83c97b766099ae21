//! Per-run state.
//!
//! `RunContext` accumulates stage results as the scheduler records them and
//! is handed read-only to the aggregator once the run is over. Stages never
//! see the context itself; they get a `StageInput` snapshot of exactly their
//! declared dependencies.

use std::collections::HashMap;
use std::sync::Arc;

use sentio_contracts::{
    feedback::FeedbackInput,
    run::RunId,
    stage::{StageId, StageInput, StagePayload, StageResult},
};

/// The mutable state of one run: the validated input plus every stage
/// result recorded so far.
pub struct RunContext {
    run_id: RunId,
    feedback: Arc<FeedbackInput>,
    results: HashMap<StageId, StageResult>,
}

impl RunContext {
    pub fn new(run_id: RunId, feedback: FeedbackInput) -> Self {
        Self {
            run_id,
            feedback: Arc::new(feedback),
            results: HashMap::new(),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn feedback(&self) -> &FeedbackInput {
        &self.feedback
    }

    /// Record a stage's terminal result. Last write wins, but the scheduler
    /// records each stage exactly once.
    pub fn record(&mut self, result: StageResult) {
        self.results.insert(result.stage.clone(), result);
    }

    pub fn has_result(&self, id: &StageId) -> bool {
        self.results.contains_key(id)
    }

    pub fn result(&self, id: &StageId) -> Option<&StageResult> {
        self.results.get(id)
    }

    /// The payload of a completed stage, `None` for failed or unrecorded
    /// stages.
    pub fn payload(&self, id: &StageId) -> Option<&StagePayload> {
        self.results.get(id).and_then(StageResult::payload)
    }

    /// All recorded results, in no particular order.
    pub fn results(&self) -> impl Iterator<Item = &StageResult> {
        self.results.values()
    }

    /// Number of stages that completed with a payload.
    pub fn completed_count(&self) -> usize {
        self.results.values().filter(|r| r.is_completed()).count()
    }

    /// Number of stages that failed.
    pub fn failed_count(&self) -> usize {
        self.results.values().filter(|r| !r.is_completed()).count()
    }

    /// Snapshot the results of `deps` into an input for a ready stage.
    ///
    /// Every dependency listed must already have a recorded result; the
    /// scheduler only calls this for stages whose dependencies are all
    /// terminal.
    pub fn stage_input(&self, deps: &[StageId]) -> StageInput {
        let upstream = deps
            .iter()
            .filter_map(|dep| self.results.get(dep).cloned())
            .map(|result| (result.stage.clone(), result))
            .collect();
        StageInput {
            feedback: Arc::clone(&self.feedback),
            upstream,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
