//! The Sentio run engine: ready-set scheduling under one deadline.
//!
//! One call to [`Engine::run`] drives one analysis run:
//!
//!   validate input → spawn ready stages → record results as they land →
//!   spawn newly-ready stages → … → sweep unfinished stages at the deadline →
//!   aggregate → report
//!
//! Scheduling is by readiness, not by level: a stage is spawned the moment
//! every one of its dependencies has a recorded result, so independent
//! branches overlap freely. A failed dependency still counts as resolved;
//! failure travels downstream as data, and a branch failing never stops its
//! siblings.
//!
//! The deadline invariant is absolute: the engine never waits past the
//! run's deadline. When it fires, pending and unscheduled stages are marked
//! as deadline failures, their tasks are aborted, and the run proceeds
//! straight to aggregation with whatever results exist.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use sentio_contracts::{
    config::WorkflowConfig,
    error::{SentioError, SentioResult},
    feedback::FeedbackInput,
    run::{RunId, RunOutcome, RunReport, RunStatus, StageTrace},
    stage::{FailureReason, StageId, StageOutcome, StageResult},
};

use crate::context::RunContext;
use crate::graph::WorkflowGraph;
use crate::traits::Aggregator;

/// The engine that executes a workflow graph.
///
/// Construct one per process and share it; the graph and aggregator are
/// immutable and every run gets its own [`RunContext`].
pub struct Engine {
    graph: WorkflowGraph,
    aggregator: Box<dyn Aggregator>,
    deadline: Duration,
    max_feedback_chars: usize,
}

impl Engine {
    /// Create an engine over a validated graph.
    pub fn new(
        graph: WorkflowGraph,
        aggregator: Box<dyn Aggregator>,
        config: &WorkflowConfig,
    ) -> Self {
        Self {
            graph,
            aggregator,
            deadline: Duration::from_millis(config.run.deadline_ms),
            max_feedback_chars: config.limits.max_feedback_chars,
        }
    }

    /// Validate raw text and run it through the workflow.
    ///
    /// # Errors
    ///
    /// - `SentioError::Validation` when the text is rejected before the run
    ///   starts; nothing is executed in that case.
    /// - `SentioError::Unavailable` when the deadline expired with no stage
    ///   completed, leaving nothing but defaults to return.
    ///
    /// Stage failures are NOT errors; they surface as a degraded analysis
    /// with a `PartiallyFailed` report.
    pub async fn analyze(&self, text: &str) -> SentioResult<RunOutcome> {
        let feedback = FeedbackInput::new(text, self.max_feedback_chars)?;
        let outcome = self.run(feedback).await;
        if outcome.is_unavailable() {
            return Err(SentioError::Unavailable {
                reason: format!(
                    "no stage completed within the {}ms deadline",
                    self.deadline.as_millis()
                ),
            });
        }
        Ok(outcome)
    }

    /// Run validated feedback through the workflow with the configured
    /// deadline. Always produces an outcome; see [`Engine::run_with_deadline`].
    pub async fn run(&self, feedback: FeedbackInput) -> RunOutcome {
        self.run_with_deadline(feedback, self.deadline).await
    }

    /// Run validated feedback with an explicit overall deadline.
    ///
    /// This call cannot fail and cannot outlive `deadline` by more than
    /// scheduling noise: whatever has not finished by then is recorded as a
    /// deadline failure and aggregation proceeds over partial results.
    pub async fn run_with_deadline(
        &self,
        feedback: FeedbackInput,
        deadline: Duration,
    ) -> RunOutcome {
        let run_id = RunId::new();
        let started = Instant::now();
        let deadline_at = tokio::time::Instant::now() + deadline;

        info!(
            run_id = %run_id,
            stages = self.graph.len(),
            deadline_ms = deadline.as_millis() as u64,
            "analysis run starting"
        );

        let mut ctx = RunContext::new(run_id, feedback);
        let mut scheduled: HashSet<StageId> = HashSet::new();
        let mut tasks: JoinSet<StageResult> = JoinSet::new();
        let mut deadline_hit = false;

        loop {
            // ── Spawn every stage whose dependencies are all resolved ────────
            for id in self.graph.ids() {
                if scheduled.contains(id) {
                    continue;
                }
                let deps = self.graph.dependencies(id);
                if !deps.iter().all(|dep| ctx.has_result(dep)) {
                    continue;
                }

                let stage = Arc::clone(self.graph.stage(id));
                let input = ctx.stage_input(deps);
                let stage_id = id.clone();
                debug!(run_id = %run_id, stage = %stage_id, "stage ready, spawning");

                tasks.spawn(async move {
                    let stage_started = Instant::now();
                    // A panicking stage must not take the run down; it
                    // becomes an internal failure for that stage alone.
                    let outcome = match AssertUnwindSafe(stage.execute(input)).catch_unwind().await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => StageOutcome::Failed {
                            reason: FailureReason::Internal,
                            message: "stage panicked during execution".to_string(),
                        },
                    };
                    StageResult {
                        stage: stage_id,
                        outcome,
                        elapsed_ms: stage_started.elapsed().as_millis() as u64,
                    }
                });
                scheduled.insert(id.clone());
            }

            if tasks.is_empty() {
                break;
            }

            // ── Wait for the next result, bounded by the run deadline ────────
            match tokio::time::timeout_at(deadline_at, tasks.join_next()).await {
                Ok(Some(Ok(result))) => {
                    match &result.outcome {
                        StageOutcome::Completed { note, .. } => debug!(
                            run_id = %run_id,
                            stage = %result.stage,
                            elapsed_ms = result.elapsed_ms,
                            note = note.as_deref().unwrap_or(""),
                            "stage completed"
                        ),
                        StageOutcome::Failed { reason, message } => warn!(
                            run_id = %run_id,
                            stage = %result.stage,
                            reason = %reason,
                            message = %message,
                            "stage failed"
                        ),
                    }
                    ctx.record(result);
                }
                Ok(Some(Err(join_err))) => {
                    // Stage futures catch their own panics and nothing
                    // aborts tasks before the deadline; a lost task is swept
                    // as an internal failure below.
                    warn!(run_id = %run_id, error = %join_err, "stage task lost");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        run_id = %run_id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "run deadline reached, aborting pending stages"
                    );
                    tasks.abort_all();
                    deadline_hit = true;
                    break;
                }
            }
        }

        // ── Sweep: every stage without a result gets a failure marker ────────
        for id in self.graph.ids() {
            if ctx.has_result(id) {
                continue;
            }
            let (reason, message) = if deadline_hit {
                (
                    FailureReason::Deadline,
                    "run deadline expired before the stage finished".to_string(),
                )
            } else {
                (
                    FailureReason::Internal,
                    "stage produced no result".to_string(),
                )
            };
            ctx.record(StageResult {
                stage: id.clone(),
                outcome: StageOutcome::Failed { reason, message },
                elapsed_ms: 0,
            });
        }

        // ── Aggregate over whatever exists and assemble the report ───────────
        let analysis = self.aggregator.aggregate(&ctx);

        let stages: Vec<StageTrace> = self
            .graph
            .ids()
            .filter_map(|id| ctx.result(id))
            .map(StageTrace::from)
            .collect();
        let status = if stages.iter().all(|t| t.completed) {
            RunStatus::Completed
        } else {
            RunStatus::PartiallyFailed
        };
        let report = RunReport {
            run_id,
            status,
            received_at: ctx.feedback().received_at(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            stages,
        };

        info!(
            run_id = %run_id,
            status = ?report.status,
            failed_stages = report.failed_stages(),
            elapsed_ms = report.elapsed_ms,
            "analysis run finished"
        );

        RunOutcome { analysis, report }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
