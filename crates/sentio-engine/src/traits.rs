//! The two seams of the engine.
//!
//! `Stage` is what the scheduler runs; `Aggregator` is what turns a finished
//! run's worth of stage results into one `AnalysisResult`. The engine knows
//! nothing about sentiment or departments; all domain behavior lives behind
//! these two traits.

use async_trait::async_trait;

use sentio_contracts::{
    analysis::AnalysisResult,
    stage::{StageId, StageInput, StageOutcome},
};

use crate::context::RunContext;

/// One node in the workflow graph.
///
/// # Contract
///
/// - `execute` must not panic for any input; a stage that cannot produce a
///   payload returns `StageOutcome::Failed`. (The engine still contains a
///   panicking stage, recording it as an internal failure, but that path is
///   a bug in the stage.)
/// - `execute` receives the results of exactly its declared dependencies,
///   failed ones included, and must handle both forms.
/// - Implementations are shared across runs and called concurrently; they
///   must not keep per-run mutable state.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The stage's identifier, unique within a graph.
    fn id(&self) -> StageId;

    /// Run the stage against one input. Failure is a value, not an `Err`.
    async fn execute(&self, input: StageInput) -> StageOutcome;
}

/// Combines all stage results of a run into the outbound analysis.
///
/// # Contract
///
/// Aggregation must be total: it runs after every stage has a recorded
/// result, however degraded, and must produce an `AnalysisResult` even when
/// every upstream stage failed. Failed stages contribute their documented
/// defaults (neutral sentiment, empty lists), never an error.
pub trait Aggregator: Send + Sync {
    fn aggregate(&self, ctx: &RunContext) -> AnalysisResult;
}
