//! Assembly of the standard analysis workflow.
//!
//! The shape is a diamond with a fan-out middle: sentiment classification
//! and theme extraction run as independent roots, then one action stage per
//! department runs with both root results in hand, then the aggregator
//! merges everything. Stage set and wiring are fixed here; only the
//! generator behind the stages varies between demo and live mode.

use std::sync::Arc;

use sentio_contracts::{analysis::Department, config::WorkflowConfig, error::SentioResult};
use sentio_engine::{Engine, GraphBuilder, WorkflowGraph};
use sentio_genai::TextGenerator;

use crate::{
    actions::ActionItemStage, aggregate::AnalysisAggregator, ids, sentiment::SentimentStage,
    themes::ThemeStage,
};

/// Build the standard five-stage analysis graph over `generator`.
pub fn standard_workflow(
    generator: Arc<dyn TextGenerator>,
    config: &WorkflowConfig,
) -> SentioResult<WorkflowGraph> {
    let mut builder = GraphBuilder::new()
        .add_stage(Arc::new(SentimentStage::new(generator.clone())), vec![])
        .add_stage(
            Arc::new(ThemeStage::new(generator.clone(), config.limits.max_themes)),
            vec![],
        );
    for department in Department::ALL {
        builder = builder.add_stage(
            Arc::new(ActionItemStage::new(department, generator.clone())),
            vec![ids::sentiment(), ids::themes()],
        );
    }
    builder.build()
}

/// Build a ready-to-use engine over the standard workflow.
pub fn standard_engine(
    generator: Arc<dyn TextGenerator>,
    config: &WorkflowConfig,
) -> SentioResult<Engine> {
    let graph = standard_workflow(generator, config)?;
    Ok(Engine::new(graph, Box::new(AnalysisAggregator), config))
}

// ── Tests ────────────────────────────────────────────────────────────────────
