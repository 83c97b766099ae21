//! Final merge of stage results into one [`AnalysisResult`].

use tracing::debug;

use sentio_contracts::{
    analysis::{AnalysisResult, Department, DepartmentActions, Sentiment},
    stage::StagePayload,
};
use sentio_engine::{Aggregator, RunContext};

use crate::ids;

/// Merges whatever the stages produced into the outbound analysis shape.
///
/// Aggregation is total: it never fails and never skips a field. Failed
/// stages contribute their documented default (neutral sentiment, empty
/// theme list, empty action list for the department), and the summary says
/// how many stages degraded so a reader of the result alone can tell.
pub struct AnalysisAggregator;

impl Aggregator for AnalysisAggregator {
    fn aggregate(&self, ctx: &RunContext) -> AnalysisResult {
        let sentiment = match ctx.payload(&ids::sentiment()) {
            Some(StagePayload::Sentiment(sentiment)) => *sentiment,
            _ => Sentiment::neutral(),
        };
        let themes = match ctx.payload(&ids::themes()) {
            Some(StagePayload::Themes(themes)) => themes.clone(),
            _ => vec![],
        };

        // Each item keeps the department tag its stage gave it. Departments
        // whose stage failed simply contribute nothing; the key itself is
        // always present in the struct.
        let mut action_items = DepartmentActions::default();
        for department in Department::ALL {
            if let Some(StagePayload::Actions(items)) =
                ctx.payload(&ids::action_generator(department))
            {
                for item in items {
                    action_items.push(item.department, item.text.clone());
                }
            }
        }

        let failed = ctx.failed_count();
        let total = failed + ctx.completed_count();
        let summary = compose_summary(&sentiment, &themes, &action_items, failed, total);
        if failed > 0 {
            debug!(run_id = %ctx.run_id(), failed, total, "aggregated a degraded run");
        }

        AnalysisResult {
            sentiment,
            themes,
            action_items,
            summary,
        }
    }
}

/// Deterministic summary template. No capability call happens here.
fn compose_summary(
    sentiment: &Sentiment,
    themes: &[String],
    actions: &DepartmentActions,
    failed: usize,
    total: usize,
) -> String {
    let mut summary = if themes.is_empty() {
        format!("Customer provided {} feedback", sentiment.label)
    } else {
        format!(
            "Customer provided {} feedback regarding {}",
            sentiment.label,
            themes.join(", ")
        )
    };

    let count = actions.total();
    let noun = if count == 1 {
        "action item"
    } else {
        "action items"
    };
    summary.push_str(&format!("; {count} {noun} proposed across departments."));

    if failed > 0 {
        let noun = if total == 1 { "stage" } else { "stages" };
        summary.push_str(&format!(
            " {failed} of {total} analysis {noun} fell back to defaults."
        ));
    }
    summary
}

// ── Tests ────────────────────────────────────────────────────────────────────
