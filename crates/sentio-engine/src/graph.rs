//! Workflow graph construction and validation.
//!
//! A `WorkflowGraph` is a directed acyclic graph of stages, declared through
//! [`GraphBuilder`] and validated once in [`GraphBuilder::build`]:
//!
//! 1. every stage id is unique
//! 2. every declared dependency names a stage in the graph
//! 3. the dependency relation has no cycles (Kahn's algorithm)
//!
//! A graph that builds successfully is immutable and can be shared by any
//! number of runs; no validation happens again at run time.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use sentio_contracts::{
    error::{SentioError, SentioResult},
    stage::StageId,
};

use crate::traits::Stage;

struct Node {
    stage: Arc<dyn Stage>,
    deps: Vec<StageId>,
}

/// An immutable, validated dependency graph of stages.
pub struct WorkflowGraph {
    nodes: HashMap<StageId, Node>,
    /// Stage ids in declaration order. Drives deterministic spawn order and
    /// report ordering.
    order: Vec<StageId>,
}

impl std::fmt::Debug for WorkflowGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowGraph")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl WorkflowGraph {
    /// Number of stages in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Stage ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &StageId> {
        self.order.iter()
    }

    /// The stage registered under `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in the graph; the engine only asks for ids it
    /// obtained from [`WorkflowGraph::ids`].
    pub fn stage(&self, id: &StageId) -> &Arc<dyn Stage> {
        &self.nodes[id].stage
    }

    /// The declared dependencies of `id`, in declaration order.
    pub fn dependencies(&self, id: &StageId) -> &[StageId] {
        &self.nodes[id].deps
    }
}

/// Collects stage declarations and validates them into a [`WorkflowGraph`].
#[derive(Default)]
pub struct GraphBuilder {
    entries: Vec<(StageId, Arc<dyn Stage>, Vec<StageId>)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a stage and the stages whose results it needs.
    pub fn add_stage(mut self, stage: Arc<dyn Stage>, deps: Vec<StageId>) -> Self {
        let id = stage.id();
        self.entries.push((id, stage, deps));
        self
    }

    /// Validate the declarations and produce the immutable graph.
    pub fn build(self) -> SentioResult<WorkflowGraph> {
        let mut nodes: HashMap<StageId, Node> = HashMap::with_capacity(self.entries.len());
        let mut order: Vec<StageId> = Vec::with_capacity(self.entries.len());

        for (id, stage, deps) in self.entries {
            if nodes.contains_key(&id) {
                return Err(SentioError::InvalidGraph {
                    reason: format!("duplicate stage id '{id}'"),
                });
            }
            order.push(id.clone());
            nodes.insert(id, Node { stage, deps });
        }

        for id in &order {
            for dep in &nodes[id].deps {
                if !nodes.contains_key(dep) {
                    return Err(SentioError::InvalidGraph {
                        reason: format!("stage '{id}' depends on unknown stage '{dep}'"),
                    });
                }
            }
        }

        detect_cycle(&nodes, &order)?;

        Ok(WorkflowGraph { nodes, order })
    }
}

/// Kahn's algorithm: repeatedly peel off stages with no unresolved
/// dependencies. Anything left over sits on a cycle.
fn detect_cycle(nodes: &HashMap<StageId, Node>, order: &[StageId]) -> SentioResult<()> {
    let mut in_degree: HashMap<&StageId, usize> = order
        .iter()
        .map(|id| (id, nodes[id].deps.len()))
        .collect();
    let mut dependents: HashMap<&StageId, Vec<&StageId>> = HashMap::new();
    for id in order {
        for dep in &nodes[id].deps {
            dependents.entry(dep).or_default().push(id);
        }
    }

    let mut ready: VecDeque<&StageId> = order
        .iter()
        .filter(|id| in_degree[id] == 0)
        .collect();
    let mut resolved: HashSet<&StageId> = HashSet::new();

    while let Some(id) = ready.pop_front() {
        resolved.insert(id);
        for &dependent in dependents.get(id).into_iter().flatten() {
            let degree = in_degree
                .get_mut(dependent)
                .expect("dependent is a known stage");
            *degree -= 1;
            if *degree == 0 {
                ready.push_back(dependent);
            }
        }
    }

    if resolved.len() < order.len() {
        let mut cyclic: Vec<&str> = order
            .iter()
            .filter(|id| !resolved.contains(id))
            .map(|id| id.as_str())
            .collect();
        cyclic.sort_unstable();
        return Err(SentioError::InvalidGraph {
            reason: format!("dependency cycle involving: {}", cyclic.join(", ")),
        });
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sentio_contracts::stage::{StageInput, StageOutcome, StagePayload};

    use super::*;

    /// A stage that completes immediately with an empty theme list.
    struct NullStage {
        id: StageId,
    }

    impl NullStage {
        fn arc(id: &str) -> Arc<dyn Stage> {
            Arc::new(Self {
                id: StageId::new(id),
            })
        }
    }

    #[async_trait]
    impl Stage for NullStage {
        fn id(&self) -> StageId {
            self.id.clone()
        }

        async fn execute(&self, _input: StageInput) -> StageOutcome {
            StageOutcome::completed(StagePayload::Themes(vec![]))
        }
    }

    fn id(name: &str) -> StageId {
        StageId::new(name)
    }

    #[test]
    fn diamond_graph_builds() {
        let graph = GraphBuilder::new()
            .add_stage(NullStage::arc("a"), vec![])
            .add_stage(NullStage::arc("b"), vec![])
            .add_stage(NullStage::arc("c"), vec![id("a"), id("b")])
            .add_stage(NullStage::arc("d"), vec![id("c")])
            .build()
            .unwrap();

        assert_eq!(graph.len(), 4);
        let ids: Vec<&str> = graph.ids().map(StageId::as_str).collect();
        assert_eq!(ids, ["a", "b", "c", "d"], "declaration order is preserved");
        assert_eq!(graph.dependencies(&id("c")), [id("a"), id("b")]);
    }

    #[test]
    fn duplicate_stage_id_is_rejected() {
        let err = GraphBuilder::new()
            .add_stage(NullStage::arc("a"), vec![])
            .add_stage(NullStage::arc("a"), vec![])
            .build()
            .unwrap_err();
        assert!(matches!(err, SentioError::InvalidGraph { .. }));
        assert!(err.to_string().contains("duplicate stage id 'a'"));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let err = GraphBuilder::new()
            .add_stage(NullStage::arc("a"), vec![id("ghost")])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unknown stage 'ghost'"));
    }

    #[test]
    fn two_stage_cycle_is_rejected() {
        let err = GraphBuilder::new()
            .add_stage(NullStage::arc("a"), vec![id("b")])
            .add_stage(NullStage::arc("b"), vec![id("a")])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("dependency cycle"));
        assert!(err.to_string().contains("a, b"));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let err = GraphBuilder::new()
            .add_stage(NullStage::arc("a"), vec![id("a")])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("dependency cycle"));
    }

    /// A cycle behind valid stages only names the cyclic part.
    #[test]
    fn cycle_error_names_only_cyclic_stages() {
        let err = GraphBuilder::new()
            .add_stage(NullStage::arc("root"), vec![])
            .add_stage(NullStage::arc("x"), vec![id("y"), id("root")])
            .add_stage(NullStage::arc("y"), vec![id("x")])
            .build()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("x, y"));
        assert!(!msg.contains("root,"));
    }

    #[test]
    fn empty_graph_builds() {
        let graph = GraphBuilder::new().build().unwrap();
        assert!(graph.is_empty());
    }
}
