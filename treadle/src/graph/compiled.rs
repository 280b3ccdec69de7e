//! Compiled workflow: immutable, supports invoke only.
//!
//! Built by `GraphBuilder::compile`. Holds one entry per node (the executable
//! step and its routing table) plus the entry id and terminal marker. The run
//! loop is a table-driven state machine with an explicit step counter: run the
//! current step, route on the updated state, stop at the terminal marker or
//! when the step budget is exhausted.
//!
//! The compiled artifact has no identity of its own: edit the source workflow
//! and it is stale. Staleness is not detected here; recompile after edits.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::model::WorkflowState;
use crate::router::Router;

use super::step::Step;

/// One compiled node: executable step plus routing table.
pub struct CompiledNode {
    /// The unit of work for this node.
    pub(crate) step: Arc<dyn Step>,
    /// Routing key → next node id (or terminal marker), default key included.
    pub(crate) path_map: HashMap<String, String>,
}

/// Run failure that escaped per-step handling: budget exhaustion or an error
/// from a step. Carries the state accumulated so far, so the caller can fold
/// the failure into a terminal state without losing node outputs.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RunError {
    /// Human-readable failure description.
    pub message: String,
    /// State at the point of failure.
    pub state: WorkflowState,
}

/// Executable graph derived from a `Workflow`.
///
/// **Interaction**: Produced by `GraphBuilder::compile`; driven by
/// `WorkflowExecutor::execute` (or `invoke` directly) with the recursion limit
/// computed at compile time.
pub struct CompiledWorkflow {
    /// Entry node id (the start marker routes here).
    pub(crate) entry_id: String,
    /// Node id → (step, routing table).
    pub(crate) nodes: HashMap<String, CompiledNode>,
    /// Resolves routing keys from step output.
    pub(crate) router: Router,
    /// Reserved node id denoting run completion.
    pub(crate) end_node_id: String,
}

impl CompiledWorkflow {
    /// Entry node id.
    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    /// Number of compiled nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A node's routing table, for inspection.
    pub fn path_map(&self, node_id: &str) -> Option<&HashMap<String, String>> {
        self.nodes.get(node_id).map(|n| &n.path_map)
    }

    /// The router this graph resolves keys with (hosts use it to strip
    /// routing-control text before display).
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Drives the graph from `state` until the terminal marker is reached or
    /// `recursion_limit` steps have run.
    ///
    /// Each iteration executes the current node's step and routes on the
    /// updated state. Budget exhaustion and step errors return a [`RunError`]
    /// carrying the accumulated state; per-node model failures never surface
    /// here; `AgentStep` folds them into state as error content.
    pub async fn invoke(
        &self,
        state: WorkflowState,
        recursion_limit: usize,
    ) -> Result<WorkflowState, RunError> {
        let mut state = state;
        let mut current_id = self.entry_id.clone();
        let mut steps = 0usize;

        info!(entry = %current_id, limit = recursion_limit, "graph run start");
        loop {
            if steps >= recursion_limit {
                return Err(RunError {
                    message: format!(
                        "recursion limit of {} reached before a terminal node",
                        recursion_limit
                    ),
                    state,
                });
            }

            let node = match self.nodes.get(&current_id) {
                Some(n) => n,
                None => {
                    return Err(RunError {
                        message: format!("routing reached unknown node id: {}", current_id),
                        state,
                    });
                }
            };

            debug!(node = %current_id, step = steps, "executing node");
            state = match node.step.run(state.clone()).await {
                Ok(s) => s,
                Err(e) => {
                    return Err(RunError {
                        message: e.to_string(),
                        state,
                    });
                }
            };
            steps += 1;

            let target = self.router.route(&state, &node.path_map);
            if target == self.end_node_id {
                info!(steps, "graph run complete");
                return Ok(state);
            }
            current_id = target;
        }
    }
}
