//! Run-time workflow state, threaded through every step.
//!
//! Created once per run, mutated exactly once per node execution, discarded at
//! run end. `input` is immutable after start; `node_outputs` gains one entry per
//! executed node (a later execution of the same node id overwrites).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Mutable execution-time record for one workflow run.
///
/// Exclusively owned by the single in-flight run; concurrent runs each get
/// their own instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Original user input; immutable after start.
    pub input: String,
    /// Node id → that node's produced text, one entry per executed node.
    pub node_outputs: HashMap<String, String>,
    /// Most recent node's raw output; read by the router.
    pub last_response_content: String,
    /// Id of the most recently executed node.
    pub current_node_id: String,
}

impl WorkflowState {
    /// Fresh state for a run starting with the given input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }
}
