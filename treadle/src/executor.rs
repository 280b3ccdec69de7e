//! Workflow execution engine: drive a compiled graph to completion.
//!
//! Builds the initial state from the caller's input, appends human-readable
//! milestone lines to the execution log, and invokes the compiled graph under
//! its step budget. Runtime failures become terminal state, not escaped
//! errors: whatever the run accumulated is preserved and the final content is
//! replaced with an `ERROR:` description.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{error, info};

use crate::graph::CompiledWorkflow;
use crate::model::WorkflowState;

/// Read-only view over a finished run.
///
/// `has_error` is a cheap best-effort signal (a substring match on `ERROR`
/// in the final content), not a structured error flag.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummary {
    /// Number of distinct nodes that produced output.
    pub nodes_executed: usize,
    /// Node id → produced text.
    pub node_outputs: HashMap<String, String>,
    /// The final content (most recent node's output, or error description).
    pub final_output: String,
    /// Id of the last executed node.
    pub current_node: String,
    /// Whether the final content carries an `ERROR` marker.
    pub has_error: bool,
}

/// Executes compiled workflows.
///
/// **Interaction**: Pure caller of `CompiledWorkflow::invoke`; hosts pass the
/// recursion limit returned by `GraphBuilder::compile`.
#[derive(Debug, Default)]
pub struct WorkflowExecutor;

impl WorkflowExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Runs the graph from `initial_input` until the terminal marker or the
    /// step budget; returns the final state and the milestone log.
    ///
    /// Milestones are appended to `execution_log` so hosts can accumulate one
    /// log across attempts. On any run failure the returned state preserves
    /// accumulated `node_outputs`/`current_node_id` and carries the failure in
    /// `last_response_content`; budget exhaustion and a clean stop are
    /// distinguished by the log and by `current_node_id`, there is no
    /// separate truncation flag.
    pub async fn execute(
        &self,
        compiled: &CompiledWorkflow,
        initial_input: &str,
        recursion_limit: usize,
        mut execution_log: Vec<String>,
    ) -> (WorkflowState, Vec<String>) {
        let initial_state = WorkflowState::new(initial_input);

        info!(input = %truncate(initial_input, 100), "starting workflow execution");
        execution_log.push("🚀 Starting workflow execution".to_string());
        execution_log.push(format!("📥 Input: {}...", truncate(initial_input, 200)));

        match compiled.invoke(initial_state, recursion_limit).await {
            Ok(final_state) => {
                info!("workflow execution completed");
                execution_log.push("✅ Workflow execution completed".to_string());
                (final_state, execution_log)
            }
            Err(run_err) => {
                let error_msg = format!("Workflow execution failed: {}", run_err.message);
                error!(error = %error_msg, "workflow execution failed");
                execution_log.push(format!("❌ {}", error_msg));

                let mut state = run_err.state;
                state.last_response_content = format!("ERROR: {}", error_msg);
                (state, execution_log)
            }
        }
    }

    /// Derives the read-only summary of a finished run.
    pub fn execution_summary(&self, final_state: &WorkflowState) -> ExecutionSummary {
        ExecutionSummary {
            nodes_executed: final_state.node_outputs.len(),
            node_outputs: final_state.node_outputs.clone(),
            final_output: final_state.last_response_content.clone(),
            current_node: final_state.current_node_id.clone(),
            has_error: final_state.last_response_content.contains("ERROR"),
        }
    }
}

/// First `max_chars` characters (not bytes, so multi-byte input can't split).
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
