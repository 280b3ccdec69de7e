//! Step execution error types.
//!
//! Used by `Step::run` and by `LlmClient` implementations. Per-node failures are
//! normally folded into state as error content (see `AgentStep`); this error only
//! crosses the run boundary when something escapes that handling.

use thiserror::Error;

/// Error from one step or one model invocation.
///
/// Single-variant on purpose: the engine recovers errors as data close to the
/// source, so no separate taxonomy for tool or model failures is needed here.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. model call failed, empty response).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}
