//! Executable step trait: one node execution against the shared state.
//!
//! State in, state out. Routing is not a step concern: after a step returns,
//! the run loop resolves the next node from the state's trailing routing key
//! via the `Router`.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::model::WorkflowState;

/// One executable step in a compiled workflow.
///
/// Implementations fold their own failures into state as error content
/// wherever possible (see `AgentStep`); an `Err` here aborts the run at the
/// engine boundary.
///
/// **Interaction**: Wired per node by `GraphBuilder`; called by
/// `CompiledWorkflow::invoke`.
#[async_trait]
pub trait Step: Send + Sync {
    /// Node id this step executes. Unique within a compiled workflow.
    fn id(&self) -> &str;

    /// One step: state in, updated state out.
    async fn run(&self, state: WorkflowState) -> Result<WorkflowState, AgentError>;
}
