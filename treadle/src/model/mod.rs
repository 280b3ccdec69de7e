//! Workflow data model: authoring-time definition and run-time state.
//!
//! `Workflow`/`Node`/`RoutingRules` are the persisted, user-edited definition:
//! pure data plus invariants, no behavior. `WorkflowState` is the mutable record
//! threaded through one run. Compilation consumes the former and produces the
//! executable graph; see `graph`.

mod state;
mod workflow;

pub use state::WorkflowState;
pub use workflow::{Node, RoutingRules, Workflow};
