//! Graph compilation and execution: lower a workflow, run it step-by-step.
//!
//! `GraphBuilder` validates a `Workflow` and lowers it into a
//! `CompiledWorkflow` (a table from node id to executable step and routing
//! table, plus an entry id) together with a step budget derived from
//! topology. `CompiledWorkflow::invoke` drives it: run step, resolve next id
//! from the routing key, stop at the terminal marker or when the budget runs
//! out. A plain table-driven state machine; no external graph engine.

mod builder;
mod compile_error;
mod compiled;
mod step;

pub use builder::GraphBuilder;
pub use compile_error::CompilationError;
pub use compiled::{CompiledNode, CompiledWorkflow, RunError};
pub use step::Step;
