//! Workflow compilation error.
//!
//! Returned by `GraphBuilder::compile` when the workflow is structurally
//! invalid. Compilation fails fast; no partial graph is ever produced.

use thiserror::Error;

/// Error when compiling a workflow into an executable graph.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A workflow with zero nodes cannot be compiled.
    #[error("workflow has no nodes")]
    EmptyWorkflow,

    /// Two nodes share an id.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// A default target names neither a node nor the terminal marker.
    #[error("node '{node}': default target references unknown node: {target}")]
    UnknownDefaultTarget { node: String, target: String },

    /// A conditional target names neither a node nor the terminal marker.
    #[error(
        "node '{node}': conditional target for key '{key}' references unknown node: {target}"
    )]
    UnknownConditionalTarget {
        node: String,
        key: String,
        target: String,
    },

    /// A routing key is not a bare word (`\w+`), so it could never be
    /// extracted from model output.
    #[error("node '{node}': routing key '{key}' is not a bare word")]
    InvalidRoutingKey { node: String, key: String },
}
