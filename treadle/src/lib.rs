//! # Treadle
//!
//! Compile user-authored agent workflows into routed state graphs and run
//! them. A workflow is a directed graph of nodes, each wrapping one prompt
//! sent to a language model; the next node is chosen at runtime by a routing
//! key the model embeds at the end of its reply.
//!
//! ## Design principles
//!
//! - **Data model first**: [`Workflow`]/[`Node`]/[`RoutingRules`] are pure
//!   data plus invariants; all behavior lives in the compiler and the engine.
//! - **Compile, then run**: [`GraphBuilder::compile`] validates the workflow
//!   and lowers it into a [`CompiledWorkflow`] plus a step budget derived
//!   from topology. Compilation never yields a partial graph.
//! - **Routing is defensive**: keys are extracted from free model text only
//!   when anchored at the end of the reply; a missing or illegal key degrades
//!   to the default path. See [`Router`].
//! - **Errors are data**: a failing node folds its failure into state as
//!   error content carrying the reserved `error` key and the run keeps
//!   routing; only compilation and configuration errors surface as failure
//!   values to the caller.
//!
//! ## Main modules
//!
//! - [`model`]: [`Workflow`], [`Node`], [`RoutingRules`], [`WorkflowState`].
//! - [`graph`]: [`GraphBuilder`], [`CompiledWorkflow`], [`Step`],
//!   [`CompilationError`].
//! - [`node`]: [`AgentStep`] — the per-node unit of work.
//! - [`router`]: [`Router`] — routing-key extraction and resolution.
//! - [`executor`]: [`WorkflowExecutor`], [`ExecutionSummary`].
//! - [`llm`]: [`LlmClient`] trait, [`ChatOpenAI`], [`MockLlm`], [`LlmManager`].
//! - [`settings`]: [`Settings`] and the reserved routing constants.
//! - [`storage`]: [`WorkflowStorage`] — JSON persistence by workflow id.
//! - [`templates`]: [`TemplateLoader`] — built-in starting points.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use treadle::{
//!     GraphBuilder, LlmManager, MockLlm, Node, RoutingRules, Settings, Workflow,
//!     WorkflowExecutor,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut workflow = Workflow::new("Answer", "one-node workflow");
//! workflow.add_node(Node::with_id(
//!     "answer",
//!     "Answer",
//!     "Answer the question: {input_text}",
//!     RoutingRules::to_end(),
//! ));
//!
//! let llm = Arc::new(LlmManager::with_client(Arc::new(MockLlm::with_text(
//!     "42 ROUTING_KEY: __DEFAULT__",
//! ))));
//! let builder = GraphBuilder::new(Settings::default(), llm);
//! let (compiled, limit) = builder.compile(&workflow).expect("valid workflow");
//!
//! let executor = WorkflowExecutor::new();
//! let (state, log) = executor.execute(&compiled, "what is 6*7?", limit, Vec::new()).await;
//! println!("{}", compiled.router().clean_content(&state.last_response_content));
//! for line in log {
//!     println!("{}", line);
//! }
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod graph;
pub mod llm;
pub mod model;
pub mod node;
pub mod router;
pub mod settings;
pub mod storage;
pub mod templates;

pub use error::AgentError;
pub use executor::{ExecutionSummary, WorkflowExecutor};
pub use graph::{CompilationError, CompiledWorkflow, GraphBuilder, RunError, Step};
pub use llm::{
    web_search_tool, ChatOpenAI, LlmClient, LlmManager, LlmReply, MockLlm, ResponseContent,
    Segment, ToolSpec,
};
pub use model::{Node, RoutingRules, Workflow, WorkflowState};
pub use node::AgentStep;
pub use router::{is_bare_word, Router};
pub use settings::{Settings, SettingsError};
pub use storage::{StorageError, WorkflowMetadata, WorkflowStorage};
pub use templates::{TemplateInfo, TemplateLoader};

/// When running `cargo test -p treadle`, initializes tracing from `RUST_LOG`
/// so unit tests in `src/**` can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
