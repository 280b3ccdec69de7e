//! Shared fixtures for workflow integration tests.

use std::sync::Arc;

use treadle::{
    CompiledWorkflow, GraphBuilder, LlmManager, MockLlm, Node, RoutingRules, Settings, Workflow,
};

/// Compiles `workflow` against a shared mock model. The returned `Arc<MockLlm>`
/// stays observable (call counts) while the graph holds its clone.
pub fn compile_with_mock(
    workflow: &Workflow,
    llm: Arc<MockLlm>,
) -> (CompiledWorkflow, usize) {
    let manager = Arc::new(LlmManager::with_client(llm));
    let builder = GraphBuilder::new(Settings::default(), manager);
    builder.compile(workflow).expect("workflow should compile")
}

/// One node, default target END.
pub fn single_node_workflow() -> Workflow {
    let mut wf = Workflow::new("Single", "");
    wf.add_node(Node::with_id(
        "n1",
        "Node One",
        "Answer: {input_text}",
        RoutingRules::to_end(),
    ));
    wf
}

/// Two nodes that only ever route to each other: A → B on `x`, B → A on `y`.
pub fn two_node_cycle() -> Workflow {
    let mut wf = Workflow::new("Cycle", "");
    wf.add_node(Node::with_id(
        "a",
        "A",
        "step a",
        RoutingRules::to_end().with_route("x", "b"),
    ));
    wf.add_node(Node::with_id(
        "b",
        "B",
        "step b",
        RoutingRules::to_end().with_route("y", "a"),
    ));
    wf
}
