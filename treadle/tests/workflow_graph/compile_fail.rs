//! Compile error cases: no partial graph is ever produced.

use std::sync::Arc;

use treadle::{
    CompilationError, GraphBuilder, LlmManager, MockLlm, Node, RoutingRules, Settings, Workflow,
};

fn builder() -> GraphBuilder {
    GraphBuilder::new(
        Settings::default(),
        Arc::new(LlmManager::with_client(Arc::new(MockLlm::with_text("x")))),
    )
}

/// **Scenario**: A conditional target referencing a non-existent node fails
/// compilation with a descriptive error and no compiled graph.
#[test]
fn conditional_target_to_unknown_node_fails() {
    let mut wf = Workflow::new("Bad", "");
    wf.add_node(Node::with_id(
        "a",
        "A",
        "p",
        RoutingRules::to_end().with_route("go", "ghost"),
    ));

    match builder().compile(&wf) {
        Err(CompilationError::UnknownConditionalTarget { node, key, target }) => {
            assert_eq!(node, "a");
            assert_eq!(key, "go");
            assert_eq!(target, "ghost");
        }
        Err(e) => panic!("expected UnknownConditionalTarget, got {:?}", e),
        Ok(_) => panic!("expected compile error"),
    }
}

/// **Scenario**: A default target referencing a non-existent node fails compilation.
#[test]
fn default_target_to_unknown_node_fails() {
    let mut wf = Workflow::new("Bad", "");
    wf.add_node(Node::with_id("a", "A", "p", RoutingRules::to_target("ghost")));

    assert!(matches!(
        builder().compile(&wf),
        Err(CompilationError::UnknownDefaultTarget { .. })
    ));
}

/// **Scenario**: A workflow with zero nodes cannot be compiled.
#[test]
fn empty_workflow_fails() {
    let wf = Workflow::new("Empty", "");
    assert!(matches!(
        builder().compile(&wf),
        Err(CompilationError::EmptyWorkflow)
    ));
}

/// **Scenario**: Duplicate node ids fail compilation.
#[test]
fn duplicate_node_id_fails() {
    let mut wf = Workflow::new("Dup", "");
    wf.add_node(Node::with_id("a", "A", "p", RoutingRules::to_end()));
    wf.add_node(Node::with_id("a", "A again", "p", RoutingRules::to_end()));

    match builder().compile(&wf) {
        Err(CompilationError::DuplicateNodeId(id)) => assert_eq!(id, "a"),
        other => panic!("expected DuplicateNodeId, got {:?}", other.map(|_| ())),
    }
}

/// **Scenario**: A routing key that is not a bare word fails compilation,
/// since it could never be extracted from model output.
#[test]
fn non_bare_word_routing_key_fails() {
    let mut wf = Workflow::new("BadKey", "");
    wf.add_node(Node::with_id(
        "a",
        "A",
        "p",
        RoutingRules::to_end().with_route("two words", "END"),
    ));

    assert!(matches!(
        builder().compile(&wf),
        Err(CompilationError::InvalidRoutingKey { .. })
    ));
}
