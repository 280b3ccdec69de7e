//! End-to-end runs over the mock model.

use std::sync::Arc;

use treadle::{MockLlm, Node, RoutingRules, Workflow, WorkflowExecutor};

use crate::common::{compile_with_mock, single_node_workflow, two_node_cycle};

/// **Scenario**: One node with default target END; the model reply carries the
/// default key. The run completes with the reply stored under the node id.
#[tokio::test]
async fn single_node_run_completes() {
    let llm = Arc::new(MockLlm::with_text("Hello ROUTING_KEY: __DEFAULT__"));
    let (graph, limit) = compile_with_mock(&single_node_workflow(), Arc::clone(&llm));

    let executor = WorkflowExecutor::new();
    let (state, log) = executor.execute(&graph, "hi", limit, Vec::new()).await;

    assert_eq!(
        state.node_outputs.get("n1").map(String::as_str),
        Some("Hello ROUTING_KEY: __DEFAULT__")
    );
    assert_eq!(state.current_node_id, "n1");
    assert_eq!(state.input, "hi");
    assert_eq!(llm.calls(), 1, "one step, well under the recursion limit");
    assert!(log.iter().any(|l| l.contains("Workflow execution completed")));
    assert!(!executor.execution_summary(&state).has_error);
}

/// **Scenario**: A two-node cycle that never emits a terminal key stops after
/// exactly `recursion_limit` steps (10 + 3·2 = 16) with a non-completed run.
#[tokio::test]
async fn cycle_stops_at_recursion_limit() {
    let script: Vec<&str> = (0..8)
        .flat_map(|_| ["cycling ROUTING_KEY: x", "cycling ROUTING_KEY: y"])
        .collect();
    let llm = Arc::new(MockLlm::with_texts(script));
    let (graph, limit) = compile_with_mock(&two_node_cycle(), Arc::clone(&llm));
    assert_eq!(limit, 16);

    let executor = WorkflowExecutor::new();
    let (state, log) = executor.execute(&graph, "start", limit, Vec::new()).await;

    assert_eq!(llm.calls(), 16, "exactly recursion_limit steps execute");
    assert!(state
        .last_response_content
        .starts_with("ERROR: Workflow execution failed:"));
    assert_ne!(state.current_node_id, "END");
    assert!(log.iter().any(|l| l.starts_with("❌")));
    assert!(executor.execution_summary(&state).has_error);
}

/// **Scenario**: Steps executed never exceed the compiled recursion limit,
/// whichever way the model routes.
#[tokio::test]
async fn step_count_bounded_by_recursion_limit() {
    for reply in [
        "done ROUTING_KEY: __DEFAULT__",
        "loop ROUTING_KEY: x",
        "no key at all",
    ] {
        let llm = Arc::new(MockLlm::with_text(reply));
        let (graph, limit) = compile_with_mock(&two_node_cycle(), Arc::clone(&llm));
        let executor = WorkflowExecutor::new();
        let _ = executor.execute(&graph, "in", limit, Vec::new()).await;
        assert!(
            llm.calls() <= limit,
            "reply {:?} executed {} steps with limit {}",
            reply,
            llm.calls(),
            limit
        );
    }
}

/// **Scenario**: Two-node chain; the second node's output becomes the final
/// content and both outputs are recorded.
#[tokio::test]
async fn linear_chain_records_all_outputs() {
    let mut wf = Workflow::new("Chain", "");
    wf.add_node(Node::with_id(
        "first",
        "First",
        "step one",
        RoutingRules::to_target("second"),
    ));
    wf.add_node(Node::with_id(
        "second",
        "Second",
        "step two",
        RoutingRules::to_end(),
    ));

    let llm = Arc::new(MockLlm::with_texts([
        "First answer",
        "Second answer ROUTING_KEY: __DEFAULT__",
    ]));
    let (graph, limit) = compile_with_mock(&wf, Arc::clone(&llm));

    let executor = WorkflowExecutor::new();
    let (state, _) = executor.execute(&graph, "in", limit, Vec::new()).await;

    assert_eq!(llm.calls(), 2);
    assert_eq!(
        state.node_outputs.get("first").map(String::as_str),
        Some("First answer ROUTING_KEY: __DEFAULT__"),
        "missing key is repaired before the state update"
    );
    assert_eq!(
        state.node_outputs.get("second").map(String::as_str),
        Some("Second answer ROUTING_KEY: __DEFAULT__")
    );
    assert_eq!(state.current_node_id, "second");
}

/// **Scenario**: A failing model call routes via the reserved `error` key to
/// its mapped target, so the run terminates cleanly instead of looping.
#[tokio::test]
async fn model_failure_routes_via_error_key() {
    let mut wf = Workflow::new("ErrRoute", "");
    wf.add_node(Node::with_id(
        "a",
        "A",
        "p",
        // Error is a legal routing destination; map it straight to END.
        RoutingRules::to_target("a").with_route("error", "END"),
    ));

    let llm = Arc::new(MockLlm::failing("api down"));
    let (graph, limit) = compile_with_mock(&wf, Arc::clone(&llm));

    let executor = WorkflowExecutor::new();
    let (state, log) = executor.execute(&graph, "in", limit, Vec::new()).await;

    assert_eq!(llm.calls(), 1, "error key routes to END on the first step");
    assert!(state.last_response_content.starts_with("ERROR:"));
    assert!(state.last_response_content.ends_with("ROUTING_KEY: error"));
    assert!(
        log.iter().any(|l| l.contains("Workflow execution completed")),
        "per-node errors are in-band; the run itself completes"
    );
    assert!(executor.execution_summary(&state).has_error);
}

/// **Scenario**: Re-running the same node id overwrites its previous output.
#[tokio::test]
async fn rerun_of_same_node_overwrites_output() {
    let mut wf = Workflow::new("Revisit", "");
    wf.add_node(Node::with_id(
        "a",
        "A",
        "p",
        RoutingRules::to_end().with_route("again", "a"),
    ));

    let llm = Arc::new(MockLlm::with_texts([
        "first pass ROUTING_KEY: again",
        "second pass ROUTING_KEY: __DEFAULT__",
    ]));
    let (graph, limit) = compile_with_mock(&wf, Arc::clone(&llm));

    let executor = WorkflowExecutor::new();
    let (state, _) = executor.execute(&graph, "in", limit, Vec::new()).await;

    assert_eq!(llm.calls(), 2);
    assert_eq!(state.node_outputs.len(), 1);
    assert_eq!(
        state.node_outputs.get("a").map(String::as_str),
        Some("second pass ROUTING_KEY: __DEFAULT__")
    );
}
