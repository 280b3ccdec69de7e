//! Graph builder: validate a workflow and lower it into an executable graph.
//!
//! Validation fails fast: a dangling target, duplicate id, or malformed
//! routing key aborts compilation with a descriptive error and no partial
//! graph. On success every node gets a routing table (conditional targets
//! merged with the default entry) and an `AgentStep` wired to the shared
//! model capability, and the step budget is computed from node count.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;

use crate::llm::LlmManager;
use crate::model::Workflow;
use crate::node::AgentStep;
use crate::router::{is_bare_word, Router};
use crate::settings::Settings;

use super::compile_error::CompilationError;
use super::compiled::{CompiledNode, CompiledWorkflow};

/// Compiles `Workflow` values into `CompiledWorkflow` + step budget.
///
/// The compiled artifact is a snapshot: editing the workflow afterwards makes
/// it stale, and staleness is not detected; recompile after edits.
///
/// **Interaction**: Holds `Settings` (routing constants, budget formula) and
/// the shared `LlmManager` that every wired `AgentStep` draws its client from.
pub struct GraphBuilder {
    settings: Settings,
    llm: Arc<LlmManager>,
}

impl GraphBuilder {
    /// Builder over the given configuration and model capability.
    pub fn new(settings: Settings, llm: Arc<LlmManager>) -> Self {
        Self { settings, llm }
    }

    /// Validates and lowers the workflow; returns the executable graph and its
    /// recursion limit (`base + multiplier * node_count`).
    pub fn compile(
        &self,
        workflow: &Workflow,
    ) -> Result<(CompiledWorkflow, usize), CompilationError> {
        self.validate(workflow)?;

        let default_key = &self.settings.default_routing_key;
        let mut nodes = HashMap::with_capacity(workflow.nodes.len());
        for node in &workflow.nodes {
            // Conditional-target keys constrain the model's output; the
            // default entry completes the routing table.
            let possible_keys: Vec<String> = node
                .routing_rules
                .conditional_targets
                .keys()
                .cloned()
                .collect();
            let mut path_map: HashMap<String, String> = node
                .routing_rules
                .conditional_targets
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            path_map.insert(
                default_key.clone(),
                node.routing_rules.default_target.clone(),
            );

            let step = AgentStep::new(
                node.clone(),
                possible_keys,
                Arc::clone(&self.llm),
                &self.settings,
            );
            nodes.insert(
                node.id.clone(),
                CompiledNode {
                    step: Arc::new(step),
                    path_map,
                },
            );
        }

        // First node in authoring order is the entry point.
        let entry_id = workflow.nodes[0].id.clone();
        let recursion_limit = self.settings.recursion_base
            + self.settings.recursion_multiplier * workflow.nodes.len();

        info!(
            workflow = %workflow.id,
            nodes = workflow.nodes.len(),
            recursion_limit,
            "workflow compiled"
        );
        Ok((
            CompiledWorkflow {
                entry_id,
                nodes,
                router: Router::new(&self.settings),
                end_node_id: self.settings.end_node_id.clone(),
            },
            recursion_limit,
        ))
    }

    /// Structural validation: non-empty, unique ids, every target resolves,
    /// every routing key is a bare word.
    fn validate(&self, workflow: &Workflow) -> Result<(), CompilationError> {
        if workflow.nodes.is_empty() {
            return Err(CompilationError::EmptyWorkflow);
        }

        let mut ids: HashSet<&str> = HashSet::new();
        for node in &workflow.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(CompilationError::DuplicateNodeId(node.id.clone()));
            }
        }

        let end = self.settings.end_node_id.as_str();
        let resolves = |target: &str| target == end || ids.contains(target);
        for node in &workflow.nodes {
            let rules = &node.routing_rules;
            if !resolves(&rules.default_target) {
                return Err(CompilationError::UnknownDefaultTarget {
                    node: node.id.clone(),
                    target: rules.default_target.clone(),
                });
            }
            for (key, target) in &rules.conditional_targets {
                if !is_bare_word(key) {
                    return Err(CompilationError::InvalidRoutingKey {
                        node: node.id.clone(),
                        key: key.clone(),
                    });
                }
                if !resolves(target) {
                    return Err(CompilationError::UnknownConditionalTarget {
                        node: node.id.clone(),
                        key: key.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::model::{Node, RoutingRules};

    fn builder() -> GraphBuilder {
        GraphBuilder::new(
            Settings::default(),
            Arc::new(LlmManager::with_client(Arc::new(MockLlm::with_text("x")))),
        )
    }

    fn two_node_workflow() -> Workflow {
        let mut wf = Workflow::new("Two", "");
        wf.add_node(Node::with_id(
            "a",
            "A",
            "do a",
            RoutingRules::to_target("b").with_route("again", "a"),
        ));
        wf.add_node(Node::with_id("b", "B", "do b", RoutingRules::to_end()));
        wf
    }

    /// **Scenario**: recursion_limit = base + multiplier * node_count (10 + 3*2 = 16).
    #[test]
    fn recursion_limit_from_topology() {
        let (_, limit) = builder().compile(&two_node_workflow()).unwrap();
        assert_eq!(limit, 16);
    }

    /// **Scenario**: Compiling the same workflow twice yields identical routing
    /// tables and the same recursion limit.
    #[test]
    fn compile_is_idempotent() {
        let wf = two_node_workflow();
        let b = builder();
        let (g1, l1) = b.compile(&wf).unwrap();
        let (g2, l2) = b.compile(&wf).unwrap();
        assert_eq!(l1, l2);
        assert_eq!(g1.entry_id(), g2.entry_id());
        for id in ["a", "b"] {
            assert_eq!(g1.path_map(id), g2.path_map(id));
        }
    }

    /// **Scenario**: The per-node routing table merges conditional targets with the default entry.
    #[test]
    fn path_map_includes_default_entry() {
        let (graph, _) = builder().compile(&two_node_workflow()).unwrap();
        let map = graph.path_map("a").unwrap();
        assert_eq!(map.get("again").map(String::as_str), Some("a"));
        assert_eq!(map.get("__DEFAULT__").map(String::as_str), Some("b"));
    }
}
