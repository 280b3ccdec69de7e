//! Authoring model: workflows, nodes, and routing rules.
//!
//! Mutable while authoring, immutable once compiled. Node ids must be unique
//! within a workflow; every routing target must name an existing node or the
//! terminal marker. Those invariants are enforced by `GraphBuilder::compile`,
//! not here, so the model stays editable in any intermediate shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::settings::END_NODE_ID;

/// Per-node routing table: where to go next, keyed by the routing key the
/// node's model output ends with.
///
/// `conditional_targets` keys are bare words (matched against `\w+`); values
/// are node ids or the terminal marker. `default_target` is taken when the
/// output carries no key, or a key with no entry.
///
/// Ordered map so key enumeration (routing directives in prompts, compiled
/// path maps) is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRules {
    /// Target node id (or terminal marker) when no conditional key matches.
    pub default_target: String,
    /// Routing key → target node id (or terminal marker).
    #[serde(default)]
    pub conditional_targets: BTreeMap<String, String>,
}

impl RoutingRules {
    /// Rules that route straight to the terminal marker.
    pub fn to_end() -> Self {
        Self {
            default_target: END_NODE_ID.to_string(),
            conditional_targets: BTreeMap::new(),
        }
    }

    /// Rules with the given default target and no conditional routes.
    pub fn to_target(target: impl Into<String>) -> Self {
        Self {
            default_target: target.into(),
            conditional_targets: BTreeMap::new(),
        }
    }

    /// Adds a conditional route (builder).
    pub fn with_route(mut self, key: impl Into<String>, target: impl Into<String>) -> Self {
        self.conditional_targets.insert(key.into(), target.into());
        self
    }
}

/// One workflow node: a prompt sent to the model, plus routing rules.
///
/// The prompt may contain an `{input_text}` placeholder; when absent, the
/// step's context input is appended as a labeled block (see `AgentStep`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique, stable id within the workflow.
    pub id: String,
    /// Display name, used in prompts and logs.
    pub name: String,
    /// Prompt template.
    pub prompt: String,
    /// Where to go after this node, by routing key.
    pub routing_rules: RoutingRules,
}

impl Node {
    /// Node with a fresh random id.
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        routing_rules: RoutingRules,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.into(),
            prompt: prompt.into(),
            routing_rules,
        }
    }

    /// Node with a caller-chosen id.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt: impl Into<String>,
        routing_rules: RoutingRules,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt: prompt.into(),
            routing_rules,
        }
    }
}

/// A user-authored workflow: ordered nodes plus metadata.
///
/// Node order is authoring order, not execution order; the first node is the
/// entry point (the start marker routes to it). Execution order is decided at
/// run time by routing keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique workflow id (storage key).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Nodes in authoring order.
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Workflow {
    /// Empty workflow with a fresh random id.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.into(),
            description: description.into(),
            nodes: Vec::new(),
        }
    }

    /// Appends a node (authoring order).
    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Removes the node with the given id; returns whether one was removed.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        self.nodes.len() != before
    }

    /// Looks up a node by id.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All node ids in authoring order.
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}
