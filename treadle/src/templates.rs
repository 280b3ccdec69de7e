//! Built-in workflow templates.
//!
//! Pre-built `Workflow` values the host offers as starting points. The engine
//! treats an instantiated template exactly like a user-authored workflow.

use serde::Serialize;

use crate::model::{Node, RoutingRules, Workflow};

/// Listing metadata for one template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

/// Supplies pre-built workflows by template id.
#[derive(Debug, Default)]
pub struct TemplateLoader;

impl TemplateLoader {
    pub fn new() -> Self {
        Self
    }

    /// All available templates.
    pub fn list_templates(&self) -> Vec<TemplateInfo> {
        vec![
            TemplateInfo {
                id: "research-and-summarize",
                name: "Research and Summarize",
                description: "Research a topic with web search, then condense the findings.",
                category: "research",
            },
            TemplateInfo {
                id: "draft-review-loop",
                name: "Draft with Review Loop",
                description: "Draft an answer, review it, and loop back for revision until approved.",
                category: "writing",
            },
            TemplateInfo {
                id: "triage",
                name: "Message Triage",
                description: "Classify an incoming message and hand it to the matching responder.",
                category: "support",
            },
        ]
    }

    /// Instantiates a template as an ordinary workflow.
    pub fn load_template(&self, id: &str) -> Option<Workflow> {
        match id {
            "research-and-summarize" => Some(research_and_summarize()),
            "draft-review-loop" => Some(draft_review_loop()),
            "triage" => Some(triage()),
            _ => None,
        }
    }
}

fn research_and_summarize() -> Workflow {
    let mut wf = Workflow::new(
        "Research and Summarize",
        "Research a topic with web search, then condense the findings.",
    );
    wf.add_node(Node::with_id(
        "research",
        "Research",
        "Research the following topic thoroughly. Use web search for current \
         information and collect the key facts:\n\n{input_text}",
        RoutingRules::to_target("summarize"),
    ));
    wf.add_node(Node::with_id(
        "summarize",
        "Summarize",
        "Condense the research below into a short, well-structured summary \
         for a general reader.",
        RoutingRules::to_end(),
    ));
    wf
}

fn draft_review_loop() -> Workflow {
    let mut wf = Workflow::new(
        "Draft with Review Loop",
        "Draft an answer, review it, and loop back for revision until approved.",
    );
    wf.add_node(Node::with_id(
        "draft",
        "Draft",
        "Write a draft answer for the request below. If reviewer feedback is \
         included, address every point of it:\n\n{input_text}",
        RoutingRules::to_target("review"),
    ));
    wf.add_node(Node::with_id(
        "review",
        "Review",
        "Review the draft below for accuracy and clarity. End with the key \
         'revise' if it needs another pass, or 'approve' if it is ready.",
        RoutingRules::to_end()
            .with_route("revise", "draft")
            .with_route("approve", "END"),
    ));
    wf
}

fn triage() -> Workflow {
    let mut wf = Workflow::new(
        "Message Triage",
        "Classify an incoming message and hand it to the matching responder.",
    );
    wf.add_node(Node::with_id(
        "classify",
        "Classify",
        "Classify the message below. End with the key 'question' for a \
         product question or 'complaint' for a complaint:\n\n{input_text}",
        RoutingRules::to_target("answer")
            .with_route("question", "answer")
            .with_route("complaint", "resolve"),
    ));
    wf.add_node(Node::with_id(
        "answer",
        "Answer",
        "Answer the product question below helpfully and concisely.",
        RoutingRules::to_end(),
    ));
    wf.add_node(Node::with_id(
        "resolve",
        "Resolve Complaint",
        "Respond to the complaint below: acknowledge the problem and propose \
         a concrete resolution.",
        RoutingRules::to_end(),
    ));
    wf
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::GraphBuilder;
    use crate::llm::{LlmManager, MockLlm};
    use crate::settings::Settings;

    /// **Scenario**: Every listed template instantiates and compiles cleanly.
    #[test]
    fn all_templates_compile() {
        let loader = TemplateLoader::new();
        let builder = GraphBuilder::new(
            Settings::default(),
            Arc::new(LlmManager::with_client(Arc::new(MockLlm::with_text("x")))),
        );
        for info in loader.list_templates() {
            let wf = loader
                .load_template(info.id)
                .unwrap_or_else(|| panic!("template {} should load", info.id));
            assert!(!wf.nodes.is_empty(), "template {} has nodes", info.id);
            builder
                .compile(&wf)
                .unwrap_or_else(|e| panic!("template {} should compile: {}", info.id, e));
        }
    }

    /// **Scenario**: Unknown template ids yield None.
    #[test]
    fn unknown_template_is_none() {
        assert!(TemplateLoader::new().load_template("nope").is_none());
    }
}
