//! Agent step: execute one node against the model capability.
//!
//! Builds the prompt from workflow state (placeholder substitution or a
//! labeled context block), appends the routing directive enumerating the
//! node's legal keys, makes the single model call for the step, resolves the
//! reply to text, and repairs the routing key before folding the result into
//! state. Every failure on this path is converted to in-band error content
//! carrying the reserved `error` key: a broken step routes, it does not
//! crash the run.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::AgentError;
use crate::graph::Step;
use crate::llm::{LlmManager, LlmReply};
use crate::model::{Node, WorkflowState};
use crate::router::Router;
use crate::settings::Settings;

/// Placeholder in node prompts replaced with the step's context input.
const INPUT_TEXT_PLACEHOLDER: &str = "{input_text}";

/// One node's unit of work: prompt the model, repair the routing key, fold
/// the reply into state.
///
/// **Interaction**: Wired per node by `GraphBuilder`; draws its client from
/// the shared `LlmManager` at the start of every run and fails the step
/// closed (as error content) when the capability is unavailable.
pub struct AgentStep {
    node: Node,
    /// Legal conditional routing keys for this node, enumerated in the
    /// routing directive and enforced on the reply.
    possible_keys: Vec<String>,
    llm: Arc<LlmManager>,
    router: Router,
    marker: String,
    default_key: String,
}

impl AgentStep {
    /// Step for `node`, constrained to `possible_keys`.
    pub fn new(
        node: Node,
        possible_keys: Vec<String>,
        llm: Arc<LlmManager>,
        settings: &Settings,
    ) -> Self {
        Self {
            node,
            possible_keys,
            llm,
            router: Router::new(settings),
            marker: settings.routing_key_marker.clone(),
            default_key: settings.default_routing_key.clone(),
        }
    }

    /// The step's context input: the previous node's cleaned output, or the
    /// original user input for the first executed node.
    fn context_input(&self, state: &WorkflowState) -> String {
        if state.last_response_content.is_empty() {
            state.input.clone()
        } else {
            self.router.clean_content(&state.last_response_content)
        }
    }

    /// Substitutes `{input_text}` when present; otherwise appends the context
    /// as a labeled block.
    fn prepare_prompt(&self, context_input: &str) -> String {
        let prompt = &self.node.prompt;
        if prompt.contains(INPUT_TEXT_PLACEHOLDER) {
            return prompt.replace(INPUT_TEXT_PLACEHOLDER, context_input);
        }
        if context_input.is_empty() {
            return prompt.clone();
        }
        format!("{}\n\nInput Context:\n{}", prompt, context_input)
    }

    /// Appends the fixed-format routing directive, enumerating the legal keys
    /// verbatim so the model cannot invent new ones.
    fn add_routing_instructions(&self, prompt: &str) -> String {
        let current_task = format!(
            "Current Task ({}):\n{}\n(Search web if needed).",
            self.node.name, prompt
        );

        let key_options: Vec<String> = self
            .possible_keys
            .iter()
            .filter(|k| !k.is_empty() && *k != &self.default_key)
            .map(|k| format!("'{}'", k))
            .collect();
        let key_options_text = if key_options.is_empty() {
            "none".to_string()
        } else {
            key_options.join(", ")
        };

        format!(
            "{}\n\n--- ROUTING ---\nAfter your response, you MUST end with '{} <key>' (e.g., from [{}]).\n--- END ROUTING ---",
            current_task, self.marker, key_options_text
        )
    }

    /// Resolves the reply to text; empty content is a failed step since no
    /// routing decision can be derived from it.
    fn resolve_content(&self, reply: &LlmReply) -> Result<String, AgentError> {
        let text = reply.content.resolve_text();
        if text.trim().is_empty() {
            return Err(AgentError::ExecutionFailed(
                "model returned empty response content".to_string(),
            ));
        }
        Ok(text)
    }

    /// Guarantees the content ends with a resolvable routing key.
    ///
    /// A trailing key that is legal for this node (a possible key or the
    /// default) is left alone; an illegal key is stripped and replaced with
    /// the default; a missing marker gets the default appended. The router
    /// then never hits its not-found fallback on this node's output.
    fn ensure_routing_key(&self, content: String) -> String {
        if self.router.has_routing_key(&content) {
            let key = self.router.extract_routing_key(&content);
            if key == self.default_key || self.possible_keys.contains(&key) {
                return content;
            }
            debug!(key = %key, "illegal routing key, replacing with default");
            let stripped = self.router.clean_content(&content);
            return format!("{} {} {}", stripped, self.marker, self.default_key);
        }
        debug!("no routing key in response, appending default");
        format!("{} {} {}", content, self.marker, self.default_key)
    }

    /// Folds produced content into state. `input` is left untouched.
    fn update_state(&self, mut state: WorkflowState, content: String) -> WorkflowState {
        state
            .node_outputs
            .insert(self.node.id.clone(), content.clone());
        state.last_response_content = content;
        state.current_node_id = self.node.id.clone();
        state
    }

    /// Error content carrying the reserved `error` routing key, folded into
    /// state like a normal node output.
    fn error_state(&self, state: WorkflowState, message: &str) -> WorkflowState {
        let content = format!("ERROR: {} {} error", message, self.marker);
        self.update_state(state, content)
    }
}

#[async_trait]
impl Step for AgentStep {
    fn id(&self) -> &str {
        &self.node.id
    }

    async fn run(&self, state: WorkflowState) -> Result<WorkflowState, AgentError> {
        info!(node = %self.node.id, name = %self.node.name, "executing node");

        let Some(client) = self.llm.client() else {
            error!(node = %self.node.id, "model capability not initialized");
            return Ok(self.error_state(state, "LLM not initialized"));
        };

        let context_input = self.context_input(&state);
        let prompt = self.add_routing_instructions(&self.prepare_prompt(&context_input));
        debug!(prompt_len = prompt.len(), "sending prompt to model");

        match client
            .invoke(&prompt)
            .await
            .and_then(|reply| self.resolve_content(&reply))
        {
            Ok(content) => {
                let content = self.ensure_routing_key(content);
                debug!(response_len = content.len(), "node response");
                Ok(self.update_state(state, content))
            }
            Err(e) => {
                error!(node = %self.node.name, error = %e, "error in node");
                Ok(self.error_state(
                    state,
                    &format!("Error in node {}: {}", self.node.name, e),
                ))
            }
        }
    }
}
