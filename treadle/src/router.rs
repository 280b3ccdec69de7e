//! Routing-key protocol: extract, resolve, and strip routing keys.
//!
//! Routing decisions come from unstructured model text, so extraction is
//! defensive: the key is matched only at the very end of the content
//! (`MARKER <word>$`), a missing or malformed key degrades to the default
//! path, and no operation here returns an error. The anchored-at-end contract
//! is load-bearing for the whole routing scheme; keep alternatives (e.g.
//! structured output) behind this interface.

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::model::WorkflowState;
use crate::settings::Settings;

/// Whether `key` is a bare word, i.e. fully matched by `\w+`.
///
/// The same token grammar the extraction regex uses; `GraphBuilder` validates
/// authored routing keys against it so every compiled key is extractable.
pub fn is_bare_word(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Resolves routing keys from model output against a per-node path map.
///
/// **Interaction**: `CompiledWorkflow`'s run loop calls [`Router::route`] after
/// each step; `AgentStep` uses [`Router::clean_content`] when chaining one
/// node's output into the next prompt, and hosts use it to strip
/// routing-control text before display.
#[derive(Debug, Clone)]
pub struct Router {
    default_key: String,
    end_node_id: String,
    /// `MARKER\s*(\w+)\s*$`, capturing the trailing key.
    extract_re: Regex,
    /// `\s*MARKER\s*\w+\s*$`, the whole trailing marker+key substring.
    clean_re: Regex,
}

impl Router {
    /// Builds a router for the deployment's marker and reserved keys.
    pub fn new(settings: &Settings) -> Self {
        let marker = regex::escape(&settings.routing_key_marker);
        let extract_re = Regex::new(&format!(r"{marker}\s*(\w+)\s*$"))
            .expect("escaped marker forms a valid pattern");
        let clean_re = Regex::new(&format!(r"\s*{marker}\s*\w+\s*$"))
            .expect("escaped marker forms a valid pattern");
        Self {
            default_key: settings.default_routing_key.clone(),
            end_node_id: settings.end_node_id.clone(),
            extract_re,
            clean_re,
        }
    }

    /// Extracts the routing key from response content.
    ///
    /// Scans for a trailing `MARKER <word>` anchored at the end of the string;
    /// returns the word, or the default key when no marker is present.
    pub fn extract_routing_key(&self, content: &str) -> String {
        if let Some(caps) = self.extract_re.captures(content) {
            let key = caps[1].to_string();
            debug!(key = %key, "extracted routing key");
            return key;
        }
        debug!("no routing key found, using default");
        self.default_key.clone()
    }

    /// Whether the content ends with a marker+key at all.
    pub fn has_routing_key(&self, content: &str) -> bool {
        self.extract_re.is_match(content)
    }

    /// Resolves the next node id from state and the node's path map.
    ///
    /// Empty last response → the default entry, or the terminal marker when the
    /// map has none. A key with no entry is logged at warning level and falls
    /// back the same way; a lookup miss is never an error.
    pub fn route(&self, state: &WorkflowState, path_map: &HashMap<String, String>) -> String {
        let fallback = || {
            path_map
                .get(&self.default_key)
                .cloned()
                .unwrap_or_else(|| self.end_node_id.clone())
        };

        let last_content = &state.last_response_content;
        if last_content.is_empty() {
            debug!("no previous response content, using default routing");
            return fallback();
        }

        let routing_key = self.extract_routing_key(last_content);
        let target = match path_map.get(&routing_key) {
            Some(t) => t.clone(),
            None => {
                warn!(key = %routing_key, "routing key not found in path map, using default");
                fallback()
            }
        };
        debug!(key = %routing_key, target = %target, "routing decision");
        target
    }

    /// Removes the trailing marker+key substring, producing display text.
    ///
    /// Content without a marker is returned unchanged (modulo trailing
    /// whitespace trim).
    pub fn clean_content(&self, content: &str) -> String {
        self.clean_re.replace(content, "").trim().to_string()
    }

    /// The reserved default routing key this router falls back to.
    pub fn default_key(&self) -> &str {
        &self.default_key
    }
}
