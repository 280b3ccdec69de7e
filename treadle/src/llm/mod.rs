//! Model capability: client trait, response content decoding, tool specs.
//!
//! `AgentStep` depends on a callable that takes one prompt and returns reply
//! content; this module defines the trait plus the real OpenAI client
//! (`ChatOpenAI`), a mock for tests (`MockLlm`), and the lifecycle manager
//! (`LlmManager`).
//!
//! Response content arrives in more than one shape (plain text, or a sequence
//! of structured segments); it is decoded into [`ResponseContent`] immediately
//! at this boundary so the rest of the engine operates only on resolved text.

mod manager;
mod mock;
mod openai;

pub use manager::LlmManager;
pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;

/// One structured segment of a segmented reply (e.g. gpt-4o list content).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// The segment's text payload.
    pub text: String,
}

/// Reply content, decoded once at the model boundary.
///
/// A closed variant type instead of runtime shape-sniffing: the client
/// resolves whatever the API returned into one of these, and `resolve_text`
/// is the single place the engine turns it into text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponseContent {
    /// Plain text reply.
    Text(String),
    /// Sequence of structured segments; the first segment's text is the reply.
    Segments(Vec<Segment>),
    /// Anything else; stringified as a last resort.
    Other(Value),
}

impl ResponseContent {
    /// Resolves to the text the engine operates on.
    ///
    /// `Segments` resolves to the first segment's text (empty when there are
    /// none); `Other` is stringified. Callers treat an empty result as a
    /// failed step, since a routing decision cannot be derived from empty content.
    pub fn resolve_text(&self) -> String {
        match self {
            ResponseContent::Text(s) => s.clone(),
            ResponseContent::Segments(segments) => segments
                .first()
                .map(|s| s.text.clone())
                .unwrap_or_default(),
            ResponseContent::Other(value) => value.to_string(),
        }
    }
}

/// Reply from one model invocation.
#[derive(Debug, Clone)]
pub struct LlmReply {
    /// Decoded reply content.
    pub content: ResponseContent,
}

/// Model client: one prompt in, one reply out.
///
/// The single blocking external call per workflow step. Implementations:
/// [`ChatOpenAI`] (real API, tool-augmented), [`MockLlm`] (scripted, tests).
///
/// **Interaction**: Obtained from [`LlmManager`]; called by `AgentStep`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke the model with one prompt; returns decoded reply content.
    async fn invoke(&self, prompt: &str) -> Result<LlmReply, AgentError>;
}

/// Tool specification bound to a completion request.
///
/// Name, description, and a JSON Schema for arguments: the shape the chat
/// API's function-tool declaration takes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name.
    pub name: String,
    /// Human-readable description for the model.
    pub description: Option<String>,
    /// JSON Schema for arguments.
    pub input_schema: Value,
}

/// The web-search tool bound to every node completion.
///
/// The engine always gives nodes at least this capability; prompts tell the
/// model to search the web when the task needs it.
pub fn web_search_tool() -> ToolSpec {
    ToolSpec {
        name: "web_search".to_string(),
        description: Some("Search the web for up-to-date information.".to_string()),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: resolve_text handles all three content shapes.
    #[test]
    fn resolve_text_all_variants() {
        assert_eq!(ResponseContent::Text("hi".into()).resolve_text(), "hi");
        assert_eq!(
            ResponseContent::Segments(vec![
                Segment { text: "first".into() },
                Segment { text: "second".into() },
            ])
            .resolve_text(),
            "first"
        );
        assert_eq!(ResponseContent::Segments(vec![]).resolve_text(), "");
        assert_eq!(
            ResponseContent::Other(serde_json::json!({"k": 1})).resolve_text(),
            r#"{"k":1}"#
        );
    }

    /// **Scenario**: web_search_tool declares a query argument.
    #[test]
    fn web_search_tool_schema_has_query() {
        let spec = web_search_tool();
        assert_eq!(spec.name, "web_search");
        assert!(spec.input_schema["properties"]["query"].is_object());
    }
}
