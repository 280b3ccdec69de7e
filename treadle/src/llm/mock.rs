//! Mock LLM for tests and examples.
//!
//! Returns scripted replies in sequence, repeating the last one once the
//! script is exhausted; configurable to return segmented or arbitrary-shaped
//! content, or to fail every call.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmReply, ResponseContent, Segment};

/// Mock LLM: scripted replies, call counting, optional failure mode.
///
/// **Interaction**: Implements `LlmClient`; injected into `LlmManager` via
/// `LlmManager::with_client` so tests exercise the full step path.
pub struct MockLlm {
    /// Replies returned in order; the last one repeats when exhausted.
    script: Vec<ResponseContent>,
    /// When Some, every invoke fails with this message.
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl MockLlm {
    /// Mock returning the same text reply on every call.
    pub fn with_text(content: impl Into<String>) -> Self {
        Self::from_script(vec![ResponseContent::Text(content.into())])
    }

    /// Mock returning the given text replies in order, repeating the last.
    pub fn with_texts<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_script(
            contents
                .into_iter()
                .map(|c| ResponseContent::Text(c.into()))
                .collect(),
        )
    }

    /// Mock returning a segmented reply (list-of-segments content shape).
    pub fn with_segments<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_script(vec![ResponseContent::Segments(
            texts
                .into_iter()
                .map(|t| Segment { text: t.into() })
                .collect(),
        )])
    }

    /// Mock returning arbitrary scripted content shapes in order.
    pub fn from_script(script: Vec<ResponseContent>) -> Self {
        Self {
            script,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock whose every invocation fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Vec::new(),
            fail_with: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, _prompt: &str) -> Result<LlmReply, AgentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref msg) = self.fail_with {
            return Err(AgentError::ExecutionFailed(msg.clone()));
        }
        let content = self
            .script
            .get(n)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| ResponseContent::Text(String::new()));
        Ok(LlmReply { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Scripted replies come back in order, then the last repeats.
    #[tokio::test]
    async fn script_plays_in_order_then_repeats_last() {
        let llm = MockLlm::with_texts(["one", "two"]);
        for expected in ["one", "two", "two", "two"] {
            let reply = llm.invoke("p").await.unwrap();
            assert_eq!(reply.content.resolve_text(), expected);
        }
        assert_eq!(llm.calls(), 4);
    }

    /// **Scenario**: failing() errors on every call and still counts calls.
    #[tokio::test]
    async fn failing_mock_errors() {
        let llm = MockLlm::failing("boom");
        let err = llm.invoke("p").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(llm.calls(), 1);
    }
}
