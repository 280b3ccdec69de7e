//! OpenAI Chat Completions client implementing `LlmClient`.
//!
//! Built by `LlmManager` from `Settings` (credential, model, temperature) with
//! the web-search tool bound. One prompt becomes one user message; the first
//! choice's message content becomes the reply.
//!
//! **Interaction**: Implements `LlmClient`; constructed via `LlmManager`,
//! called by `AgentStep`.

use async_trait::async_trait;
use tracing::{debug, trace};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage, ChatCompletionTool,
        ChatCompletionToolChoiceOption, ChatCompletionTools, CreateChatCompletionRequestArgs,
        FunctionObject, ToolChoiceOptions,
    },
    Client,
};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmReply, ResponseContent, ToolSpec};

/// OpenAI Chat Completions client.
///
/// Holds the configured model name, sampling temperature, and the tools bound
/// to every request. Cheap to share behind an `Arc`.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    tools: Vec<ToolSpec>,
}

impl ChatOpenAI {
    /// Build a client with an explicit API key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            tools: Vec::new(),
        }
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set tools bound to every request (enables tool use in the response).
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, prompt: &str) -> Result<LlmReply, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage::from(prompt),
        )]);

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        if !self.tools.is_empty() {
            let chat_tools: Vec<ChatCompletionTools> = self
                .tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::Auto));
        }

        let request = args.build().map_err(|e| {
            AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
        })?;

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            tools_count = self.tools.len(),
            temperature = ?self.temperature,
            "OpenAI chat create"
        );

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(response = %js, "OpenAI response body");
        }

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
        })?;

        let content = choice.message.content.unwrap_or_default();
        Ok(LlmReply {
            content: ResponseContent::Text(content),
        })
    }
}
