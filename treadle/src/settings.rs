//! Environment-backed configuration.
//!
//! `Settings::from_env` loads `.env` (via dotenv) and reads the process
//! environment once; the resulting value is passed explicitly into the engine
//! (`GraphBuilder`, `LlmManager`, `Router`). No process-wide singleton, so
//! tests and concurrent runs can hold independent instances.

use std::path::PathBuf;

use thiserror::Error;

/// Marker literal preceding a routing key in model output.
pub const ROUTING_KEY_MARKER: &str = "ROUTING_KEY:";

/// Reserved fallback key used when no explicit or valid key is present.
pub const DEFAULT_ROUTING_KEY: &str = "__DEFAULT__";

/// Reserved marker that routes to the workflow entry node.
pub const START_NODE_ID: &str = "__START__";

/// Reserved node id denoting run completion.
pub const END_NODE_ID: &str = "END";

/// Step-budget formula: `recursion_base + recursion_multiplier * node_count`.
pub const DEFAULT_RECURSION_BASE: usize = 10;

/// See [`DEFAULT_RECURSION_BASE`].
pub const DEFAULT_RECURSION_MULTIPLIER: usize = 3;

/// Configuration validation error.
///
/// Returned by `Settings::validate()`. A missing credential is a hard
/// precondition failure for node execution, checked once at startup.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No API credential configured.
    #[error("OPENAI_API_KEY is not set; configure it in the environment or a .env file")]
    MissingApiKey,

    /// Sampling temperature outside the accepted range.
    #[error("LLM_TEMPERATURE must be between 0 and 2, got {0}")]
    TemperatureOutOfRange(f32),
}

/// Application settings: credential, model, storage path, and the reserved
/// routing constants. Configurable but stable within one deployment.
///
/// **Interaction**: Consumed by `LlmManager` (credential, model, temperature),
/// `GraphBuilder` / `Router` (routing constants, step-budget formula), and
/// `WorkflowStorage` (storage path).
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI API credential. Absence fails node execution closed.
    pub openai_api_key: Option<String>,
    /// Model name for completions (default `gpt-4o`).
    pub llm_model_name: String,
    /// Sampling temperature, 0–2 (default 0.2).
    pub llm_temperature: f32,
    /// Directory for persisted workflow JSON files.
    pub workflow_storage_path: PathBuf,

    /// Marker literal preceding a routing key in model output.
    pub routing_key_marker: String,
    /// Reserved fallback routing key.
    pub default_routing_key: String,
    /// Reserved marker that routes to the entry node.
    pub start_node_id: String,
    /// Reserved node id denoting run completion.
    pub end_node_id: String,

    /// Step-budget base (default 10).
    pub recursion_base: usize,
    /// Step-budget per-node multiplier (default 3).
    pub recursion_multiplier: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            llm_model_name: "gpt-4o".to_string(),
            llm_temperature: 0.2,
            workflow_storage_path: PathBuf::from("./workflows"),
            routing_key_marker: ROUTING_KEY_MARKER.to_string(),
            default_routing_key: DEFAULT_ROUTING_KEY.to_string(),
            start_node_id: START_NODE_ID.to_string(),
            end_node_id: END_NODE_ID.to_string(),
            recursion_base: DEFAULT_RECURSION_BASE,
            recursion_multiplier: DEFAULT_RECURSION_MULTIPLIER,
        }
    }
}

impl Settings {
    /// Loads `.env` from the current directory (when present) and builds settings
    /// from the environment. Unset variables fall back to defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mut settings = Self::default();
        settings.openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        if let Ok(model) = std::env::var("LLM_MODEL_NAME") {
            settings.llm_model_name = model;
        }
        if let Some(t) = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|t| t.parse().ok())
        {
            settings.llm_temperature = t;
        }
        if let Ok(path) = std::env::var("WORKFLOW_STORAGE_PATH") {
            settings.workflow_storage_path = PathBuf::from(path);
        }
        settings
    }

    /// Whether an API credential is configured.
    pub fn is_openai_configured(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Validates required settings: credential present, temperature in range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.is_openai_configured() {
            return Err(SettingsError::MissingApiKey);
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(SettingsError::TemperatureOutOfRange(self.llm_temperature));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Default settings carry the reserved routing constants.
    #[test]
    fn default_settings_routing_constants() {
        let s = Settings::default();
        assert_eq!(s.routing_key_marker, "ROUTING_KEY:");
        assert_eq!(s.default_routing_key, "__DEFAULT__");
        assert_eq!(s.start_node_id, "__START__");
        assert_eq!(s.end_node_id, "END");
        assert_eq!(s.recursion_base, 10);
        assert_eq!(s.recursion_multiplier, 3);
    }

    /// **Scenario**: validate() fails without a credential and with an out-of-range temperature.
    #[test]
    fn validate_rejects_missing_key_and_bad_temperature() {
        let s = Settings::default();
        assert!(matches!(s.validate(), Err(SettingsError::MissingApiKey)));

        let s = Settings {
            openai_api_key: Some("sk-test".into()),
            llm_temperature: 2.5,
            ..Settings::default()
        };
        assert!(matches!(
            s.validate(),
            Err(SettingsError::TemperatureOutOfRange(_))
        ));

        let s = Settings {
            openai_api_key: Some("sk-test".into()),
            ..Settings::default()
        };
        assert!(s.validate().is_ok());
    }
}
