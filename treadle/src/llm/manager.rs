//! Model-capability lifecycle: lazy init, reinit on credential change.
//!
//! An explicitly constructed object shared by reference into the engine (no
//! ambient global), so concurrent runs and tests can supply independent
//! instances. The client is built once and read-shared across steps; it is
//! rebuilt only when the credential changes between runs, never mid-run.

use std::sync::{Arc, RwLock};

use tracing::{error, info, warn};

use crate::llm::{web_search_tool, ChatOpenAI, LlmClient};
use crate::settings::Settings;

#[derive(Default)]
struct Inner {
    client: Option<Arc<dyn LlmClient>>,
    /// Credential the current client was built with.
    api_key: Option<String>,
    /// True for test-injected clients, which skip the credential lifecycle.
    injected: bool,
}

/// Manages model-client initialization and tool binding.
///
/// **Interaction**: Constructed by the host from `Settings`, passed as
/// `Arc<LlmManager>` into `GraphBuilder`; `AgentStep` asks it for a client at
/// the start of every step and fails the step closed when none is available.
pub struct LlmManager {
    settings: RwLock<Settings>,
    inner: RwLock<Inner>,
}

impl LlmManager {
    /// Manager for the given settings; the client is built lazily on first use.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Manager wrapping an already-built client (tests, alternative backends).
    pub fn with_client(client: Arc<dyn LlmClient>) -> Self {
        Self {
            settings: RwLock::new(Settings::default()),
            inner: RwLock::new(Inner {
                client: Some(client),
                api_key: None,
                injected: true,
            }),
        }
    }

    /// Builds the client with tools bound. Returns whether initialization succeeded.
    pub fn initialize(&self) -> bool {
        let settings = self.settings.read().expect("settings lock").clone();
        if let Err(e) = settings.validate() {
            error!(error = %e, "cannot initialize model client");
            return false;
        }
        // validate() guarantees the key is present here.
        let Some(api_key) = settings.openai_api_key.clone() else {
            return false;
        };

        let client = ChatOpenAI::new(api_key.clone(), settings.llm_model_name.clone())
            .with_temperature(settings.llm_temperature)
            .with_tools(vec![web_search_tool()]);

        let mut inner = self.inner.write().expect("client lock");
        inner.client = Some(Arc::new(client));
        inner.api_key = Some(api_key);
        inner.injected = false;
        info!(
            model = %settings.llm_model_name,
            temperature = settings.llm_temperature,
            "model client initialized"
        );
        true
    }

    /// Whether a client is currently available.
    pub fn is_initialized(&self) -> bool {
        self.inner.read().expect("client lock").client.is_some()
    }

    /// Rebuilds the client when the credential changed, clears it when the
    /// credential was removed. Returns whether a client is available after.
    pub fn reinitialize_if_needed(&self) -> bool {
        {
            let inner = self.inner.read().expect("client lock");
            if inner.injected {
                return inner.client.is_some();
            }
            let settings = self.settings.read().expect("settings lock");
            let configured = settings.is_openai_configured();
            let key_unchanged = inner.api_key == settings.openai_api_key;
            if inner.client.is_some() && configured && key_unchanged {
                return true;
            }
            if inner.client.is_some() && !configured {
                drop(inner);
                warn!("credential removed, clearing model client");
                let mut inner = self.inner.write().expect("client lock");
                inner.client = None;
                inner.api_key = None;
                return false;
            }
            if !configured {
                return false;
            }
        }
        info!("credential changed or client missing, (re)initializing");
        self.initialize()
    }

    /// Replaces settings (e.g. the host reloaded configuration), then applies
    /// the reinit-on-change lifecycle. Returns whether a client is available.
    pub fn update_settings(&self, settings: Settings) -> bool {
        *self.settings.write().expect("settings lock") = settings;
        self.reinitialize_if_needed()
    }

    /// The current client, initializing lazily when possible.
    ///
    /// `None` means the capability is unavailable (no credential); callers
    /// fail their step closed rather than attempting a model call.
    pub fn client(&self) -> Option<Arc<dyn LlmClient>> {
        if !self.is_initialized() {
            self.reinitialize_if_needed();
        }
        self.inner.read().expect("client lock").client.clone()
    }
}
