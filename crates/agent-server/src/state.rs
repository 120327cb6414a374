//! Application State

use std::sync::Arc;

use agent_core::{
    Agent, LlmProvider, SessionStore, ToolRegistry,
    provider::GenerationOptions,
    reasoning::AgentConfig,
};
use wealth_advisor::{BackendStatus, WEALTH_ADVISOR_PROMPT};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (Ollama)
    pub provider: Arc<dyn LlmProvider>,

    /// The three advisor tools, configured or not
    pub tools: Arc<ToolRegistry>,

    /// One conversation per session id
    pub sessions: Arc<dyn SessionStore>,

    /// Which tools have a live backend
    pub backends: BackendStatus,

    /// Model used when a request does not name one
    pub default_model: String,
}

impl AppState {
    /// Wealth advisor agent for one turn
    pub fn agent(&self, model: &str) -> Agent {
        let config = AgentConfig {
            system_prompt: WEALTH_ADVISOR_PROMPT.into(),
            generation: GenerationOptions::with_model(model),
            ..AgentConfig::default()
        };

        Agent::new(self.provider.clone(), self.tools.clone(), config)
    }
}
