use agent_llm::{LLMProvider, OpenAIProvider};
use std::sync::Arc;

use crate::server::ServerConfig;

/// Shared, immutable per-process state. Requests carry everything else.
pub struct AppState {
    pub llm: Arc<dyn LLMProvider>,
}

impl AppState {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        log::info!(
            "Creating LLM provider with base URL: {} and model: {}",
            config.llm_base_url,
            config.model
        );

        let provider = OpenAIProvider::new(config.api_key.clone())
            .with_base_url(config.llm_base_url.clone())
            .with_model(config.model.clone());

        Self::new(Arc::new(provider))
    }
}
