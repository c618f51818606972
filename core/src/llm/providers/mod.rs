//! Chat backend implementations

pub mod ollama;
pub mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::config::{BackendConfig, Protocol};
use crate::error::Result;
use crate::llm::LlmClient;
use std::sync::Arc;

/// Create the chat backend selected by the configured protocol
pub fn create_client(config: &BackendConfig) -> Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match config.protocol {
        Protocol::Ollama => Arc::new(OllamaClient::new(config)),
        Protocol::OpenAICompat => Arc::new(OpenAiClient::new(config)?),
    };
    Ok(client)
}
