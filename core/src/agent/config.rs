//! Agent configuration structures

use crate::config::{ResolvedConfig, DEFAULT_TURN_TIMEOUT};
use crate::llm::ChatOptions;
use std::time::Duration;

/// Configuration for a turn orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Bound applied to each model turn separately
    pub turn_timeout: Duration,

    /// Sampling options passed on every turn
    pub chat_options: ChatOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            chat_options: ChatOptions::default(),
        }
    }
}

impl AgentConfig {
    pub fn with_turn_timeout(mut self, turn_timeout: Duration) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    /// Options for a backend request, `None` when nothing is set
    pub(crate) fn options(&self) -> Option<ChatOptions> {
        if self.chat_options.is_empty() {
            None
        } else {
            Some(self.chat_options.clone())
        }
    }
}

impl From<&ResolvedConfig> for AgentConfig {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            turn_timeout: config.turn_timeout,
            chat_options: ChatOptions::from(&config.backend.params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, ModelParams, Protocol};

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.turn_timeout, Duration::from_secs(30));
        assert!(config.options().is_none());
    }

    #[test]
    fn test_from_resolved_config() {
        let mut resolved = ResolvedConfig::new(BackendConfig {
            protocol: Protocol::Ollama,
            host: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            api_key: None,
            params: ModelParams {
                temperature: Some(0.2),
                ..Default::default()
            },
        });
        resolved.turn_timeout = Duration::from_secs(5);

        let config = AgentConfig::from(&resolved);
        assert_eq!(config.turn_timeout, Duration::from_secs(5));
        assert_eq!(config.options().and_then(|o| o.temperature), Some(0.2));
    }
}
