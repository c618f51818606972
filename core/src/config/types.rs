//! Resolved configuration types
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time bound for a single model turn
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time bound for a single report lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Supported chat backend protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// Ollama native chat API
    #[serde(rename = "ollama")]
    Ollama,
    /// OpenAI-compatible API (OpenAI, many proxies, local servers)
    #[serde(rename = "openai", alias = "openai_compat")]
    OpenAICompat,
}

impl Protocol {
    /// Get the protocol name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Ollama => "ollama",
            Protocol::OpenAICompat => "openai",
        }
    }

    /// Get the default host for this protocol
    pub fn default_host(&self) -> &'static str {
        match self {
            Protocol::Ollama => "http://localhost:11434",
            Protocol::OpenAICompat => "https://api.openai.com/v1",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Protocol::OpenAICompat)
    }
}

impl std::str::FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ollama" => Ok(Protocol::Ollama),
            "openai" | "openai_compat" => Ok(Protocol::OpenAICompat),
            other => Err(ConfigError::InvalidValue {
                field: "backend.protocol".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Model parameters for chat requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
}

/// Chat backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub protocol: Protocol,
    /// Base URL of the backend
    pub host: String,
    /// Model name/identifier
    pub model: String,
    /// API key, for protocols that need one
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub params: ModelParams,
}

/// Report lookup endpoint settings
#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    /// Base URL; `/v1/report` is appended
    pub base_url: String,
    /// Request timeout for one lookup
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.trustypkg.dev".to_string(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// A fully resolved configuration ready for use by core
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub backend: BackendConfig,
    pub lookup: LookupConfig,
    /// Time bound applied independently to each model turn
    pub turn_timeout: Duration,
}

impl ResolvedConfig {
    /// Create a config with default lookup settings and turn timeout
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            backend,
            lookup: LookupConfig::default(),
            turn_timeout: DEFAULT_TURN_TIMEOUT,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "backend.model".to_string(),
            });
        }

        validate_url("backend.host", &self.backend.host)?;
        validate_url("lookup.base_url", &self.lookup.base_url)?;

        if self.backend.protocol.requires_api_key()
            && self.backend.api_key.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingField {
                field: "backend.api_key".to_string(),
            });
        }

        if self.turn_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "timeouts.turn_secs".to_string(),
                value: "0".to_string(),
            });
        }

        if self.lookup.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "lookup.timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        if let Some(temp) = self.backend.params.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::InvalidValue {
                    field: "backend.params.temperature".to_string(),
                    value: temp.to_string(),
                });
            }
        }

        if let Some(top_p) = self.backend.params.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ConfigError::InvalidValue {
                    field: "backend.params.top_p".to_string(),
                    value: top_p.to_string(),
                });
            }
        }

        Ok(())
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
        });
    }
    // Bare host:port is accepted for the chat backend and normalised later.
    if field != "backend.host" && !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: url.to_string(),
        });
    }
    Ok(())
}
