//! CLI configuration loader for trusty
//!
//! Sources are layered, lowest priority first:
//! 1. Built-in defaults
//! 2. One config file: `$TRUSTY_CONFIG`, else `./config.{yaml,yml,toml,json}`,
//!    else `$XDG_CONFIG_HOME/trusty/config.*`
//! 3. `TRUSTY_` environment variables with `__` between sections,
//!    e.g. `TRUSTY_BACKEND__MODEL=llama3.1`

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use trusty_core::config::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_TURN_TIMEOUT};
use trusty_core::{BackendConfig, LookupConfig, ModelParams, Protocol, ResolvedConfig};

const ENV_PREFIX: &str = "TRUSTY";
const CONFIG_PATH_VAR: &str = "TRUSTY_CONFIG";
const CONFIG_EXTENSIONS: [&str; 4] = ["yaml", "yml", "toml", "json"];

/// Merged configuration before resolution
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub backend: RawBackend,
    /// Older `ollama.host` / `ollama.model` layout, used when `backend` leaves them unset
    #[serde(default)]
    pub ollama: Option<RawOllama>,
    pub lookup: RawLookup,
    pub timeouts: RawTimeouts,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBackend {
    pub protocol: String,
    /// Uses the protocol default when unset
    pub host: Option<String>,
    pub model: Option<String>,
    /// API key (can be "env:VAR_NAME" for environment variable)
    pub api_key: Option<String>,
    #[serde(default)]
    pub params: ModelParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOllama {
    pub host: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLookup {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTimeouts {
    pub turn_secs: u64,
}

/// CLI configuration loader
#[derive(Debug, Clone, Default)]
pub struct CliConfigLoader {
    /// Explicit config file, takes precedence over `TRUSTY_CONFIG`
    config_path: Option<PathBuf>,
    /// Directories searched for `config.*`; cwd and the XDG dir when unset
    search_dirs: Option<Vec<PathBuf>>,
    /// Variables read instead of the process environment
    environment: Option<HashMap<String, String>>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file override
    #[cfg(test)]
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    #[cfg(test)]
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = Some(dirs);
        self
    }

    #[cfg(test)]
    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Load and resolve configuration
    pub fn load(&self) -> Result<ResolvedConfig> {
        let mut builder = Config::builder()
            .set_default("backend.protocol", Protocol::Ollama.as_str())?
            .set_default("lookup.base_url", LookupConfig::default().base_url)?
            .set_default("lookup.timeout_secs", DEFAULT_LOOKUP_TIMEOUT.as_secs() as i64)?
            .set_default("timeouts.turn_secs", DEFAULT_TURN_TIMEOUT.as_secs() as i64)?;

        if let Some(path) = self.config_file()? {
            debug!("Loading config file {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        // Values stay strings; numeric fields are converted on deserialize.
        let mut environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__");
        if let Some(vars) = &self.environment {
            environment = environment.source(Some(vars.clone()));
        }
        builder = builder.add_source(environment);

        let raw: RawConfig = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        self.resolve(raw)
    }

    /// The single config file to read, if any
    fn config_file(&self) -> Result<Option<PathBuf>> {
        let explicit = self
            .config_path
            .clone()
            .or_else(|| self.env_var(CONFIG_PATH_VAR).map(PathBuf::from));
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(anyhow!("Config file does not exist: {}", path.display()));
            }
            return Ok(Some(path));
        }

        for dir in self.search_dirs() {
            for extension in CONFIG_EXTENSIONS {
                let candidate = dir.join(format!("config.{}", extension));
                if candidate.is_file() {
                    return Ok(Some(candidate));
                }
            }
        }

        Ok(None)
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        if let Some(dirs) = &self.search_dirs {
            return dirs.clone();
        }

        let mut dirs = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            dirs.push(cwd);
        }
        if let Some(config_dir) = self.xdg_config_dir() {
            dirs.push(config_dir.join("trusty"));
        }
        dirs
    }

    /// Get XDG config directory
    fn xdg_config_dir(&self) -> Option<PathBuf> {
        self.env_var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
    }

    fn env_var(&self, name: &str) -> Option<String> {
        match &self.environment {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
        .filter(|value| !value.is_empty())
    }

    /// Resolve raw config to ResolvedConfig
    fn resolve(&self, raw: RawConfig) -> Result<ResolvedConfig> {
        let protocol: Protocol = raw
            .backend
            .protocol
            .parse()
            .map_err(trusty_core::Error::from)?;

        let legacy = match protocol {
            Protocol::Ollama => raw.ollama.unwrap_or_default(),
            Protocol::OpenAICompat => RawOllama::default(),
        };

        let host = raw
            .backend
            .host
            .or(legacy.host)
            .unwrap_or_else(|| protocol.default_host().to_string());
        let model = raw.backend.model.or(legacy.model).unwrap_or_default();

        // Resolve API key (handle env: prefix)
        let api_key = match raw.backend.api_key {
            Some(key) => match key.strip_prefix("env:") {
                Some(var_name) => Some(self.env_var(var_name).ok_or_else(|| {
                    anyhow!("Environment variable not found: {}", var_name)
                })?),
                None => Some(key),
            },
            None if protocol.requires_api_key() => self.env_var("OPENAI_API_KEY"),
            None => None,
        };

        let resolved = ResolvedConfig {
            backend: BackendConfig {
                protocol,
                host,
                model,
                api_key,
                params: raw.backend.params,
            },
            lookup: LookupConfig {
                base_url: raw.lookup.base_url,
                timeout: Duration::from_secs(raw.lookup.timeout_secs),
            },
            turn_timeout: Duration::from_secs(raw.timeouts.turn_secs),
        };

        resolved
            .validate()
            .map_err(trusty_core::Error::from)
            .context("Configuration validation failed")?;

        Ok(resolved)
    }
}
