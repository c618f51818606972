//! Error types and handling for Trusty Core

use crate::agent::Turn;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for Trusty operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Trusty Core
///
/// Every variant is fatal to a run: the orchestrator never recovers locally.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool arguments were missing or had the wrong type
    #[error("Tool argument error: {0}")]
    Argument(#[from] ArgumentError),

    /// The external report lookup failed
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// The model asked for a tool that is not registered
    #[error("Unexpected tool call: {name}")]
    UnexpectedTool { name: String },

    /// A model turn exceeded its time bound
    #[error("Timed out after {}s waiting for the {turn} turn", .limit.as_secs_f64())]
    Timeout { turn: Turn, limit: Duration },

    /// The chat backend failed for any other reason
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Name of the error kind, as used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Argument(_) => "ArgumentError",
            Error::Lookup(_) => "LookupError",
            Error::UnexpectedTool { .. } => "UnexpectedToolError",
            Error::Timeout { .. } => "TimeoutError",
            Error::Backend(_) => "BackendError",
            Error::Config(_) => "ConfigError",
        }
    }
}

/// Tool argument validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("arguments for '{tool}' must be a JSON object, got {found}")]
    NotAnObject { tool: String, found: &'static str },

    #[error("missing required argument '{field}' for '{tool}'")]
    Missing { tool: String, field: String },

    #[error("argument '{field}' for '{tool}' must be a {expected}, got {found}")]
    WrongType {
        tool: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Report lookup errors
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {}s", .after.as_secs_f64())]
    Timeout { after: Duration },

    #[error("report endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("report is not a JSON object: {message}")]
    Malformed { message: String },
}

/// Chat backend errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

/// Configuration-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}
