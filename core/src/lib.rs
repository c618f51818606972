//! # trusty Core
//!
//! Core library for trusty - a dependency recommendation assistant.
//!
//! A free-text question is sent to a chat backend that may call the
//! `trustyReport` tool. The report is fetched, handed back to the model,
//! and the model's answer is condensed into one short paragraph.

// Core modules
pub mod agent;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod tools;

// Re-export commonly used types
pub use agent::{AgentConfig, RunOutcome, Turn, TurnOrchestrator, TurnState};
pub use config::{BackendConfig, LookupConfig, ModelParams, Protocol, ResolvedConfig};
pub use conversation::ConversationState;
pub use error::{Error, Result};

/// Current version of the trusty-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing on stderr, `info` unless `RUST_LOG` says otherwise
pub fn init_tracing() {
    use std::io::IsTerminal;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

