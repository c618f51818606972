//! Minimal configuration module for trusty core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{
    BackendConfig, LookupConfig, ModelParams, Protocol, ResolvedConfig, DEFAULT_LOOKUP_TIMEOUT,
    DEFAULT_TURN_TIMEOUT,
};
