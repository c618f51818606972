//! Turn orchestration for the recommendation flow

pub mod config;
pub mod orchestrator;
pub mod prompt;
pub mod timeout;

pub use config::AgentConfig;
pub use orchestrator::{RunOutcome, TurnOrchestrator, TurnState};
pub use prompt::{build_user_prompt, INSTRUCTION_PREFIX, SUMMARY_INSTRUCTION};
pub use timeout::{with_deadline, Turn};
