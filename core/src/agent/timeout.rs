//! Per-turn deadline guard

use crate::error::{Error, Result};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// The three model turns of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// First turn, tools offered
    ToolSelection,
    /// Second turn, answers over the tool result
    ToolAnswer,
    /// Third turn, fresh context asking for a summary
    Summary,
}

impl Turn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Turn::ToolSelection => "tool selection",
            Turn::ToolAnswer => "tool answer",
            Turn::Summary => "summary",
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run `future` for at most `limit`.
///
/// On expiry the future is dropped, which cancels any in-flight request it
/// owns, and `Error::Timeout` is returned. Each call starts its own clock.
pub async fn with_deadline<T, F>(turn: Turn, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!("{} turn exceeded {:?}", turn, limit);
            Err(Error::Timeout { turn, limit })
        }
    }
}
