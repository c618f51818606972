//! Single query execution command

use crate::config::CliConfigLoader;
use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use trusty_core::TurnOrchestrator;

/// Answer one question and return the text to print
pub async fn run_command(words: Vec<String>, config_loader: CliConfigLoader) -> Result<String> {
    let query = words.join(" ");
    if query.trim().is_empty() {
        bail!("Query must not be empty");
    }

    // Load configuration
    let config = config_loader.load()?;
    info!("Using protocol: {}", config.backend.protocol.as_str());
    info!("Using model: {}", config.backend.model);

    let orchestrator =
        TurnOrchestrator::from_config(&config).context("Failed to set up clients")?;

    debug!("Query: {}", query);
    let outcome = orchestrator
        .run(&query)
        .await
        .context("Recommendation run failed")?;

    info!("Run finished in state {}", outcome.state());
    Ok(outcome.into_answer())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let err = run_command(vec!["  ".to_string(), "\t".to_string()], CliConfigLoader::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
