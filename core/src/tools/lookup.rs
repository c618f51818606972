//! Package report lookup against the Trusty API

use crate::config::LookupConfig;
use crate::error::LookupError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Capability to fetch the raw report for one package
#[async_trait]
pub trait ReportLookup: Send + Sync {
    /// Fetch the report body for `package_name` in `ecosystem`
    ///
    /// Exactly one outbound request per call; no retries.
    async fn lookup(&self, package_name: &str, ecosystem: &str) -> Result<String, LookupError>;
}

/// HTTP client for the Trusty report endpoint
pub struct TrustyClient {
    client: Client,
    report_url: String,
    timeout: Duration,
}

impl TrustyClient {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(LookupError::Transport)?;

        Ok(Self {
            client,
            report_url: format!("{}/v1/report", config.base_url.trim_end_matches('/')),
            timeout: config.timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout {
                after: self.timeout,
            }
        } else {
            LookupError::Transport(err)
        }
    }
}

#[async_trait]
impl ReportLookup for TrustyClient {
    async fn lookup(&self, package_name: &str, ecosystem: &str) -> Result<String, LookupError> {
        debug!(package_name, ecosystem, url = %self.report_url, "Fetching package report");

        let response = self
            .client
            .get(&self.report_url)
            .query(&[("package_name", package_name), ("package_type", ecosystem)])
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }
}
