//! Package trustworthiness report tool

use crate::error::{LookupError, Result};
use crate::tools::{
    ParameterKind, ParameterSpec, ReportLookup, Tool, ToolDescriptor, ToolResult,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub const TRUSTY_REPORT_TOOL: &str = "trustyReport";

/// Tool that fetches a package report and hands it to the model as JSON
pub struct TrustyReportTool {
    lookup: Arc<dyn ReportLookup>,
}

impl TrustyReportTool {
    pub fn new(lookup: Arc<dyn ReportLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Tool for TrustyReportTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            TRUSTY_REPORT_TOOL,
            "Evaluate the trustworthiness of a package",
        )
        .with_parameter(ParameterSpec::required(
            "package_name",
            ParameterKind::String,
            "The name of the package",
        ))
        .with_parameter(ParameterSpec::required(
            "ecosystem",
            ParameterKind::String,
            "The ecosystem of the package",
        ))
    }

    async fn invoke(&self, arguments: &serde_json::Value) -> Result<ToolResult> {
        let args = self.descriptor().validate(arguments)?;
        // Both fields are required strings, so validation guarantees them.
        let package_name = args.get_str("package_name").unwrap_or_default();
        let ecosystem = args.get_str("ecosystem").unwrap_or_default();

        info!(package_name, ecosystem, "Requesting package report");
        let raw = self.lookup.lookup(package_name, ecosystem).await?;

        Ok(ToolResult::new(normalize_report(&raw)?))
    }
}

/// Re-serialise a report as indented JSON
///
/// The payload must be a JSON object.
pub fn normalize_report(raw: &str) -> std::result::Result<String, LookupError> {
    let report: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| LookupError::Malformed {
            message: e.to_string(),
        })?;

    serde_json::to_string_pretty(&report).map_err(|e| LookupError::Malformed {
        message: e.to_string(),
    })
}
