//! Tool registry for managing available tools

use crate::llm::ToolDefinition;
use crate::tools::builtin::TrustyReportTool;
use crate::tools::{ReportLookup, Tool};
use std::sync::Arc;

/// Registry of the tools a run may offer to the model
///
/// Tools keep their registration order, which is the order their
/// definitions are advertised in.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        self.tools.retain(|existing| existing.name() != name);
        self.tools.push(tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name).cloned()
    }

    /// List all registered tool names
    pub fn list_tools(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Get tool definitions for LLM function calling
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| tool.descriptor().to_definition())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Registry with the built-in tools
pub fn default_registry(lookup: Arc<dyn ReportLookup>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(TrustyReportTool::new(lookup)));
    registry
}
