//! Base tool traits and structures

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::descriptor::ToolDescriptor;

/// Trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static declaration of the tool, as advertised to the model
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with the raw arguments the model supplied
    ///
    /// Implementations validate `arguments` against their descriptor and
    /// fail with an argument error before doing any work.
    async fn invoke(&self, arguments: &serde_json::Value) -> Result<ToolResult>;

    /// Get the name of the tool
    fn name(&self) -> String {
        self.descriptor().name
    }
}

/// A call to a tool, as produced by the chat backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Backend-assigned identifier, when the backend provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of the tool to call
    pub function_name: String,

    /// Unvalidated arguments
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new<S: Into<String>>(function_name: S, arguments: serde_json::Value) -> Self {
        Self {
            id: None,
            function_name: function_name.into(),
            arguments,
        }
    }

    /// Set the backend-assigned id
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Result of a tool execution, ready to be inserted into the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
}

impl ToolResult {
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
        }
    }
}
