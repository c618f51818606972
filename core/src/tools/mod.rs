//! Tool system and built-in tools

pub mod arguments;
pub mod base;
pub mod builtin;
pub mod descriptor;
pub mod lookup;
pub mod registry;

pub use arguments::{ArgumentValue, ToolArguments};
pub use base::{Tool, ToolCall, ToolResult};
pub use descriptor::{ParameterKind, ParameterSpec, ToolDescriptor};
pub use lookup::{ReportLookup, TrustyClient};
pub use registry::{default_registry, ToolRegistry};
