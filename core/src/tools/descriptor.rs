//! Tool descriptors: the schema advertised to the model

use crate::error::ArgumentError;
use crate::llm::{FunctionDefinition, ToolDefinition};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

use super::arguments::{json_type_name, ArgumentValue, ToolArguments};

/// Declared type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    Number,
    Bool,
}

impl ParameterKind {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Number => "number",
            ParameterKind::Bool => "boolean",
        }
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(
            (self, value),
            (ParameterKind::String, ArgumentValue::String(_))
                | (ParameterKind::Number, ArgumentValue::Number(_))
                | (ParameterKind::Bool, ArgumentValue::Bool(_))
        )
    }
}

/// One declared parameter of a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required<S: Into<String>, D: Into<String>>(
        name: S,
        kind: ParameterKind,
        description: D,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional<S: Into<String>, D: Into<String>>(
        name: S,
        kind: ParameterKind,
        description: D,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// Static declaration of one callable tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new<S: Into<String>, D: Into<String>>(name: S, description: D) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn required_fields(&self) -> BTreeSet<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// JSON Schema object describing the parameters
    pub fn parameter_schema(&self) -> Value {
        let mut properties = Map::new();
        for parameter in &self.parameters {
            properties.insert(
                parameter.name.clone(),
                json!({
                    "type": parameter.kind.as_str(),
                    "description": parameter.description,
                }),
            );
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Wire shape handed to a chat backend
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: self.parameter_schema(),
            },
        }
    }

    /// Check raw arguments against the declared parameters
    ///
    /// Undeclared arguments are dropped; they never reach the tool.
    pub fn validate(&self, arguments: &Value) -> Result<ToolArguments, ArgumentError> {
        let object = arguments
            .as_object()
            .ok_or_else(|| ArgumentError::NotAnObject {
                tool: self.name.clone(),
                found: json_type_name(arguments),
            })?;

        let mut validated = ToolArguments::new();
        for parameter in &self.parameters {
            let Some(raw) = object.get(&parameter.name) else {
                if parameter.required {
                    return Err(ArgumentError::Missing {
                        tool: self.name.clone(),
                        field: parameter.name.clone(),
                    });
                }
                continue;
            };

            let wrong_type = |found: &'static str| ArgumentError::WrongType {
                tool: self.name.clone(),
                field: parameter.name.clone(),
                expected: parameter.kind.as_str(),
                found,
            };
            let value = ArgumentValue::from_json(raw).map_err(&wrong_type)?;
            if !parameter.kind.accepts(&value) {
                return Err(wrong_type(value.type_name()));
            }
            validated.insert(parameter.name.clone(), value);
        }

        Ok(validated)
    }
}
