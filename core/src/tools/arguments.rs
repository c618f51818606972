//! Typed tool arguments

use serde_json::Value;
use std::collections::BTreeMap;

/// The closed set of scalar values a tool argument may hold
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl ArgumentValue {
    /// Convert a JSON value, returning the JSON type name on rejection
    pub fn from_json(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::String(s) => Ok(ArgumentValue::String(s.clone())),
            Value::Bool(b) => Ok(ArgumentValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(ArgumentValue::Number).ok_or("number"),
            other => Err(json_type_name(other)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgumentValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgumentValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ArgumentValue::String(_) => "string",
            ArgumentValue::Number(_) => "number",
            ArgumentValue::Bool(_) => "boolean",
        }
    }
}

/// Arguments that passed descriptor validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    values: BTreeMap<String, ArgumentValue>,
}

impl ToolArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, value: ArgumentValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgumentValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
