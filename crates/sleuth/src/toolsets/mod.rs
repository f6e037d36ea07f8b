use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod opensearch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Success,
    Error,
}

/// The uniform result shape every tool wrapper normalizes into.
///
/// Tool failures are data, not `Err`: callers always get a result they
/// can hand back to the model verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredToolResult {
    pub status: ToolResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub params: Value,
}

impl StructuredToolResult {
    pub fn success<S: Into<String>>(data: S, params: Value) -> Self {
        Self {
            status: ToolResultStatus::Success,
            return_code: None,
            data: Some(data.into()),
            error: None,
            params,
        }
    }

    pub fn error<S: Into<String>>(error: S, params: Value) -> Self {
        Self {
            status: ToolResultStatus::Error,
            return_code: None,
            data: None,
            error: Some(error.into()),
            params,
        }
    }

    pub fn with_return_code(mut self, return_code: u16) -> Self {
        self.return_code = Some(return_code);
        self
    }
}

/// Declared parameter of a tool, surfaced to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub description: String,
    #[serde(rename = "type")]
    pub parameter_type: String,
    pub required: bool,
}

impl ToolParameter {
    pub fn string<S: Into<String>>(description: S, required: bool) -> Self {
        Self {
            description: description.into(),
            parameter_type: "string".to_string(),
            required,
        }
    }
}

/// Metadata describing a tool for registration with the model backend.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: HashMap<String, ToolParameter>,
}

/// Fetch a required string parameter from a tool invocation payload.
pub fn get_string_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("Missing required parameter: {}", key))
}
