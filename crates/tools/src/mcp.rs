//! MCP (Model Context Protocol) tool types
//!
//! Tools describe themselves with a JSON Schema input definition and return
//! content blocks, following the MCP `tools/call` result shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use sonocare_config::constants::timeouts;
use sonocare_core::llm_types::ToolDefinition;

/// Tool trait
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as exposed to the model
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Input schema
    fn schema(&self) -> ToolSchema;

    /// Execute the tool
    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError>;

    /// Validate input before execution
    ///
    /// Checks that the input is an object carrying every required property.
    fn validate(&self, input: &Value) -> Result<(), ToolError> {
        let schema = self.schema();
        if schema.input_schema.required.is_empty() {
            return Ok(());
        }

        let object = input
            .as_object()
            .ok_or_else(|| ToolError::invalid_params("Arguments must be a JSON object"))?;

        for field in &schema.input_schema.required {
            if !object.contains_key(field) {
                return Err(ToolError::invalid_params(format!(
                    "Missing required parameter: {}",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Execution timeout in seconds
    fn timeout_secs(&self) -> u64 {
        timeouts::TOOL_DEFAULT_SECS
    }
}

/// Tool schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

impl ToolSchema {
    /// Convert to the definition offered to the chat model
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name.clone(),
            self.description.clone(),
            serde_json::to_value(&self.input_schema)
                .unwrap_or_else(|_| serde_json::json!({"type": "object"})),
        )
    }
}

/// JSON Schema of a tool's input object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl InputSchema {
    /// Empty object schema
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Add a property
    pub fn property(mut self, name: impl Into<String>, schema: PropertySchema, required: bool) -> Self {
        let name = name.into();
        if required {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }
}

/// Schema of one input property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub prop_type: String,
    pub description: String,
}

impl PropertySchema {
    pub fn string(description: impl Into<String>) -> Self {
        Self {
            prop_type: "string".to_string(),
            description: description.into(),
        }
    }
}

/// Content block in a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// Tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolOutput {
    /// Plain text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Error result the model should see
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(message)
        }
    }

    /// Concatenated text content
    pub fn as_text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// JSON-RPC style error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    MethodNotFound,
    InvalidParams,
    InternalError,
    Timeout,
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::Timeout => -32000,
        }
    }
}

/// Tool error
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ToolError {
    pub code: ErrorCode,
    pub message: String,
}

impl ToolError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MethodNotFound, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn timeout(tool: &str, secs: u64) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Tool '{}' timed out after {}s", tool, secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the query"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name().to_string(),
                description: self.description().to_string(),
                input_schema: InputSchema::object().property(
                    "query",
                    PropertySchema::string("Text to echo"),
                    true,
                ),
            }
        }

        async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
            let query = input.get("query").and_then(|v| v.as_str()).unwrap_or_default();
            Ok(ToolOutput::text(query))
        }
    }

    #[test]
    fn test_schema_serialization() {
        let schema = EchoTool.schema();
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["inputSchema"]["type"], "object");
        assert_eq!(value["inputSchema"]["properties"]["query"]["type"], "string");
        assert_eq!(value["inputSchema"]["required"], json!(["query"]));
    }

    #[test]
    fn test_to_definition() {
        let def = EchoTool.schema().to_definition();
        assert_eq!(def.name, "echo");
        assert_eq!(def.parameters["properties"]["query"]["description"], "Text to echo");
    }

    #[test]
    fn test_validate_required() {
        assert!(EchoTool.validate(&json!({"query": "x"})).is_ok());
        let err = EchoTool.validate(&json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(EchoTool.validate(&json!("x")).is_err());
    }

    #[test]
    fn test_output_text() {
        let output = ToolOutput::text("hello");
        assert_eq!(output.as_text(), "hello");
        assert!(!output.is_error);
        assert!(ToolOutput::error("bad").is_error);
    }

    #[test]
    fn test_output_content_block_shape() {
        let value = serde_json::to_value(ToolOutput::text("hi")).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "hi");
        assert_eq!(value["isError"], false);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ToolError::not_found("x").code.code(), -32601);
        let err = ToolError::timeout("search_info_tool", 10);
        assert_eq!(err.to_string(), "Tool 'search_info_tool' timed out after 10s");
    }
}
