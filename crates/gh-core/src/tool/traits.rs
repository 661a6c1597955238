//! Tool trait definition
//!
//! Defines the core trait for implementing tools that can be
//! executed when the model requests them.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::Result;

/// Tool execution result
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Output string from tool execution
    pub output: String,
    /// Whether the execution resulted in an error
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
        }
    }
}

/// Tool trait for LLM function calls
///
/// `C` is the execution context handed to every call, e.g. an
/// authenticated API client for the requesting user.
#[async_trait]
pub trait Tool<C>: Send + Sync {
    /// Get the tool name (used as the function name)
    fn name(&self) -> &str;

    /// Get the tool description (shown to the model when selecting tools)
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's input parameters
    fn input_schema(&self) -> JsonValue;

    /// Execute the tool with the given input
    ///
    /// Upstream failures the user should read about are returned as
    /// `Ok(ToolResult::error(..))`; `Err` is reserved for malformed input.
    async fn execute(&self, ctx: &C, input: JsonValue) -> Result<ToolResult>;
}
