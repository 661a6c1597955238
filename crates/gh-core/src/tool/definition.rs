//! Tool definition helpers
//!
//! Re-exports ToolDefinition from llm module and provides helpers for
//! building schemas and reading arguments back out of a function call.

use serde_json::{json, Value as JsonValue};

use crate::{Error, Result};

/// Tool definition for function calling
///
/// Re-exported from llm module for convenience.
pub use crate::llm::ToolDefinition;

/// Helper functions for creating tool schemas
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Create an object schema with descriptions for properties
    ///
    /// # Arguments
    /// * `properties` - A list of tuples (name, type, description, required)
    ///
    /// # Example
    /// ```ignore
    /// let schema = SchemaBuilder::object(&[
    ///     ("repo_full_name", "string", "Full name of the repository.", true),
    ///     ("path", "string", "Folder path. Leave empty for root.", false),
    /// ]);
    /// ```
    pub fn object(properties: &[(&str, &str, &str, bool)]) -> JsonValue {
        let props: serde_json::Map<String, JsonValue> = properties
            .iter()
            .map(|(name, type_str, desc, _)| {
                (
                    name.to_string(),
                    json!({"type": type_str, "description": desc}),
                )
            })
            .collect();

        let required: Vec<&str> = properties
            .iter()
            .filter(|(_, _, _, required)| *required)
            .map(|(name, _, _, _)| *name)
            .collect();

        json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }

    /// Schema for a tool without parameters
    pub fn empty() -> JsonValue {
        Self::object(&[])
    }
}

/// Typed accessors for function-call arguments
///
/// Models sometimes send numbers as strings and booleans as `"true"`, so
/// the accessors accept both spellings.
pub trait ToolArgs {
    /// A required, non-empty string argument
    fn required_str(&self, key: &str) -> Result<&str>;

    /// An optional string argument; empty strings count as absent
    fn optional_str(&self, key: &str) -> Option<&str>;

    /// An optional boolean argument
    fn optional_bool(&self, key: &str) -> Option<bool>;

    /// A required unsigned integer argument
    fn required_u64(&self, key: &str) -> Result<u64>;
}

impl ToolArgs for JsonValue {
    fn required_str(&self, key: &str) -> Result<&str> {
        self.optional_str(key)
            .ok_or_else(|| Error::ToolExecution(format!("Missing '{}' parameter", key)))
    }

    fn optional_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn optional_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            JsonValue::Bool(b) => Some(*b),
            JsonValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn required_u64(&self, key: &str) -> Result<u64> {
        let value = self
            .get(key)
            .ok_or_else(|| Error::ToolExecution(format!("Missing '{}' parameter", key)))?;

        let parsed = match value {
            JsonValue::Number(n) => n.as_u64().or_else(|| {
                // Gemini encodes integers as floats ("7.0")
                n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)
            }),
            JsonValue::String(s) => s.trim().trim_start_matches('#').parse().ok(),
            _ => None,
        };

        parsed.ok_or_else(|| {
            Error::ToolExecution(format!("Parameter '{}' must be a positive integer", key))
        })
    }
}
