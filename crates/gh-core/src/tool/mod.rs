//! Tool system for LLM function calls
//!
//! A tool is a named operation with a JSON schema. Its definition is
//! offered to the model as a function declaration and the chosen call is
//! executed against a caller-supplied context.

pub mod definition;
pub mod manager;
pub mod traits;

pub use definition::{SchemaBuilder, ToolArgs, ToolDefinition};
pub use manager::ToolManager;
pub use traits::{Tool, ToolResult};
