//! gh-core: GitHub Agent Core Library
//!
//! Configuration, LLM function-calling client and the tool system
//! shared by the server and the terminal client.

pub mod config;
pub mod error;
pub mod llm;
pub mod tool;

pub use config::{ClientConfig, Config, GitHubConfig, LlmConfig, LlmProvider, ServerConfig};
pub use error::{Error, Result};
pub use llm::{FunctionCall, LlmClient, ToolDefinition};
pub use tool::{SchemaBuilder, Tool, ToolArgs, ToolManager, ToolResult};
