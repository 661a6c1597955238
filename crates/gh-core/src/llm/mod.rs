//! LLM API client and types
//!
//! Supports both the Gemini API and OpenAI-compatible APIs. Each request
//! is a fresh single-turn exchange that yields at most one function call.

mod client;
mod types;

pub use client::LlmClient;
pub use types::*;
