//! Workroom LLM - completion service abstraction
//!
//! This crate defines the narrow contract the Workroom orchestrator has with
//! any LLM backend: send an ordered list of role-tagged messages (optionally
//! with tool definitions) and get one completion back. No provider wire
//! protocol lives here; concrete providers implement [`LlmProvider`].
//!
//! - Message: role-tagged conversation turns
//! - Completion: request/response types, with and without tools
//! - Provider: the `LlmProvider` trait and a `MockProvider` for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod provider;

pub use completion::{
    CompletionRequest, CompletionResponse, ToolCall, ToolChoice, ToolCompletionRequest,
    ToolCompletionResponse, ToolDefinition,
};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use provider::{LlmProvider, MockProvider};
