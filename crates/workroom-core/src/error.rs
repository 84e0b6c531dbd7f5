//! Error types for workroom-core
//!
//! Failures internal to a single agent turn or skill call never surface
//! here; they are absorbed at the agent layer and converted into placeholder
//! text. This enum covers the failures that must reach the caller: storage
//! problems and contract violations.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Persistence failure (must never be silently swallowed)
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem error during persistence
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// (De)serialization of persisted records failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// LLM provider error that escaped the agent layer
    #[error("llm error: {0}")]
    Llm(#[from] workroom_llm::Error),

    /// An agent definition violated a contract (missing field, duplicate key)
    #[error("invalid agent: {0}")]
    InvalidAgent(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
