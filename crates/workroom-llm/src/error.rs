//! Error types for workroom-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// API error from the backing provider
    #[error("api error: {0}")]
    Api(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit,

    /// The completion could not be parsed into the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Whether a retry could plausibly succeed.
    ///
    /// Rate limits, network failures, and timeouts are transient; a malformed
    /// response from the same prompt usually is not, but a second attempt is
    /// still cheap enough that everything is treated as retryable here.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, Error::InvalidResponse(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
