//! LLM error types.

use thiserror::Error;

/// Errors that can occur during text generation.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed or returned a non-success status.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    /// Response body was not the JSON shape the provider promises.
    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    /// Request timed out.
    #[error("LLM request timed out after {0}ms")]
    Timeout(u64),

    /// No backend configured or the backend refused the connection.
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),

    /// Another request already holds the enrichment slot.
    #[error("LLM busy: another request is in flight")]
    Busy,

    /// The model answered with nothing usable after sanitizing.
    #[error("LLM returned an empty line")]
    EmptyResponse,

    /// Configuration error.
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(0)
        } else if err.is_connect() {
            LlmError::Unavailable(err.to_string())
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}
