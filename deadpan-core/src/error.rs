//! Error types for the deadpan core library.
//!
//! Runtime operations on the trackers never fail. Errors only come from
//! loading configuration or localization tables.

use thiserror::Error;

/// Top-level error type for deadpan core operations.
#[derive(Error, Debug)]
pub enum DeadpanError {
    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A localization table was not valid JSON or had an unsupported shape.
    #[error("Localization table error at '{key}': {reason}")]
    Localization {
        /// Dot-separated key where the problem was found (empty for the root).
        key: String,
        /// What was wrong.
        reason: String,
    },

    /// JSON decoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, DeadpanError>;
