//! Error types for catalog-dl
//!
//! Only infrastructure failures surface as [`Error`]: configuration problems,
//! artifact and failure-log I/O, input loading, and HTTP client construction.
//! Per-identifier fetch failures are data, not errors — they are captured as
//! [`FailureRecord`](crate::types::FailureRecord)s and never abort a run.

use thiserror::Error;

/// Result type alias for catalog-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for catalog-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch.base_url")
        key: Option<String>,
    },

    /// I/O error (batch artifacts, failure log, output directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error outside the per-identifier classification path
    /// (HTTP client construction)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error (batch artifacts)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV error (identifier input, failure log)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Identifier input file is missing or malformed
    #[error("input error: {0}")]
    Input(String),
}
