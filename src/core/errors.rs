//! Error types for the segment-extraction and alignment pipeline.
//!
//! The algorithms in this crate recover from malformed input locally: a
//! caption that matches nothing resolves to an empty string, a table that
//! fails to parse is rejected by the quality gate, and tables without
//! shared structure align in their original order. None of those are
//! errors. The only hard failures are contract violations, such as an
//! externally supplied pattern that does not compile or matrix columns of
//! unequal length.

use thiserror::Error;

/// Result alias used across the crate.
pub type SegResult<T> = Result<T, SegmentError>;

/// Errors raised by the segment-extraction pipeline.
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Error indicating an invalid externally supplied configuration.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error indicating a caller violated an input contract.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },
}

impl SegmentError {
    /// Creates a SegmentError for configuration errors.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a SegmentError for configuration errors with context.
    pub fn config_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::Config {
            message: format!(
                "Configuration error in field '{}' with value '{}': {}",
                field, value, reason
            ),
        }
    }

    /// Creates a SegmentError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
