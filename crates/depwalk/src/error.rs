//! Error types for depwalk operations.
//!
//! Errors are layered the same way the system is:
//!
//! - [`StoreError`]: failures reported by a [`DocumentStore`](crate::store::DocumentStore)
//!   (timeouts, throttling, transport, authorization). "Not found" is never an
//!   error; stores return `Ok(None)` for it.
//! - [`ConfigError`]: invalid arguments or configuration, surfaced before any
//!   store I/O happens.
//! - [`Error`]: the top-level error wrapping both plus I/O and JSON failures.

use crate::domain::NodeId;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// The error type for depwalk operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration or argument error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Document store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A document failed validation.
    #[error("Invalid document {id}: {reason}")]
    InvalidDocument {
        /// Id of the offending document (may be empty).
        id: NodeId,
        /// Why it was rejected.
        reason: String,
    },

    /// A data file could not be interpreted.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<depwalk_jsonl::Error> for Error {
    fn from(err: depwalk_jsonl::Error) -> Self {
        match err {
            depwalk_jsonl::Error::Io(e) => Self::Io(e),
            depwalk_jsonl::Error::InvalidFormat {
                line_number,
                message,
            } => Self::InvalidFormat(format!("line {line_number}: {message}")),
        }
    }
}

/// Configuration and argument errors.
///
/// These are the only errors [`DependencyGraph::traverse`](crate::traversal::DependencyGraph::traverse)
/// returns; they are raised before any remote call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Traversal depth was negative.
    #[error("depth must be zero or greater, got {0}")]
    NegativeDepth(i64),

    /// Root library name was empty.
    #[error("root library name cannot be empty")]
    EmptyRootName,

    /// Concurrency limit was zero.
    #[error("max concurrent lookups must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    /// The YAML configuration could not be parsed or written.
    #[error("YAML error: {0}")]
    Yaml(String),

    /// An environment variable held a value that could not be used.
    #[error("invalid value for {name}: '{value}'")]
    InvalidEnvVar {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// No data file was configured.
    #[error("no data file configured (use --data-file, DEPWALK_DATA_FILE or the config file)")]
    MissingDataFile,
}

/// Failures reported by a document store.
///
/// The traversal engine treats every variant as transient: the run stops at
/// the current level and returns what it has collected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected the request because of rate limits.
    #[error("request throttled: {0}")]
    Throttled(String),

    /// Network or protocol failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Credentials were missing or rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// A specialized Result type for depwalk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_error() {
        let err: Error = ConfigError::NegativeDepth(-1).into();
        assert!(matches!(err, Error::Config(ConfigError::NegativeDepth(-1))));
        assert_eq!(
            err.to_string(),
            "Configuration error: depth must be zero or greater, got -1"
        );
    }

    #[test]
    fn jsonl_format_error_keeps_line_number() {
        let err: Error = depwalk_jsonl::Error::InvalidFormat {
            line_number: 4,
            message: "expected value".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid data format: line 4: expected value");
    }

    #[test]
    fn store_error_messages_are_descriptive() {
        let err = StoreError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "request timed out after 250ms");

        let err: Error = StoreError::Throttled("429".to_string()).into();
        assert_eq!(err.to_string(), "Store error: request throttled: 429");
    }
}
