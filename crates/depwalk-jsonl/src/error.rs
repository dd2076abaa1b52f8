//! Error types for depwalk-jsonl operations.

use std::io;
use thiserror::Error;

/// The error type for depwalk-jsonl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A line was not valid UTF-8 or did not decode as a record.
    ///
    /// Only the strict readers return this; the resilient ones turn it into
    /// a [`Warning`](crate::Warning).
    #[error("Invalid JSONL format at line {line_number}: {message}")]
    InvalidFormat {
        /// The 1-based line number of the offending record.
        line_number: usize,
        /// What went wrong.
        message: String,
    },
}

/// A specialized Result type for depwalk-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
