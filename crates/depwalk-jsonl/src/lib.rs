//! Resilient JSON Lines reading for depwalk.
//!
//! Dependency corpora are exported one document per line. This crate reads
//! them line by line, tracking line numbers. [`read_jsonl_resilient`] reports
//! malformed records as [`Warning`]s and keeps going; [`read_jsonl`] stops at
//! the first one.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod reader;
pub mod warning;

pub use error::{Error, Result};
pub use reader::{read_jsonl, read_jsonl_resilient, JsonlReader};
pub use warning::Warning;
