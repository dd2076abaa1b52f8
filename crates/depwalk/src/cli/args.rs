//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;
use std::path::PathBuf;

use super::validators::{validate_concurrency, validate_key, validate_library_name};

/// Arguments for the `traverse` command
#[derive(Parser, Debug, Clone)]
#[command(allow_negative_numbers = true)]
pub struct TraverseArgs {
    /// Name of the root library (exact, case-sensitive)
    #[arg(value_parser = validate_library_name)]
    pub name: String,

    /// Number of dependency levels to follow (0 = root only)
    pub depth: i64,

    /// Maximum point reads in flight per level
    #[arg(short, long, value_parser = validate_concurrency)]
    pub concurrency: Option<usize>,

    /// Give up after this many seconds and print what was collected
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,

    /// File of ids known to exist (one per line); others are not looked up
    #[arg(long)]
    pub known_ids: Option<PathBuf>,

    /// Skip lookups for ids absent from the loaded data file
    #[arg(long)]
    pub filter_by_store_ids: bool,
}

/// Arguments for the `point-read` command
#[derive(Parser, Debug, Clone)]
pub struct PointReadArgs {
    /// Document id
    #[arg(value_parser = validate_key)]
    pub id: String,

    /// Partition key
    #[arg(value_parser = validate_key)]
    pub partition_key: String,
}

/// Arguments for the `find` command
#[derive(Parser, Debug, Clone)]
pub struct FindArgs {
    /// Library name (exact, case-sensitive)
    #[arg(value_parser = validate_library_name)]
    pub name: String,
}
