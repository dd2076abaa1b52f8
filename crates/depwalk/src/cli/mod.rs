//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for depwalk using clap's derive API.
//!
//! # Commands
//!
//! - `traverse`: Collect the transitive dependencies of a library
//! - `point-read`: Read one document by id and partition key
//! - `find`: Look a document up by library name
//! - `count`: Count the documents in the store
//! - `env`: Show the environment variables depwalk reads
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: Configuration file (default `depwalk.yaml`)
//! - `--data-file`: Document file, overriding configuration and environment
//!
//! # Example
//!
//! ```bash
//! depwalk --data-file data/libraries.jsonl traverse flask 3
//! depwalk --json traverse requests 2 --concurrency 8 --timeout-secs 30
//! depwalk point-read click c
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::app::App;
use crate::config::{DEFAULT_CONFIG_FILE, DepwalkConfig};
use crate::output::OutputMode;

// Re-export argument structs
pub use args::{FindArgs, PointReadArgs, TraverseArgs};

// Re-export validators for external use
pub use validators::{validate_concurrency, validate_key, validate_library_name};

/// Depwalk - breadth-first dependency traversal over a document store
///
/// Rebuilds the transitive dependency set of a library from per-document
/// dependency lists, using only point reads and name lookups.
#[derive(Parser, Debug)]
#[command(name = "depwalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./depwalk.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Document file (.jsonl or .json), overriding configuration
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Collect the transitive dependencies of a library
    ///
    /// Resolves the library by name, then follows dependency references level
    /// by level up to DEPTH. Unknown dependencies are reported, not fatal.
    Traverse(TraverseArgs),

    /// Read one document by id and partition key
    PointRead(PointReadArgs),

    /// Look a document up by library name
    Find(FindArgs),

    /// Count the documents in the store
    Count,

    /// Show the environment variables depwalk reads
    Env,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Resolve configuration: file, then environment, then global flags.
    ///
    /// An explicit `--config` must exist; the default file is optional.
    pub async fn resolve_config(&self) -> Result<DepwalkConfig> {
        let mut config = match &self.config {
            Some(path) => DepwalkConfig::load(path).await?,
            None => DepwalkConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE)).await?,
        };
        config.apply_env();
        if let Some(path) = &self.data_file {
            config.store.data_file = Some(path.clone());
        }
        Ok(config)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Traverse(args)) => {
                let mut config = self.resolve_config().await?;
                execute::apply_traverse_overrides(&mut config, args);
                let app = App::from_config(config).await?;
                execute::execute_traverse(&app, args, output_mode).await
            }
            Some(Commands::PointRead(args)) => {
                let app = App::from_config(self.resolve_config().await?).await?;
                execute::execute_point_read(&app, args, output_mode).await
            }
            Some(Commands::Find(args)) => {
                let app = App::from_config(self.resolve_config().await?).await?;
                execute::execute_find(&app, args, output_mode).await
            }
            Some(Commands::Count) => {
                let app = App::from_config(self.resolve_config().await?).await?;
                execute::execute_count(&app, output_mode).await
            }
            Some(Commands::Env) => execute::execute_env(output_mode),
            None => {
                println!("Depwalk dependency traversal");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["depwalk"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_traverse_minimal() {
        let cli = Cli::try_parse_from(["depwalk", "traverse", "flask", "2"]).unwrap();
        match cli.command {
            Some(Commands::Traverse(args)) => {
                assert_eq!(args.name, "flask");
                assert_eq!(args.depth, 2);
                assert!(args.concurrency.is_none());
                assert!(args.timeout_secs.is_none());
                assert!(!args.filter_by_store_ids);
            }
            _ => panic!("Expected Traverse command"),
        }
    }

    #[test]
    fn test_parse_traverse_negative_depth_reaches_engine() {
        let cli = Cli::try_parse_from(["depwalk", "traverse", "flask", "-1"]).unwrap();
        match cli.command {
            Some(Commands::Traverse(args)) => assert_eq!(args.depth, -1),
            _ => panic!("Expected Traverse command"),
        }
    }

    #[test]
    fn test_parse_traverse_rejects_zero_concurrency() {
        let result =
            Cli::try_parse_from(["depwalk", "traverse", "flask", "1", "--concurrency", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_traverse_rejects_blank_name() {
        let result = Cli::try_parse_from(["depwalk", "traverse", " ", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_traverse_rejects_padded_name() {
        let result = Cli::try_parse_from(["depwalk", "traverse", " flask", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "depwalk",
            "count",
            "--json",
            "--data-file",
            "libs.json",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.data_file.as_deref(), Some(Path::new("libs.json")));
        assert!(matches!(cli.command, Some(Commands::Count)));
    }

    #[test]
    fn test_parse_point_read() {
        let cli = Cli::try_parse_from(["depwalk", "point-read", "click", "c"]).unwrap();
        match cli.command {
            Some(Commands::PointRead(args)) => {
                assert_eq!(args.id, "click");
                assert_eq!(args.partition_key, "c");
            }
            _ => panic!("Expected PointRead command"),
        }
    }

    #[test]
    fn test_parse_find_and_env() {
        let cli = Cli::try_parse_from(["depwalk", "find", "flask"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Find(ref args)) if args.name == "flask"));

        let cli = Cli::try_parse_from(["depwalk", "env"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Env)));
    }

    #[tokio::test]
    async fn test_resolve_config_prefers_data_file_flag() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("depwalk.yaml");
        tokio::fs::write(
            &config_path,
            "store:\n  data-file: from-config.jsonl\ntraversal:\n  timeout-secs: 3\n",
        )
        .await
        .unwrap();
        let cli = Cli::try_parse_from([
            "depwalk",
            "--config",
            config_path.to_str().unwrap(),
            "--data-file",
            "from-flag.jsonl",
            "count",
        ])
        .unwrap();

        let config = cli.resolve_config().await.unwrap();

        assert_eq!(
            config.store.data_file.as_deref(),
            Some(Path::new("from-flag.jsonl"))
        );
        assert_eq!(config.traversal.timeout_secs, Some(3));
    }

    #[tokio::test]
    async fn test_resolve_config_missing_explicit_file_fails() {
        let cli = Cli::try_parse_from([
            "depwalk",
            "--config",
            "/nonexistent/depwalk.yaml",
            "env",
        ])
        .unwrap();

        assert!(cli.resolve_config().await.is_err());
    }
}
