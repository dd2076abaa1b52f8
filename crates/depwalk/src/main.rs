//! Depwalk CLI binary.

use anyhow::Result;
use depwalk::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the depwalk CLI.
///
/// Point reads within a traversal level run concurrently on the
/// multi-threaded runtime.
#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output on stdout stays parseable
    // Example: RUST_LOG=depwalk=debug,depwalk_jsonl=trace depwalk traverse flask 3
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("depwalk=info,depwalk_jsonl=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting depwalk CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Depwalk CLI completed successfully");
    Ok(())
}
