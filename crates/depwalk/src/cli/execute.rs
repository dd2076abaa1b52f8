//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;

use super::args::{FindArgs, PointReadArgs, TraverseArgs};
use crate::app::App;
use crate::config::{DepwalkConfig, defined_environment_variables};
use crate::domain::NodeId;
use crate::output::{self, OutputMode};

/// Apply `traverse` flags on top of the resolved configuration.
pub fn apply_traverse_overrides(config: &mut DepwalkConfig, args: &TraverseArgs) {
    if let Some(n) = args.concurrency {
        config.traversal.max_concurrent_lookups = n;
    }
    if let Some(secs) = args.timeout_secs {
        config.traversal.timeout_secs = Some(secs);
    }
    if let Some(path) = &args.known_ids {
        config.traversal.known_ids_file = Some(path.clone());
    }
    if args.filter_by_store_ids {
        config.traversal.filter_by_store_ids = true;
    }
}

/// Execute the traverse command
pub async fn execute_traverse(app: &App, args: &TraverseArgs, output_mode: OutputMode) -> Result<()> {
    let graph = app.graph()?;
    let result = graph.traverse(&args.name, args.depth).await?;

    output::print_traversal(&result, output_mode)?;

    if result.outcome.is_partial() && output_mode == OutputMode::Text {
        eprintln!(
            "{}",
            output::warning(
                "Result is partial; see the log for the failure",
                &output::OutputConfig::from_env()
            )
        );
    }
    Ok(())
}

/// Execute the point-read command
pub async fn execute_point_read(app: &App, args: &PointReadArgs, output_mode: OutputMode) -> Result<()> {
    let id = NodeId::new(args.id.as_str());
    let node = app.store().point_read(&id, &args.partition_key).await?;

    output::print_node(
        node.as_ref(),
        &format!("id '{}' in partition '{}'", args.id, args.partition_key),
        output_mode,
    )?;
    Ok(())
}

/// Execute the find command
pub async fn execute_find(app: &App, args: &FindArgs, output_mode: OutputMode) -> Result<()> {
    let node = app.store().find_by_name(&args.name).await?;

    output::print_node(node.as_ref(), &format!("name '{}'", args.name), output_mode)?;
    Ok(())
}

/// Execute the count command
pub async fn execute_count(app: &App, output_mode: OutputMode) -> Result<()> {
    let count = app.store().count().await?;

    output::print_count(count, output_mode)?;
    Ok(())
}

/// Execute the env command
pub fn execute_env(output_mode: OutputMode) -> Result<()> {
    output::print_env(&defined_environment_variables(), output_mode)?;
    Ok(())
}
