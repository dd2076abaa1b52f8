//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or pretty JSON for
//! programmatic use. Text renderers write to any [`Write`] so they can be
//! tested against a buffer; the `print_*` dispatch functions write to stdout.

pub mod color;

use crate::config::EnvVarInfo;
use crate::domain::Node;
use crate::traversal::TraversalResult;
use serde::Serialize;
use serde_json::json;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};

use color::{bold, colorize_id, colorize_outcome, dimmed};

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `DEPWALK_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && match env::var("DEPWALK_COLOR") {
                Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") => false,
                Ok(v) if v.is_empty() || v == "1" || v.eq_ignore_ascii_case("true") => true,
                Ok(v) => {
                    tracing::warn!(
                        env_var = "DEPWALK_COLOR",
                        value = %v,
                        "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                    );
                    true
                }
                Err(_) => true,
            };

        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a traversal result in the specified format
pub fn print_traversal(result: &TraversalResult, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_traversal_text(&mut handle, result, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, result),
    }
}

/// Print a single document, or a not-found notice.
///
/// `lookup` describes what was looked up, for the text notice.
pub fn print_node(node: Option<&Node>, lookup: &str, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_node_text(&mut handle, node, lookup, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &node),
    }
}

/// Print the document count
pub fn print_count(count: usize, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => writeln!(handle, "{count} documents"),
        OutputMode::Json => write_json(&mut handle, &json!({ "count": count })),
    }
}

/// Print the environment variables depwalk reads
pub fn print_env(vars: &[EnvVarInfo], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_env_text(&mut handle, vars, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &vars),
    }
}

// ============================================================================
// Renderers
// ============================================================================

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

/// Render a traversal result grouped by discovery depth.
pub(crate) fn write_traversal_text<W: Write>(
    w: &mut W,
    result: &TraversalResult,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} (depth {}, {})",
        bold("Dependencies of", config),
        colorize_id(&result.root_name, config),
        result.requested_depth,
        colorize_outcome(&result.outcome, config)
    )?;

    if let Some(max_depth) = result.max_discovered_depth() {
        for depth in 0..=max_depth {
            let ids = result.ids_at_depth(depth);
            if ids.is_empty() {
                continue;
            }
            writeln!(w)?;
            writeln!(w, "{}", bold(&format!("Level {depth}"), config))?;
            for id in ids {
                let entry = &result.collected_nodes[id];
                write!(w, "  {}", colorize_id(id.as_str(), config))?;
                if !entry.node.name.is_empty() && entry.node.name != id.as_str() {
                    write!(w, " ({})", entry.node.name)?;
                }
                writeln!(
                    w,
                    " {}",
                    dimmed(&format!("[pk {}]", entry.node.partition_key), config)
                )?;
            }
        }
    }

    if !result.missing.is_empty() {
        writeln!(w)?;
        writeln!(
            w,
            "{}",
            bold(&format!("Missing ({})", result.missing.len()), config)
        )?;
        for missing in &result.missing {
            writeln!(
                w,
                "  {} {} {}",
                error(missing.id.as_str(), config),
                dimmed(&format!("[pk {}]", missing.partition_key), config),
                dimmed(&format!("at level {}", missing.discovery_depth), config)
            )?;
        }
    }

    writeln!(w)?;
    writeln!(
        w,
        "{} libraries, {} point reads, {} missing, {} filtered in {} ms",
        result.len(),
        result.stats.point_reads,
        result.stats.misses,
        result.stats.filtered_out,
        result.elapsed.as_millis()
    )
}

fn write_node_text<W: Write>(
    w: &mut W,
    node: Option<&Node>,
    lookup: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    let Some(node) = node else {
        return writeln!(w, "{}", warning(&format!("No document found for {lookup}"), config));
    };

    writeln!(w, "{}: {}", dimmed("id", config), colorize_id(node.id.as_str(), config))?;
    writeln!(w, "{}: {}", dimmed("pk", config), node.partition_key)?;
    writeln!(w, "{}: {}", dimmed("name", config), node.name)?;

    if node.dependencies.is_empty() {
        writeln!(w, "{}: none", dimmed("dependencies", config))?;
    } else {
        writeln!(w, "{} ({}):", dimmed("dependencies", config), node.dependencies.len())?;
        for dep in &node.dependencies {
            writeln!(
                w,
                "  {} {}",
                colorize_id(dep.id.as_str(), config),
                dimmed(&format!("[pk {}]", dep.partition_key), config)
            )?;
        }
    }

    for (key, value) in &node.attributes {
        writeln!(w, "{}: {value}", dimmed(key, config))?;
    }
    Ok(())
}

fn write_env_text<W: Write>(
    w: &mut W,
    vars: &[EnvVarInfo],
    config: &OutputConfig,
) -> io::Result<()> {
    for var in vars {
        let value = match &var.value {
            Some(v) => v.clone(),
            None => dimmed("(unset)", config),
        };
        writeln!(w, "{} = {value}", bold(var.name, config))?;
        writeln!(w, "  {}", dimmed(var.description, config))?;
    }
    Ok(())
}
