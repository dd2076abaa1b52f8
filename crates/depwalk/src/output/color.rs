//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:   green   (completed traversals)
//!   - Warning:   yellow  (partial results, load warnings)
//!   - Error:     red     (missing dependencies, aborted runs)
//!   - Reference: cyan    (library ids)
//!   - Muted:     dimmed  (field labels, partition keys)
//!   - Emphasis:  bold    (section headers)

use colored::Colorize;

use super::OutputConfig;
use crate::traversal::TraversalOutcome;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Colorize a library id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Describe a traversal outcome, colored by severity.
pub(crate) fn colorize_outcome(outcome: &TraversalOutcome, config: &OutputConfig) -> String {
    match outcome {
        TraversalOutcome::Completed => success("completed", config),
        TraversalOutcome::RootNotFound => warning("root not found", config),
        TraversalOutcome::Aborted { level, reason } => {
            error(&format!("aborted at level {level}: {reason}"), config)
        }
        TraversalOutcome::TimedOut { level } => {
            warning(&format!("timed out at level {level}"), config)
        }
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
