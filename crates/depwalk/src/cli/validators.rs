//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

/// Validate a library name used for root lookup.
///
/// Names are matched exactly, so surrounding whitespace is an error rather
/// than something to strip.
pub fn validate_library_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Library name cannot be empty".to_string());
    }
    reject_padding("library name", s)?;
    Ok(s.to_string())
}

/// Validate a document id or partition key.
pub fn validate_key(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Key cannot be empty".to_string());
    }
    reject_padding("key", s)?;
    if s.contains('|') {
        return Err(format!(
            "Invalid key '{s}': '|' is reserved as the composite key separator"
        ));
    }
    Ok(s.to_string())
}

fn reject_padding(what: &str, s: &str) -> Result<(), String> {
    if s.trim() != s {
        return Err(format!(
            "Invalid {what} '{s}': leading or trailing whitespace is not allowed"
        ));
    }
    Ok(())
}

/// Validate the point-read concurrency cap (must be at least 1).
pub fn validate_concurrency(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("Concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid concurrency '{s}': expected a positive integer")),
    }
}
