//! Non-fatal problems found while reading JSONL data.
//!
//! A corpus export with a handful of broken lines should still load. The
//! resilient reader sorts each rejected line by where it failed: bytes that
//! are not UTF-8 never reach the JSON decoder and become
//! [`Warning::SkippedLine`]; text that the decoder refuses becomes
//! [`Warning::MalformedJson`].
//!
//! ```
//! use depwalk_jsonl::warning::Warning;
//!
//! let warning = Warning::MalformedJson {
//!     line_number: 5,
//!     error: "unexpected end of input".to_string(),
//! };
//! assert_eq!(warning.line_number(), 5);
//! assert_eq!(warning.kind(), "malformed_json");
//! ```

/// A rejected JSONL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The line was UTF-8 text but did not decode into the record type.
    MalformedJson {
        /// Physical line, counting blank lines.
        line_number: usize,
        /// Decoder message.
        error: String,
    },

    /// The line was not UTF-8, so decoding was never attempted.
    SkippedLine {
        /// Physical line, counting blank lines.
        line_number: usize,
        /// The UTF-8 error.
        reason: String,
    },
}

impl Warning {
    /// Line the warning refers to.
    #[must_use]
    pub fn line_number(&self) -> usize {
        let (Self::MalformedJson { line_number, .. } | Self::SkippedLine { line_number, .. }) =
            self;
        *line_number
    }

    /// One-line message for logs.
    ///
    /// ```
    /// use depwalk_jsonl::warning::Warning;
    ///
    /// let warning = Warning::SkippedLine {
    ///     line_number: 3,
    ///     reason: "invalid UTF-8".to_string(),
    /// };
    /// assert_eq!(warning.description(), "line 3: not UTF-8: invalid UTF-8");
    /// ```
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedJson { line_number, error } => {
                format!("line {line_number}: malformed JSON: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => format!("line {line_number}: not UTF-8: {reason}"),
        }
    }

    /// Stable tag for structured log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

impl std::error::Error for Warning {}
