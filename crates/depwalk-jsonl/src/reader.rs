//! JSONL reading operations.
//!
//! [`JsonlReader`] wraps any async reader and decodes one JSON value per
//! line. Blank lines are ignored. Line numbers count every physical line,
//! including blank ones, so they match what an editor shows.

use crate::error::{Error, Result};
use crate::warning::Warning;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// One physical line, before JSON decoding.
enum RawLine {
    Text(String),
    InvalidUtf8(String),
}

/// Async reader for JSONL (JSON Lines) data.
///
/// # Examples
///
/// ```
/// use depwalk_jsonl::JsonlReader;
/// use std::io::Cursor;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> depwalk_jsonl::Result<()> {
/// let data = Cursor::new(b"{\"id\":1}\n\n{\"id\":2}\n".to_vec());
/// let mut reader = JsonlReader::new(data);
///
/// let first: serde_json::Value = reader.read_line().await?.unwrap();
/// assert_eq!(first["id"], 1);
/// let second: serde_json::Value = reader.read_line().await?.unwrap();
/// assert_eq!(second["id"], 2);
/// assert_eq!(reader.line_number(), 3);
/// assert!(reader.read_line::<serde_json::Value>().await?.is_none());
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    /// Buffered reader wrapping the underlying async reader.
    reader: BufReader<R>,
    /// 1-based number of the last line read, 0 before any read.
    line_number: usize,
    /// Reused line buffer.
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the 1-based number of the last line read.
    ///
    /// Returns 0 before any lines have been read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line.
    async fn next_raw(&mut self) -> Result<Option<RawLine>> {
        loop {
            self.buf.clear();
            let read = self.reader.read_until(b'\n', &mut self.buf).await?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            match std::str::from_utf8(&self.buf) {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Ok(Some(RawLine::Text(trimmed.to_string())));
                }
                Err(e) => return Ok(Some(RawLine::InvalidUtf8(e.to_string()))),
            }
        }
    }

    /// Reads and decodes the next record.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the line is not valid UTF-8 or does
    /// not decode as `T`, and [`Error::Io`] if the underlying read fails.
    pub async fn read_line<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        match self.next_raw().await? {
            None => Ok(None),
            Some(RawLine::Text(text)) => {
                serde_json::from_str(&text)
                    .map(Some)
                    .map_err(|e| Error::InvalidFormat {
                        line_number: self.line_number,
                        message: e.to_string(),
                    })
            }
            Some(RawLine::InvalidUtf8(reason)) => Err(Error::InvalidFormat {
                line_number: self.line_number,
                message: format!("invalid UTF-8: {reason}"),
            }),
        }
    }

    /// Reads and decodes the next record, skipping lines that fail to decode.
    ///
    /// Each skipped line is pushed onto `warnings`. Returns `Ok(None)` at end
    /// of input.
    ///
    /// # Errors
    ///
    /// Only I/O failures are returned as errors.
    pub async fn read_line_resilient<T: DeserializeOwned>(
        &mut self,
        warnings: &mut Vec<Warning>,
    ) -> Result<Option<T>> {
        loop {
            match self.next_raw().await? {
                None => return Ok(None),
                Some(RawLine::Text(text)) => match serde_json::from_str(&text) {
                    Ok(value) => return Ok(Some(value)),
                    Err(e) => warnings.push(Warning::MalformedJson {
                        line_number: self.line_number,
                        error: e.to_string(),
                    }),
                },
                Some(RawLine::InvalidUtf8(reason)) => warnings.push(Warning::SkippedLine {
                    line_number: self.line_number,
                    reason: format!("invalid UTF-8: {reason}"),
                }),
            }
        }
    }
}

/// Reads every decodable record from a JSONL file.
///
/// Lines that fail to decode are skipped and reported in the returned
/// warnings, in file order.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).await?;
    let mut reader = JsonlReader::new(file);

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    while let Some(record) = reader.read_line_resilient(&mut warnings).await? {
        records.push(record);
    }

    for warning in &warnings {
        tracing::debug!(
            kind = warning.kind(),
            line = warning.line_number(),
            "Skipped JSONL line"
        );
    }
    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        warnings = warnings.len(),
        lines = reader.line_number(),
        "Read JSONL file"
    );

    Ok((records, warnings))
}

/// Reads every record from a JSONL file, failing on the first bad line.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, and
/// [`Error::InvalidFormat`] with the offending line number if a line is not
/// valid UTF-8 or does not decode as `T`.
pub async fn read_jsonl<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).await?;
    let mut reader = JsonlReader::new(file);

    let mut records = Vec::new();
    while let Some(record) = reader.read_line().await? {
        records.push(record);
    }

    tracing::debug!(
        path = %path.display(),
        records = records.len(),
        lines = reader.line_number(),
        "Read JSONL file"
    );

    Ok(records)
}
