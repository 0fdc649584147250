//! The error type shared by every minifier.
//!
//! A [`MinifyError`] carries a message template with the offending
//! character (if any) already interpolated, plus the byte offset into the
//! original input where the problem was found. The template still carries
//! exactly two `%d` placeholders, filled in later with the line and column
//! derived from the offset — deferred because only the caller knows how to
//! walk the original input to compute them.

use std::fmt;

/// A minification failure: an unresolved message template plus a byte
/// offset into the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyError {
    pub template: String,
    pub offset: usize,
}

impl MinifyError {
    pub fn new(template: impl Into<String>, offset: usize) -> Self {
        Self {
            template: template.into(),
            offset,
        }
    }

    /// Fills in the two deferred `%d` placeholders with `line` and `column`.
    pub fn render(&self, line: usize, column: usize) -> String {
        let first = self.template.replacen("%d", &line.to_string(), 1);
        first.replacen("%d", &column.to_string(), 1)
    }
}

impl fmt::Display for MinifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template)
    }
}

impl std::error::Error for MinifyError {}

pub type MinifyResult = Result<String, MinifyError>;

/// Converts a byte offset into a 1-based line and 0-based column, per the
/// convention used throughout this crate: `line` increments on every `\n`
/// up to and including `offset`; `column` counts bytes since the last `\n`
/// (or since the start of input), and is reset to 0 on a `\n` itself.
pub fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let mut line = 1usize;
    let mut column = 0usize;
    let bytes = input.as_bytes();
    let limit = offset.min(bytes.len().saturating_sub(1));
    if bytes.is_empty() {
        return (1, 0);
    }
    for &b in &bytes[..=limit] {
        if b == b'\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (line, column)
}
