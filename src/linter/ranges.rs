//! Narrowing diagnostic ranges once the file content is known.
//!
//! PMD reports only a line number, so diagnostics start out spanning a fixed
//! placeholder width. With the file text at hand the range is moved to start at
//! the first non-whitespace character and to end at the real end of the line.

use std::fmt;

use crate::linter::diagnostics::{Diagnostic, Position, Range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// The reported line does not exist in the file content
    LineOutOfBounds { line: u32, line_count: usize },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineOutOfBounds { line, line_count } => write!(
                f,
                "line {} is out of bounds (file has {} lines)",
                line + 1,
                line_count
            ),
        }
    }
}

impl std::error::Error for RangeError {}

/// Replace the range of `diagnostic` with the non-whitespace extent of its
/// start line in `text`.
///
/// On error the diagnostic is left untouched.
pub fn narrow_to_line_content(diagnostic: &mut Diagnostic, text: &str) -> Result<(), RangeError> {
    let line = diagnostic.range.start.line;
    diagnostic.range = line_content_range(text, line)?;
    Ok(())
}

/// Range from the first non-whitespace character of `line` to its end.
///
/// Lines are split on `\n` with a trailing `\r` dropped; a trailing newline
/// produces a final empty line, as editors count it. A blank line yields an
/// empty range at its end.
pub fn line_content_range(text: &str, line: u32) -> Result<Range, RangeError> {
    let Some(content) = text.split('\n').nth(line as usize) else {
        return Err(RangeError::LineOutOfBounds {
            line,
            line_count: text.split('\n').count(),
        });
    };
    let content = content.strip_suffix('\r').unwrap_or(content);

    let end = utf16_len(content);
    let start = content
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map(|(idx, _)| utf16_len(&content[..idx]))
        .unwrap_or(end);

    Ok(Range::new(
        Position::new(line, start),
        Position::new(line, end),
    ))
}

fn utf16_len(s: &str) -> u32 {
    s.chars().map(|c| c.len_utf16() as u32).sum()
}
