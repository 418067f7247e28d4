//! One-based locations in template or generated text
//!
//! Offsets are byte indices; columns count characters, so multi-byte
//! literals report the position a reader would count.

use std::fmt;

/// A one-based (line, column) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The very first position of a text.
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Convert a byte offset into a [`Location`].
///
/// Offsets past the end of `text` (e.g. an end-of-input error) resolve as if
/// the text had one more character on its last line.
pub(crate) fn location_at(text: &str, offset: usize) -> Location {
    let offset = offset.min(text.len());
    let before = &text[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = text[line_start..offset].chars().count() + 1;
    Location { line, column }
}

/// Convert a one-based (line, column) pair back into a byte offset.
///
/// Out-of-range lines clamp to the end of the text; out-of-range columns
/// clamp to the end of their line.
pub(crate) fn offset_at(text: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for _ in 1..line.max(1) {
        match text[line_start..].find('\n') {
            Some(p) => line_start += p + 1,
            None => return text.len(),
        }
    }
    let rest = &text[line_start..];
    let line_end = rest.find('\n').unwrap_or(rest.len());
    let mut offset = 0;
    let mut chars = rest[..line_end].char_indices();
    for _ in 1..column.max(1) {
        match chars.next() {
            Some((_, c)) => offset += c.len_utf8(),
            None => break,
        }
    }
    line_start + offset
}
