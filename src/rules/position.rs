//! Line/column coordinates inside a line buffer.
//!
//! Columns count characters, not bytes. The helpers at the bottom of this
//! module translate between the two so every slice taken from a line lands
//! on a character boundary.
use std::fmt;

/// A `(line, col)` coordinate, ordered lexicographically.
///
/// A position is only meaningful relative to the buffer it was taken from.
/// `line == lines.len()` is the end-of-file sentinel produced by `eof`,
/// `eol`, `bonl` and `eonl`.
///
/// # Examples
///
/// ```
/// use sysedit_cli::rules::Position;
///
/// let a = Position::new(1, 4);
/// let b = Position::new(2, 0);
/// assert!(a < b);
/// assert_eq!(a.to_string(), "1:4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based character column.
    pub col: usize,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// The end-of-file sentinel for `lines`: one line past the last one.
    #[must_use]
    pub const fn end_of(lines: &[String]) -> Self {
        Self::new(lines.len(), 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Number of characters in `s`.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of character column `col` in `s`, clamped to `s.len()`.
pub(crate) fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(ix, _)| ix)
}

/// Character column of byte offset `byte` in `s`.
pub(crate) fn char_col(s: &str, byte: usize) -> usize {
    s.get(..byte).map_or_else(|| char_len(s), char_len)
}

/// Split `s` at character column `col`, clamping to the end.
pub(crate) fn split_at_col(s: &str, col: usize) -> (&str, &str) {
    s.split_at(byte_index(s, col))
}

/// The characters of `s` in the column window `[from, to)`, clamped.
pub(crate) fn slice_cols(s: &str, from: usize, to: usize) -> &str {
    let start = byte_index(s, from);
    let end = byte_index(s, to).max(start);
    s.get(start..end).unwrap_or_default()
}
