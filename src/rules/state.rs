//! The mutable execution context of one rule-list run.
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use regex::Regex;

use super::names::{MarkerName, RegisterName};
use super::position::{Position, char_len, slice_cols, split_at_col};
use super::template::substitute;
use crate::logging::Log;

/// Register contents by name.
pub type Registers = BTreeMap<RegisterName, String>;

/// Marker positions by name.
pub type Markers = BTreeMap<MarkerName, Position>;

/// Owned capture texts of the most recent successful search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastMatch {
    groups: Vec<Option<String>>,
}

impl LastMatch {
    /// Copy the capture texts out of `captures`.
    #[must_use]
    pub fn from_captures(captures: &regex::Captures<'_>) -> Self {
        Self {
            groups: captures
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        }
    }

    /// Number of capture groups, not counting the whole match.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len().saturating_sub(1)
    }

    /// Text of group `index`; `None` when the group did not participate.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(Option::as_deref)
    }
}

/// A structural change of the line buffer, described by the positions it
/// moved.
///
/// [`shift`](Self::shift) maps a position taken before the edit to where the
/// same text sits afterwards. [`ProcessState`] applies it to the cursor, the
/// markers and the range after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// The text in `[start, end)` was removed.
    Deleted {
        /// First removed position.
        start: Position,
        /// Position behind the removed text.
        end: Position,
    },
    /// Text was inserted at `at`; its end lies at `end`.
    Inserted {
        /// Insertion point.
        at: Position,
        /// Position behind the inserted text.
        end: Position,
    },
}

impl Edit {
    /// Where `p` lies after the edit.
    ///
    /// # Examples
    ///
    /// ```
    /// use sysedit_cli::rules::{Edit, Position};
    ///
    /// let cut = Edit::Deleted { start: Position::new(0, 1), end: Position::new(1, 2) };
    /// assert_eq!(cut.shift(Position::new(0, 0)), Position::new(0, 0));
    /// assert_eq!(cut.shift(Position::new(1, 5)), Position::new(0, 4));
    /// assert_eq!(cut.shift(Position::new(3, 1)), Position::new(2, 1));
    /// ```
    #[must_use]
    pub const fn shift(&self, p: Position) -> Position {
        match *self {
            Self::Deleted { start, end } => {
                if p.line < start.line || (p.line == start.line && p.col < start.col) {
                    p
                } else if p.line < end.line || (p.line == end.line && p.col <= end.col) {
                    start
                } else if p.line == end.line {
                    Position::new(start.line, start.col + (p.col - end.col))
                } else {
                    Position::new(p.line - (end.line - start.line), p.col)
                }
            }
            Self::Inserted { at, end } => {
                if p.line < at.line || (p.line == at.line && p.col < at.col) {
                    p
                } else if p.line == at.line {
                    Position::new(end.line, end.col + (p.col - at.col))
                } else {
                    Position::new(p.line + (end.line - at.line), p.col)
                }
            }
        }
    }
}

/// Everything a rule can read or change while a rule list runs.
///
/// Borrows the line buffer, the logger and the `print` sink of its host for
/// one run. Registers and markers live exactly as long as the state.
pub struct ProcessState<'a> {
    lines: &'a mut Vec<String>,
    log: &'a dyn Log,
    output: &'a mut dyn Write,
    /// Current position.
    pub cursor: Position,
    /// Lower bound of valid positions.
    pub start_range: Position,
    /// Upper bound of valid positions (inclusive).
    pub end_range: Position,
    /// Outcome of the latest rule.
    pub success: bool,
    /// Captures of the latest successful search.
    pub last_match: Option<LastMatch>,
    /// Named positions.
    pub markers: Markers,
    /// Named strings.
    pub registers: Registers,
    /// Whether any rule modified the buffer.
    pub has_changed: bool,
    /// Hit count of the latest `replace`.
    pub last_hits: usize,
    /// Jump budget factor: at most `max_loops * lines` label jumps.
    pub max_loops: usize,
}

impl fmt::Debug for ProcessState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessState")
            .field("lines", &self.lines.len())
            .field("cursor", &self.cursor)
            .field("start_range", &self.start_range)
            .field("end_range", &self.end_range)
            .field("success", &self.success)
            .field("markers", &self.markers)
            .field("registers", &self.registers)
            .field("has_changed", &self.has_changed)
            .field("last_hits", &self.last_hits)
            .finish_non_exhaustive()
    }
}

impl<'a> ProcessState<'a> {
    /// Default jump budget factor.
    pub const DEFAULT_MAX_LOOPS: usize = 10;

    /// Create a state over `lines` with the cursor at `start`.
    pub fn new(
        lines: &'a mut Vec<String>,
        range: (Position, Position),
        start: Position,
        log: &'a dyn Log,
        output: &'a mut dyn Write,
    ) -> Self {
        Self {
            lines,
            log,
            output,
            cursor: start,
            start_range: range.0,
            end_range: range.1,
            success: true,
            last_match: None,
            markers: Markers::new(),
            registers: Registers::new(),
            has_changed: false,
            last_hits: 0,
            max_loops: Self::DEFAULT_MAX_LOOPS,
        }
    }

    /// The line buffer.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        self.lines.as_slice()
    }

    pub(crate) fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub(crate) fn set_line(&mut self, index: usize, text: String) {
        if let Some(line) = self.lines.get_mut(index)
            && *line != text
        {
            *line = text;
            self.has_changed = true;
        }
    }

    pub(crate) fn log(&self) -> &dyn Log {
        self.log
    }

    /// Write one line to the `print` sink.
    pub(crate) fn print(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{text}") {
            self.log.warn(&format!("print: cannot write output: {e}"));
        }
    }

    /// Whether `p` lies in `[start_range, end_range]`.
    #[must_use]
    pub fn in_range(&self, p: Position) -> bool {
        self.start_range <= p && p <= self.end_range
    }

    /// Whether the cursor is in range.
    #[must_use]
    pub fn cursor_in_range(&self) -> bool {
        self.in_range(self.cursor)
    }

    /// Content of register `name`; `""` when unset.
    #[must_use]
    pub fn register(&self, name: RegisterName) -> &str {
        self.registers.get(&name).map_or("", String::as_str)
    }

    /// Set or extend register `name`.
    pub fn put_register(&mut self, name: RegisterName, text: &str, append: bool) {
        let slot = self.registers.entry(name).or_default();
        if !append {
            slot.clear();
        }
        slot.push_str(text);
    }

    /// Position of marker `name`, if set.
    #[must_use]
    pub fn marker(&self, name: MarkerName) -> Option<Position> {
        self.markers.get(&name).copied()
    }

    /// Record the cursor as marker `name`.
    pub fn set_marker(&mut self, name: MarkerName) {
        self.markers.insert(name, self.cursor);
    }

    /// The ordered region between marker `name` and the cursor.
    ///
    /// `None` if the marker is unset or either bound is out of range.
    #[must_use]
    pub fn region_to_marker(&self, name: MarkerName) -> Option<(Position, Position)> {
        let marker = self.marker(name)?;
        if !self.in_range(marker) || !self.cursor_in_range() {
            return None;
        }
        Some(if marker <= self.cursor {
            (marker, self.cursor)
        } else {
            (self.cursor, marker)
        })
    }

    /// The text between marker `name` and the cursor.
    #[must_use]
    pub fn text_to_marker(&self, name: MarkerName) -> Option<String> {
        self.region_to_marker(name)
            .map(|(start, end)| self.text_between(start, end))
    }

    /// Clamp `p` to a position that exists in the buffer (or its very end).
    fn clamp(&self, p: Position) -> Position {
        let Some(last) = self.lines.len().checked_sub(1) else {
            return Position::default();
        };
        if p.line > last {
            return Position::new(last, self.line(last).map_or(0, char_len));
        }
        Position::new(p.line, p.col.min(self.line(p.line).map_or(0, char_len)))
    }

    /// The exact text in `[start, end)`, lines joined with `\n`.
    #[must_use]
    pub fn text_between(&self, start: Position, end: Position) -> String {
        let (start, end) = (self.clamp(start), self.clamp(end));
        if end <= start {
            return String::new();
        }
        let first = self.line(start.line).unwrap_or_default();
        if start.line == end.line {
            return slice_cols(first, start.col, end.col).to_string();
        }
        let mut text = split_at_col(first, start.col).1.to_string();
        for ix in start.line + 1..end.line {
            text.push('\n');
            text.push_str(self.line(ix).unwrap_or_default());
        }
        text.push('\n');
        text.push_str(split_at_col(self.line(end.line).unwrap_or_default(), end.col).0);
        text
    }

    /// Delete the text between marker `name` and the cursor.
    ///
    /// Sets `success`; on success the cursor sits at the start of the
    /// deleted region.
    pub fn delete_to_marker(&mut self, name: MarkerName) -> bool {
        let Some((start, end)) = self.region_to_marker(name) else {
            self.success = false;
            return false;
        };
        self.success = true;
        let (start, end) = (self.clamp(start), self.clamp(end));
        if end <= start {
            return true;
        }
        let end_was_eof = self.end_range == Position::end_of(self.lines.as_slice());
        let first = self.line(start.line).unwrap_or_default();
        let last = self.line(end.line).unwrap_or_default();
        let joined = format!(
            "{}{}",
            split_at_col(first, start.col).0,
            split_at_col(last, end.col).1
        );
        self.lines
            .splice(start.line..=end.line, std::iter::once(joined));
        self.has_changed = true;
        self.finish_edit(Edit::Deleted { start, end }, end_was_eof);
        true
    }

    /// Insert `text` (may contain `\n`) at the cursor.
    ///
    /// Sets `success`; on success the cursor sits behind the insertion.
    /// Inserting on the end-of-file sentinel appends a new line first.
    pub fn insert_at_cursor(&mut self, text: &str) -> bool {
        self.success = self.cursor_in_range() && self.cursor.line <= self.lines.len();
        if !self.success || text.is_empty() {
            return self.success;
        }
        let end_was_eof = self.end_range == Position::end_of(self.lines.as_slice());
        if self.cursor.line == self.lines.len() {
            self.lines.push(String::new());
        }
        let at = self.clamp(self.cursor);
        let current = self.line(at.line).unwrap_or_default();
        let (head, tail) = split_at_col(current, at.col);
        let parts: Vec<&str> = text.split('\n').collect();
        let (new_lines, end) = match parts.as_slice() {
            [single] => (
                vec![format!("{head}{single}{tail}")],
                Position::new(at.line, at.col + char_len(single)),
            ),
            [first, middle @ .., last] => {
                let mut new_lines = Vec::with_capacity(parts.len());
                new_lines.push(format!("{head}{first}"));
                new_lines.extend(middle.iter().map(|s| (*s).to_string()));
                new_lines.push(format!("{last}{tail}"));
                (
                    new_lines,
                    Position::new(at.line + parts.len() - 1, char_len(last)),
                )
            }
            [] => return true,
        };
        self.lines.splice(at.line..=at.line, new_lines);
        self.has_changed = true;
        self.finish_edit(Edit::Inserted { at, end }, end_was_eof);
        self.cursor = end;
        true
    }

    /// Apply `edit` to the cursor, every marker and the range bounds.
    fn finish_edit(&mut self, edit: Edit, end_was_eof: bool) {
        self.cursor = edit.shift(self.cursor);
        for marker in self.markers.values_mut() {
            *marker = edit.shift(*marker);
        }
        match edit {
            Edit::Inserted { at, .. } if self.start_range <= at => {}
            _ => self.start_range = edit.shift(self.start_range),
        }
        self.end_range = if end_was_eof {
            Position::end_of(self.lines.as_slice())
        } else {
            edit.shift(self.end_range)
        };
    }

    /// Replace `regex` matches segment by segment in `[start, end)`.
    ///
    /// Each line's part of the region is substituted on its own with at most
    /// `limit` replacements (`0` = unlimited). Positions behind a changed
    /// segment on the same line move by its length delta. Returns the hit
    /// count.
    pub fn replace_in_region(
        &mut self,
        start: Position,
        end: Position,
        regex: &Regex,
        replacement: &str,
        limit: usize,
    ) -> usize {
        let (start, end) = (self.clamp(start), self.clamp(end));
        let mut hits = 0;
        for ix in start.line..=end.line {
            let Some(line) = self.line(ix) else { break };
            let from = if ix == start.line { start.col } else { 0 };
            let to = if ix == end.line { end.col } else { char_len(line) };
            if to <= from {
                continue;
            }
            let segment = slice_cols(line, from, to);
            let (replaced, count) = substitute(regex, segment, replacement, limit);
            hits += count;
            if replaced == segment {
                continue;
            }
            let new_len = char_len(&replaced);
            let text = format!(
                "{}{replaced}{}",
                split_at_col(line, from).0,
                split_at_col(line, to).1
            );
            self.set_line(ix, text);
            self.shift_columns(ix, from, to, from + new_len);
        }
        hits
    }

    /// Move positions on `line` after a segment `[from, old_end)` that now
    /// ends at `new_end`.
    fn shift_columns(&mut self, line: usize, from: usize, old_end: usize, new_end: usize) {
        let adjust = |p: Position| -> Position {
            if p.line != line || p.col <= from {
                p
            } else if p.col >= old_end {
                Position::new(line, (p.col + new_end).saturating_sub(old_end))
            } else {
                Position::new(line, p.col.min(new_end))
            }
        };
        self.cursor = adjust(self.cursor);
        self.end_range = adjust(self.end_range);
        for marker in self.markers.values_mut() {
            *marker = adjust(*marker);
        }
    }
}
