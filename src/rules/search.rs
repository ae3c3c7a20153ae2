//! Forward and backward regex searches over the line buffer.
use std::fmt;

use regex::{Regex, RegexBuilder};

use super::position::{Position, byte_index, char_col, char_len};
use super::state::{LastMatch, ProcessState};

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the end of the buffer (`>` / `F`).
    Forward,
    /// Towards the start of the buffer (`<` / `B`).
    Backward,
}

impl Direction {
    /// The rule character for this direction.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Forward => '>',
            Self::Backward => '<',
        }
    }
}

/// Narrows a search to fewer lines or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRange {
    /// At most this many lines, counting the cursor line.
    Lines(usize),
    /// At most this many columns of the cursor line.
    Columns(usize),
}

/// A compiled search with its options.
#[derive(Debug, Clone)]
pub struct SearchData {
    regex: Regex,
    pattern: String,
    /// Case-insensitive matching (`i`).
    pub ignore_case: bool,
    /// Place the cursor behind the match (`e`).
    pub use_end: bool,
    /// Optional line or column limit.
    pub range: Option<SearchRange>,
}

/// One match found in one line, columns in characters.
struct Hit {
    line: usize,
    start: usize,
    end: usize,
    groups: LastMatch,
}

impl SearchData {
    /// Build a search from its pattern and the option suffix that follows
    /// the closing delimiter, e.g. `8ie` or `:30`.
    ///
    /// # Errors
    ///
    /// Returns a message for an unknown option or an invalid pattern.
    pub fn new(pattern: &str, options: &str) -> Result<Self, String> {
        let digits_start = usize::from(options.starts_with(':'));
        let rest = options.get(digits_start..).unwrap_or_default();
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        let range = if digits.is_empty() {
            if digits_start == 1 {
                return Err("column count expected after ':'".to_string());
            }
            None
        } else {
            let count: usize = digits
                .parse()
                .map_err(|e| format!("invalid search range {digits}: {e}"))?;
            Some(if digits_start == 1 {
                SearchRange::Columns(count)
            } else {
                SearchRange::Lines(count)
            })
        };
        let mut ignore_case = false;
        let mut use_end = false;
        for option in rest.chars().skip(digits.len()) {
            match option {
                'i' => ignore_case = true,
                'e' => use_end = true,
                other => return Err(format!("unknown search option: {other}")),
            }
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|e| format!("invalid regular expression: {e}"))?;
        Ok(Self {
            regex,
            pattern: pattern.to_string(),
            ignore_case,
            use_end,
            range,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Run the search and move the cursor.
    ///
    /// On a miss the cursor does not move and `success` is false.
    pub fn apply(&self, direction: Direction, state: &mut ProcessState<'_>) {
        if !state.cursor_in_range() {
            state.success = false;
            return;
        }
        let hit = match direction {
            Direction::Forward => self.find_forward(state),
            Direction::Backward => self.find_backward(state),
        };
        match hit {
            Some(hit) => {
                let col = if self.use_end { hit.end } else { hit.start };
                state.cursor = Position::new(hit.line, col);
                state.last_match = Some(hit.groups);
                state.success = state.cursor_in_range();
            }
            None => {
                state.last_match = None;
                state.success = false;
            }
        }
    }

    fn find_forward(&self, state: &ProcessState<'_>) -> Option<Hit> {
        let lines = state.lines();
        let cursor = state.cursor;
        let end = state.end_range;
        let mut last = end.line.min(lines.len().checked_sub(1)?);
        if let Some(SearchRange::Lines(count)) = self.range {
            last = last.min(cursor.line.checked_add(count.checked_sub(1)?)?);
        }
        for ix in cursor.line..=last {
            let line = lines.get(ix)?;
            let from = if ix == cursor.line { cursor.col } else { 0 };
            let mut to = if ix == end.line { end.col } else { usize::MAX };
            if let Some(SearchRange::Columns(count)) = self.range {
                to = to.min(cursor.col.saturating_add(count));
            }
            if let Some((start, stop, groups)) = find_in_line(&self.regex, line, from, to, false) {
                return Some(Hit {
                    line: ix,
                    start,
                    end: stop,
                    groups,
                });
            }
            if matches!(self.range, Some(SearchRange::Columns(_))) {
                break;
            }
        }
        None
    }

    fn find_backward(&self, state: &ProcessState<'_>) -> Option<Hit> {
        let lines = state.lines();
        let cursor = state.cursor;
        let (start, end) = (state.start_range, state.end_range);
        let first = cursor.line.min(lines.len().checked_sub(1)?);
        let cursor_col = if cursor.line >= lines.len() {
            lines.get(first).map_or(0, |line| char_len(line))
        } else {
            cursor.col
        };
        let mut lowest = start.line;
        if let Some(SearchRange::Lines(count)) = self.range {
            lowest = lowest.max(first.saturating_sub(count.checked_sub(1)?));
        }
        for ix in (lowest..=first).rev() {
            let line = lines.get(ix)?;
            let mut from = if ix == start.line { start.col } else { 0 };
            let mut to = if ix == first { cursor_col } else { usize::MAX };
            if ix == end.line {
                to = to.min(end.col);
            }
            if let Some(SearchRange::Columns(count)) = self.range {
                from = from.max(cursor_col.saturating_sub(count));
            }
            if let Some((begin, stop, groups)) = find_in_line(&self.regex, line, from, to, true) {
                return Some(Hit {
                    line: ix,
                    start: begin,
                    end: stop,
                    groups,
                });
            }
            if matches!(self.range, Some(SearchRange::Columns(_))) {
                break;
            }
        }
        None
    }
}

impl fmt::Display for SearchData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.pattern)?;
        match self.range {
            Some(SearchRange::Lines(n)) => write!(f, "{n}")?,
            Some(SearchRange::Columns(n)) => write!(f, ":{n}")?,
            None => {}
        }
        if self.ignore_case {
            f.write_str("i")?;
        }
        if self.use_end {
            f.write_str("e")?;
        }
        Ok(())
    }
}

/// Find the first (or last) match of `regex` in the column window
/// `[from, to)` of `line`. Returns start and end columns plus the captures.
///
/// The line is truncated at `to` but searched from `from`, so `^` still
/// only matches at the real line start.
fn find_in_line(
    regex: &Regex,
    line: &str,
    from: usize,
    to: usize,
    last: bool,
) -> Option<(usize, usize, LastMatch)> {
    let hay = line.get(..byte_index(line, to))?;
    let mut at = byte_index(line, from);
    if at > hay.len() {
        return None;
    }
    let mut best = None;
    while at <= hay.len() {
        let Some(caps) = regex.captures_at(hay, at) else {
            break;
        };
        let whole = caps.get(0)?;
        let found = (
            char_col(line, whole.start()),
            char_col(line, whole.end()),
            LastMatch::from_captures(&caps),
        );
        if !last {
            return Some(found);
        }
        at = if whole.is_empty() {
            hay.get(whole.end()..)
                .and_then(|tail| tail.chars().next())
                .map_or(hay.len() + 1, |c| whole.end() + c.len_utf8())
        } else {
            whole.end()
        };
        best = Some(found);
    }
    best
}
