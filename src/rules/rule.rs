//! A single parsed rule and its execution.
use std::fmt;
use std::str::FromStr;

use super::command::Command;
use super::flow::FlowControl;
use super::position::{Position, char_len};
use super::search::{Direction, SearchData};
use super::state::ProcessState;

/// A named cursor anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Begin of file.
    Bof,
    /// End of file: the sentinel line.
    Eof,
    /// Begin of line.
    Bol,
    /// End of line: behind its newline.
    Eol,
    /// Begin of next line.
    Bonl,
    /// End of next line.
    Eonl,
    /// Begin of previous line.
    Bopl,
    /// End of previous line: begin of the current one.
    Eopl,
}

impl Anchor {
    /// All anchors with their keywords.
    pub const ALL: [(&'static str, Self); 8] = [
        ("bof", Self::Bof),
        ("eof", Self::Eof),
        ("bol", Self::Bol),
        ("eol", Self::Eol),
        ("bonl", Self::Bonl),
        ("eonl", Self::Eonl),
        ("bopl", Self::Bopl),
        ("eopl", Self::Eopl),
    ];

    /// The keyword of this anchor.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(_, anchor)| *anchor == self)
            .map_or("?", |(name, _)| *name)
    }

    /// Where the anchor puts a cursor at `cursor` in a buffer of
    /// `line_count` lines. `None` above the first line.
    #[must_use]
    pub const fn resolve(self, cursor: Position, line_count: usize) -> Option<Position> {
        let line = match self {
            Self::Bof => 0,
            Self::Eof => line_count,
            Self::Bol | Self::Eopl => cursor.line,
            Self::Eol | Self::Bonl => cursor.line + 1,
            Self::Eonl => cursor.line + 2,
            Self::Bopl => match cursor.line.checked_sub(1) {
                Some(line) => line,
                None => return None,
            },
        };
        Some(Position::new(line, 0))
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, anchor)| *anchor)
            .ok_or_else(|| format!("unknown anchor: {s}"))
    }
}

/// A line/column move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reposition {
    /// `L:C`, stored 0-based.
    Absolute(Position),
    /// `[+-]L:[+-]C`.
    Relative {
        /// Line delta.
        lines: i64,
        /// Column delta.
        cols: i64,
    },
}

impl Reposition {
    /// The new cursor, or `None` if the move leaves the buffer's top or left
    /// edge.
    #[must_use]
    pub fn resolve(self, cursor: Position, lines: &[String]) -> Option<Position> {
        match self {
            Self::Absolute(target) => Some(target),
            Self::Relative { lines: dl, cols: dc } => {
                let line = offset(cursor.line, dl)?;
                let mut col = offset(cursor.col, dc)?;
                if dc == 0
                    && let Some(text) = lines.get(line)
                {
                    let len = char_len(text);
                    if col >= len {
                        col = len.saturating_sub(1);
                    }
                }
                Some(Position::new(line, col))
            }
        }
    }
}

fn offset(base: usize, delta: i64) -> Option<usize> {
    let magnitude = usize::try_from(delta.unsigned_abs()).ok()?;
    if delta < 0 {
        base.checked_sub(magnitude)
    } else {
        base.checked_add(magnitude)
    }
}

impl fmt::Display for Reposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(p) => write!(f, "{}:{}", p.line + 1, p.col + 1),
            Self::Relative { lines, cols } => write!(f, "{lines:+}:{cols:+}"),
        }
    }
}

/// What a rule does.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// `%name%:`, a jump target.
    Label(String),
    /// `>D…D` or `<D…D`.
    Search {
        /// Forward or backward.
        direction: Direction,
        /// The compiled search.
        data: SearchData,
    },
    /// `L:C` or `[+-]L:[+-]C`.
    Reposition(Reposition),
    /// `bof`, `eol`, ...
    Anchor(Anchor),
    /// A command such as `mark-a`.
    Command(Command),
}

/// One parsed instruction with its flow control.
#[derive(Debug, Clone)]
pub struct SearchRule {
    /// The instruction.
    pub kind: RuleKind,
    /// Reactions to success and failure.
    pub flow: FlowControl,
}

impl SearchRule {
    /// A rule with default flow control.
    #[must_use]
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            flow: FlowControl::default(),
        }
    }

    /// The label name if this rule is a label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Label(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Execute the rule. Returns the label a `jump:%label%` continues at.
    pub fn apply(&self, state: &mut ProcessState<'_>) -> Option<&str> {
        match &self.kind {
            RuleKind::Label(_) => None,
            RuleKind::Search { direction, data } => {
                data.apply(*direction, state);
                None
            }
            RuleKind::Reposition(reposition) => {
                match reposition.resolve(state.cursor, state.lines()) {
                    Some(cursor) => {
                        state.cursor = cursor;
                        state.success = state.cursor_in_range();
                    }
                    None => state.success = false,
                }
                None
            }
            RuleKind::Anchor(anchor) => {
                match anchor.resolve(state.cursor, state.lines().len()) {
                    Some(cursor) => {
                        state.cursor = cursor;
                        state.success = state.cursor_in_range();
                    }
                    None => state.success = false,
                }
                None
            }
            RuleKind::Command(command) => command.execute(state),
        }
    }
}

impl fmt::Display for SearchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleKind::Label(name) => write!(f, "%{name}%:")?,
            RuleKind::Search { direction, data } => write!(f, "{}{data}", direction.symbol())?,
            RuleKind::Reposition(r) => write!(f, "{r}")?,
            RuleKind::Anchor(a) => f.write_str(a.keyword())?,
            RuleKind::Command(c) => write!(f, "{c}")?,
        }
        if !self.flow.is_default() {
            write!(f, " {}", self.flow)?;
        }
        Ok(())
    }
}
