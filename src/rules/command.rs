//! Typed command records and their execution.
//!
//! Every command kind has its own variant carrying exactly the operands its
//! syntax allows; the parser rejects every other combination.
use std::fmt;

use regex::Regex;

use super::names::{MarkerName, RegisterName};
use super::state::ProcessState;
use super::template::{TextTemplate, substitute, translate_replacement};

/// Where a command takes its text from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The text between a marker and the cursor.
    Marker(MarkerName),
    /// The content of a register.
    Register(RegisterName),
    /// Literal text with optional register placeholders.
    Text(TextTemplate),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker(m) => write!(f, "-{m}"),
            Self::Register(r) => write!(f, "-{r}"),
            Self::Text(t) => write!(f, ":{t}"),
        }
    }
}

/// Target of `jump`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpTarget {
    /// Move the cursor to a marker.
    Marker(MarkerName),
    /// Continue with the rule behind a label.
    Label(String),
}

/// Arithmetic operator of `expr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`, rounding towards negative infinity.
    Div,
    /// `%`, with the sign of the divisor.
    Rem,
}

impl Operator {
    /// Parse the operator character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '%' => Some(Self::Rem),
            _ => None,
        }
    }

    /// The operator character.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Rem => '%',
        }
    }

    /// Compute `a op b`; `None` on division by zero or overflow.
    #[must_use]
    pub const fn eval(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Self::Add => a.checked_add(b),
            Self::Sub => a.checked_sub(b),
            Self::Mul => a.checked_mul(b),
            Self::Div => {
                let Some(q) = a.checked_div(b) else {
                    return None;
                };
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    q.checked_sub(1)
                } else {
                    Some(q)
                }
            }
            Self::Rem => {
                let Some(r) = a.checked_rem(b) else {
                    return None;
                };
                if r != 0 && ((r < 0) != (b < 0)) {
                    r.checked_add(b)
                } else {
                    Some(r)
                }
            }
        }
    }
}

/// Second operand of `expr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A decimal constant.
    Literal(i64),
    /// `$R`: the numeric content of a register.
    Register(RegisterName),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(n) => write!(f, "{n}"),
            Self::Register(r) => write!(f, "${r}"),
        }
    }
}

/// A metric `state` can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateVariable {
    /// 1-based cursor line.
    Row,
    /// 1-based cursor column.
    Col,
    /// Number of lines in the buffer.
    Rows,
    /// Character length of a register.
    Size(RegisterName),
    /// Number of newlines in a register.
    RowsOf(RegisterName),
    /// Hit count of the latest replace.
    Hits,
}

impl std::str::FromStr for StateVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let register = |rest: &str| {
            let mut chars = rest.chars();
            match (chars.next().and_then(RegisterName::new), chars.next()) {
                (Some(r), None) => Ok(r),
                _ => Err(format!("register name expected in {s}")),
            }
        };
        match s {
            "row" => Ok(Self::Row),
            "col" => Ok(Self::Col),
            "rows" => Ok(Self::Rows),
            "hits" => Ok(Self::Hits),
            _ => {
                if let Some(rest) = s.strip_prefix("size-") {
                    register(rest).map(Self::Size)
                } else if let Some(rest) = s.strip_prefix("rows-") {
                    register(rest).map(Self::RowsOf)
                } else {
                    Err(format!("unknown state variable: {s}"))
                }
            }
        }
    }
}

impl fmt::Display for StateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => f.write_str("row"),
            Self::Col => f.write_str("col"),
            Self::Rows => f.write_str("rows"),
            Self::Size(r) => write!(f, "size-{r}"),
            Self::RowsOf(r) => write!(f, "rows-{r}"),
            Self::Hits => f.write_str("hits"),
        }
    }
}

/// Where `replace` substitutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceTarget {
    /// The cursor line.
    Line,
    /// The region between a marker and the cursor.
    Marker(MarkerName),
    /// A register's content.
    Register(RegisterName),
}

/// Operands of `replace`.
#[derive(Debug, Clone)]
pub struct Replace {
    /// Where to substitute.
    pub target: ReplaceTarget,
    /// The regex, possibly with register placeholders.
    pub pattern: TextTemplate,
    /// The backslash-style replacement template.
    pub replacement: TextTemplate,
    /// Maximum replacements per line or register; `0` = all.
    pub limit: usize,
    compiled: Option<Regex>,
}

impl Replace {
    /// Create a replace command.
    ///
    /// Without an escape character the pattern is compiled immediately.
    ///
    /// # Errors
    ///
    /// Returns a message if the pattern is not a valid regex.
    pub fn new(
        target: ReplaceTarget,
        pattern: TextTemplate,
        replacement: TextTemplate,
        limit: usize,
    ) -> Result<Self, String> {
        let compiled = match pattern.esc() {
            None => Some(
                Regex::new(pattern.raw())
                    .map_err(|e| format!("invalid regular expression: {e}"))?,
            ),
            Some(_) => None,
        };
        Ok(Self {
            target,
            pattern,
            replacement,
            limit,
            compiled,
        })
    }

    fn regex(&self, state: &ProcessState<'_>) -> Option<Regex> {
        if let Some(regex) = &self.compiled {
            return Some(regex.clone());
        }
        let pattern = self.pattern.render(&state.registers);
        match Regex::new(&pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                state
                    .log()
                    .error(&format!("replace: invalid regular expression {pattern}: {e}"));
                None
            }
        }
    }
}

impl PartialEq for Replace {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.pattern == other.pattern
            && self.replacement == other.replacement
            && self.limit == other.limit
    }
}

impl Eq for Replace {}

/// One command rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add-R-m`, `add-R-S`, `add-R:DtextD`: append onto a register.
    Add {
        /// Destination.
        register: RegisterName,
        /// Appended text.
        source: Source,
    },
    /// `cut-m`, `cut-R-m`: delete the marker region, optionally saving it.
    Cut {
        /// Region bound.
        marker: MarkerName,
        /// Register receiving the deleted text.
        register: Option<RegisterName>,
    },
    /// `expr-R:D<op><operand>D`: integer arithmetic on a register.
    Expr {
        /// Left operand and destination.
        register: RegisterName,
        /// The operator.
        operator: Operator,
        /// Right operand.
        operand: Operand,
    },
    /// `group-G-R`: copy a capture group of the last match.
    Group {
        /// Group number.
        group: usize,
        /// Destination.
        register: RegisterName,
    },
    /// `insert-R`, `insert:DtextD`: insert at the cursor.
    Insert(Source),
    /// `jump-m`, `jump:%label%`.
    Jump(JumpTarget),
    /// `mark-m`: remember the cursor.
    Mark(MarkerName),
    /// `print-m`, `print-R`, `print:DtextD`: write one output line.
    Print(Source),
    /// `replace[-m|-R]:D<re>D<repl>D[opts]`.
    Replace(Replace),
    /// `set-R-m`, `set-R:DtextD`: overwrite a register.
    Set {
        /// Destination.
        register: RegisterName,
        /// New content.
        source: Source,
    },
    /// `state-R:D<var>D`: store a metric.
    State {
        /// Destination.
        register: RegisterName,
        /// The metric.
        variable: StateVariable,
    },
    /// `swap-m`: exchange cursor and marker.
    Swap(MarkerName),
}

impl Command {
    /// The command's keyword.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Cut { .. } => "cut",
            Self::Expr { .. } => "expr",
            Self::Group { .. } => "group",
            Self::Insert(_) => "insert",
            Self::Jump(_) => "jump",
            Self::Mark(_) => "mark",
            Self::Print(_) => "print",
            Self::Replace(_) => "replace",
            Self::Set { .. } => "set",
            Self::State { .. } => "state",
            Self::Swap(_) => "swap",
        }
    }

    /// Markers the command reads (not the one `mark` defines).
    #[must_use]
    pub fn used_marker(&self) -> Option<MarkerName> {
        match self {
            Self::Add { source, .. }
            | Self::Insert(source)
            | Self::Print(source)
            | Self::Set { source, .. } => match source {
                Source::Marker(m) => Some(*m),
                _ => None,
            },
            Self::Cut { marker, .. }
            | Self::Swap(marker)
            | Self::Jump(JumpTarget::Marker(marker)) => Some(*marker),
            Self::Replace(Replace {
                target: ReplaceTarget::Marker(m),
                ..
            }) => Some(*m),
            _ => None,
        }
    }

    /// The label named by `jump:%label%`.
    #[must_use]
    pub fn jump_label(&self) -> Option<&str> {
        match self {
            Self::Jump(JumpTarget::Label(label)) => Some(label.as_str()),
            _ => None,
        }
    }

    /// Execute against `state`.
    ///
    /// Sets `state.success`. Returns the label to continue at for
    /// `jump:%label%`.
    pub fn execute(&self, state: &mut ProcessState<'_>) -> Option<&str> {
        state.success = true;
        match self {
            Self::Add { register, source } => {
                if let Some(text) = source_text(source, state) {
                    state.put_register(*register, &text, true);
                }
            }
            Self::Cut { marker, register } => {
                if let Some(register) = register {
                    match state.text_to_marker(*marker) {
                        Some(text) => state.put_register(*register, &text, false),
                        None => {
                            state.success = false;
                            return None;
                        }
                    }
                }
                state.delete_to_marker(*marker);
            }
            Self::Expr {
                register,
                operator,
                operand,
            } => {
                let left = as_int(state.register(*register));
                let right = match operand {
                    Operand::Literal(n) => *n,
                    Operand::Register(r) => as_int(state.register(*r)),
                };
                match operator.eval(left, right) {
                    Some(value) => state.put_register(*register, &value.to_string(), false),
                    None => {
                        state.log().debug(&format!(
                            "expr: {left} {} {right} is undefined",
                            operator.symbol()
                        ));
                        state.success = false;
                    }
                }
            }
            Self::Group { group, register } => {
                let text = state
                    .last_match
                    .as_ref()
                    .filter(|m| *group <= m.group_count())
                    .map(|m| m.group(*group).unwrap_or_default().to_string());
                match text {
                    Some(text) => state.put_register(*register, &text, false),
                    None => state.success = false,
                }
            }
            Self::Insert(source) => {
                if let Some(text) = source_text(source, state) {
                    state.insert_at_cursor(&text);
                }
            }
            Self::Jump(JumpTarget::Label(label)) => return Some(label.as_str()),
            Self::Jump(JumpTarget::Marker(marker)) => match state.marker(*marker) {
                Some(position) => {
                    state.cursor = position;
                    state.success = state.cursor_in_range();
                }
                None => state.success = false,
            },
            Self::Mark(marker) => state.set_marker(*marker),
            Self::Print(source) => {
                if let Some(text) = source_text(source, state) {
                    state.print(&text);
                }
            }
            Self::Replace(replace) => execute_replace(replace, state),
            Self::Set { register, source } => {
                if let Some(text) = source_text(source, state) {
                    state.put_register(*register, &text, false);
                }
            }
            Self::State { register, variable } => {
                let value = match variable {
                    StateVariable::Row => state.cursor.line + 1,
                    StateVariable::Col => state.cursor.col + 1,
                    StateVariable::Rows => state.lines().len(),
                    StateVariable::Size(r) => state.register(*r).chars().count(),
                    StateVariable::RowsOf(r) => state.register(*r).matches('\n').count(),
                    StateVariable::Hits => state.last_hits,
                };
                state.put_register(*register, &value.to_string(), false);
            }
            Self::Swap(marker) => match state.marker(*marker) {
                Some(position) => {
                    state.markers.insert(*marker, state.cursor);
                    state.cursor = position;
                    state.success = state.cursor_in_range();
                }
                None => {
                    state.log().debug(&format!("swap: marker {marker} is not set"));
                    state.success = false;
                }
            },
        }
        None
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        match self {
            Self::Add { register, source } | Self::Set { register, source } => {
                write!(f, "-{register}{source}")
            }
            Self::Cut { marker, register } => match register {
                Some(r) => write!(f, "-{r}-{marker}"),
                None => write!(f, "-{marker}"),
            },
            Self::Expr {
                register,
                operator,
                operand,
            } => write!(f, "-{register}:\"{}{operand}\"", operator.symbol()),
            Self::Group { group, register } => write!(f, "-{group}-{register}"),
            Self::Insert(source) | Self::Print(source) => write!(f, "{source}"),
            Self::Jump(JumpTarget::Marker(m)) | Self::Mark(m) | Self::Swap(m) => write!(f, "-{m}"),
            Self::Jump(JumpTarget::Label(label)) => write!(f, ":%{label}%"),
            Self::Replace(replace) => {
                match replace.target {
                    ReplaceTarget::Line => {}
                    ReplaceTarget::Marker(m) => write!(f, "-{m}")?,
                    ReplaceTarget::Register(r) => write!(f, "-{r}")?,
                }
                write!(
                    f,
                    ":/{}/{}/",
                    replace.pattern.raw(),
                    replace.replacement.raw()
                )
            }
            Self::State { register, variable } => write!(f, "-{register}:\"{variable}\""),
        }
    }
}

/// Resolve a text source; an unset marker or out-of-range region fails the
/// rule.
fn source_text(source: &Source, state: &mut ProcessState<'_>) -> Option<String> {
    let text = match source {
        Source::Marker(marker) => state.text_to_marker(*marker),
        Source::Register(register) => Some(state.register(*register).to_string()),
        Source::Text(template) => Some(template.render(&state.registers)),
    };
    if text.is_none() {
        state.success = false;
    }
    text
}

fn execute_replace(replace: &Replace, state: &mut ProcessState<'_>) {
    let Some(regex) = replace.regex(state) else {
        state.success = false;
        return;
    };
    let replacement = translate_replacement(&replace.replacement.render(&state.registers));
    match replace.target {
        ReplaceTarget::Register(register) => {
            let (text, hits) =
                substitute(&regex, state.register(register), &replacement, replace.limit);
            state.last_hits = hits;
            state.put_register(register, &text, false);
        }
        ReplaceTarget::Marker(marker) => match state.region_to_marker(marker) {
            Some((start, end)) => {
                state.last_hits =
                    state.replace_in_region(start, end, &regex, &replacement, replace.limit);
            }
            None => state.success = false,
        },
        ReplaceTarget::Line => {
            let row = state.cursor.line;
            let Some(line) = state.line(row) else {
                state.success = false;
                return;
            };
            let (text, hits) = substitute(&regex, line, &replacement, replace.limit);
            state.last_hits = hits;
            state.set_line(row, text);
        }
    }
}

/// Integer value of register text; anything unparsable counts as 0.
fn as_int(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use crate::rules::position::Position;

    fn reg(c: char) -> RegisterName {
        RegisterName::new(c).unwrap()
    }

    fn mark(c: char) -> MarkerName {
        MarkerName::new(c).unwrap()
    }

    fn text(s: &str) -> Source {
        Source::Text(TextTemplate::new(s, None))
    }

    /// Run `commands` on `content` from `cursor`; returns the final lines,
    /// registers as `(name, value)` pairs, success and printed output.
    fn run(
        content: &str,
        cursor: Position,
        commands: &[Command],
    ) -> (Vec<String>, Vec<(char, String)>, bool, String) {
        let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
        let range = (Position::default(), Position::end_of(&lines));
        let log = MemoryLog::new();
        let mut out = Vec::new();
        let (registers, success) = {
            let mut state = ProcessState::new(&mut lines, range, cursor, &log, &mut out);
            for command in commands {
                command.execute(&mut state);
            }
            let registers = state
                .registers
                .iter()
                .map(|(k, v)| (k.as_char(), v.clone()))
                .collect();
            (registers, state.success)
        };
        (lines, registers, success, String::from_utf8(out).unwrap())
    }

    #[test]
    fn operator_arithmetic_floors() {
        assert_eq!(Operator::Div.eval(7, 2), Some(3));
        assert_eq!(Operator::Div.eval(-7, 2), Some(-4));
        assert_eq!(Operator::Rem.eval(-7, 2), Some(1));
        assert_eq!(Operator::Rem.eval(7, -2), Some(-1));
        assert_eq!(Operator::Div.eval(1, 0), None);
        assert_eq!(Operator::Rem.eval(1, 0), None);
        assert_eq!(Operator::Add.eval(i64::MAX, 1), None);
    }

    #[test]
    fn expr_chain_on_registers() {
        let expr = |operator, operand| Command::Expr {
            register: reg('B'),
            operator,
            operand,
        };
        let commands = [
            Command::Set {
                register: reg('A'),
                source: text("5"),
            },
            expr(Operator::Add, Operand::Register(reg('A'))),
            expr(Operator::Sub, Operand::Literal(3)),
            expr(Operator::Mul, Operand::Literal(8)),
            expr(Operator::Div, Operand::Literal(3)),
        ];
        let (_, registers, success, _) = run("", Position::default(), &commands);
        assert!(success);
        assert_eq!(registers[1], ('B', "5".to_string()));
    }

    #[test]
    fn expr_division_by_zero_fails() {
        let commands = [Command::Expr {
            register: reg('A'),
            operator: Operator::Div,
            operand: Operand::Literal(0),
        }];
        let (_, registers, success, _) = run("", Position::default(), &commands);
        assert!(!success);
        assert!(registers.is_empty());
    }

    #[test]
    fn group_requires_last_match() {
        let commands = [Command::Group {
            group: 1,
            register: reg('A'),
        }];
        assert!(!run("x", Position::default(), &commands).2);
    }

    #[test]
    fn add_appends_in_rule_order() {
        let commands = [
            Command::Add {
                register: reg('A'),
                source: text("x"),
            },
            Command::Add {
                register: reg('A'),
                source: text("y"),
            },
            Command::Add {
                register: reg('B'),
                source: Source::Register(reg('A')),
            },
        ];
        let (_, registers, _, _) = run("", Position::default(), &commands);
        assert_eq!(
            registers,
            vec![('A', "xy".to_string()), ('B', "xy".to_string())]
        );
    }

    #[test]
    fn cut_into_register() {
        let commands = [
            Command::Mark(mark('a')),
            Command::Jump(JumpTarget::Marker(mark('a'))),
        ];
        let (_, _, success, _) = run("abc", Position::new(0, 1), &commands);
        assert!(success);

        let mut lines = vec!["hello world".to_string()];
        let range = (Position::default(), Position::end_of(&lines));
        let log = MemoryLog::new();
        let mut out = Vec::new();
        let mut state = ProcessState::new(&mut lines, range, Position::new(0, 5), &log, &mut out);
        Command::Mark(mark('a')).execute(&mut state);
        state.cursor = Position::new(0, 11);
        Command::Cut {
            marker: mark('a'),
            register: Some(reg('C')),
        }
        .execute(&mut state);
        assert!(state.success);
        assert_eq!(state.register(reg('C')), " world");
        assert_eq!(state.lines(), ["hello"]);
        assert_eq!(state.cursor, Position::new(0, 5));
    }

    #[test]
    fn unset_marker_fails_without_panicking() {
        for command in [
            Command::Swap(mark('q')),
            Command::Jump(JumpTarget::Marker(mark('q'))),
            Command::Print(Source::Marker(mark('q'))),
            Command::Cut {
                marker: mark('q'),
                register: None,
            },
        ] {
            assert!(!run("abc", Position::default(), &[command]).2);
        }
    }

    #[test]
    fn swap_exchanges_cursor_and_marker() {
        let mut lines = vec!["abcdef".to_string()];
        let range = (Position::default(), Position::end_of(&lines));
        let log = MemoryLog::new();
        let mut out = Vec::new();
        let mut state = ProcessState::new(&mut lines, range, Position::new(0, 1), &log, &mut out);
        Command::Mark(mark('s')).execute(&mut state);
        state.cursor = Position::new(0, 4);
        Command::Swap(mark('s')).execute(&mut state);
        assert!(state.success);
        assert_eq!(state.cursor, Position::new(0, 1));
        assert_eq!(state.marker(mark('s')), Some(Position::new(0, 4)));
    }

    #[test]
    fn print_writes_to_output() {
        let commands = [
            Command::Set {
                register: reg('Q'),
                source: text("World"),
            },
            Command::Print(Source::Text(TextTemplate::new("Hello $Q!", Some('$')))),
        ];
        let (lines, _, _, out) = run("x", Position::default(), &commands);
        assert_eq!(out, "Hello World!\n");
        assert_eq!(lines, vec!["x"]);
    }

    #[test]
    fn state_variables() {
        let state = |variable| Command::State {
            register: reg('R'),
            variable,
        };
        let cases = [
            (StateVariable::Row, "2"),
            (StateVariable::Col, "5"),
            (StateVariable::Rows, "3"),
            (StateVariable::Hits, "0"),
        ];
        for (variable, expected) in cases {
            let (_, registers, _, _) = run("a\nabcdef\nc", Position::new(1, 4), &[state(variable)]);
            assert_eq!(registers[0].1, expected, "{variable}");
        }
    }

    #[test]
    fn state_variable_parsing() {
        assert_eq!("size-A".parse(), Ok(StateVariable::Size(reg('A'))));
        assert_eq!("rows-Z".parse(), Ok(StateVariable::RowsOf(reg('Z'))));
        assert!("size-a".parse::<StateVariable>().is_err());
        assert!("width".parse::<StateVariable>().is_err());
    }

    #[test]
    fn replace_in_line_register_and_limit() {
        let line_replace = Command::Replace(
            Replace::new(
                ReplaceTarget::Line,
                TextTemplate::new("(o)", None),
                TextTemplate::new(r"[\1]", None),
                1,
            )
            .unwrap(),
        );
        let (lines, _, success, _) = run("foo\nboo", Position::new(1, 0), &[line_replace]);
        assert!(success);
        assert_eq!(lines, vec!["foo", "b[o]o"]);

        let commands = [
            Command::Set {
                register: reg('A'),
                source: text("a-b-c"),
            },
            Command::Replace(
                Replace::new(
                    ReplaceTarget::Register(reg('A')),
                    TextTemplate::new("-", None),
                    TextTemplate::new("+", None),
                    0,
                )
                .unwrap(),
            ),
            Command::State {
                register: reg('H'),
                variable: StateVariable::Hits,
            },
        ];
        let (_, registers, _, _) = run("", Position::default(), &commands);
        assert_eq!(
            registers,
            vec![('A', "a+b+c".to_string()), ('H', "2".to_string())]
        );
    }

    #[test]
    fn replace_on_sentinel_line_fails() {
        let command = Command::Replace(
            Replace::new(
                ReplaceTarget::Line,
                TextTemplate::new("x", None),
                TextTemplate::new("y", None),
                0,
            )
            .unwrap(),
        );
        assert!(!run("x", Position::new(1, 0), &[command]).2);
    }

    #[test]
    fn replace_pattern_with_register_placeholder() {
        let commands = [
            Command::Set {
                register: reg('P'),
                source: text("b+"),
            },
            Command::Replace(
                Replace::new(
                    ReplaceTarget::Line,
                    TextTemplate::new("a!P", Some('!')),
                    TextTemplate::new("X", Some('!')),
                    0,
                )
                .unwrap(),
            ),
        ];
        let (lines, _, _, _) = run("abbbc", Position::default(), &commands);
        assert_eq!(lines, vec!["Xc"]);
    }

    #[test]
    fn display_forms() {
        let c = Command::Cut {
            marker: mark('m'),
            register: Some(reg('R')),
        };
        assert_eq!(c.to_string(), "cut-R-m");
        let c = Command::Expr {
            register: reg('A'),
            operator: Operator::Mul,
            operand: Operand::Register(reg('B')),
        };
        assert_eq!(c.to_string(), "expr-A:\"*$B\"");
        assert_eq!(Command::Jump(JumpTarget::Label("x".into())).to_string(), "jump:%x%");
    }
}
