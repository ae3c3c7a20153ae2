//! Hand-written scanner for the rule language.
//!
//! Rules are separated by whitespace and/or `;`. Every rule is scanned to
//! its full extent before it is validated, so a rule with bad operands is
//! reported and skipped while input that cannot be scanned at all ends the
//! parse.
use std::collections::BTreeSet;

use super::command::{
    Command, JumpTarget, Operand, Operator, Replace, ReplaceTarget, Source, StateVariable,
};
use super::flow::is_label_name;
use super::names::{MarkerName, RegisterName};
use super::position::{Position, char_col};
use super::rule::{Anchor, Reposition, RuleKind, SearchRule};
use super::search::{Direction, SearchData};
use super::template::TextTemplate;

/// The command keywords.
pub const COMMAND_NAMES: [&str; 12] = [
    "add", "cut", "expr", "group", "insert", "jump", "mark", "print", "replace", "set", "state",
    "swap",
];

/// A problem found while parsing or checking a rule list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{column}: {message} rule: {rule}")]
pub struct ParseError {
    /// Character column of the rule in the input.
    pub column: usize,
    /// What is wrong.
    pub message: String,
    /// The offending rule text.
    pub rule: String,
}

/// Result of one parse: the rules, their input columns and the errors.
#[derive(Debug, Default)]
pub(crate) struct Parsed {
    pub rules: Vec<SearchRule>,
    pub columns: Vec<usize>,
    pub errors: Vec<ParseError>,
}

/// Parse `input` into rules.
pub(crate) fn parse(input: &str) -> Parsed {
    Parser {
        src: input,
        pos: 0,
        marked: BTreeSet::new(),
        out: Parsed::default(),
    }
    .run()
}

/// Why scanning a rule stopped.
enum Fail {
    /// The rule was scanned completely but is invalid.
    Invalid(String),
    /// The input cannot be scanned any further.
    Fatal(String),
}

/// A `-x` suffix of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Var {
    Register(RegisterName),
    Marker(MarkerName),
    Group(usize),
}

/// The `:…` suffix of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    None,
    Text(TextTemplate),
    Label(String),
    Replace {
        pattern: String,
        replacement: String,
        esc: Option<char>,
        limit: usize,
    },
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    marked: BTreeSet<MarkerName>,
    out: Parsed,
}

const fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ';'
}

const MAX_RULE_ECHO: usize = 40;

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        self.src.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        rest.get(..len).unwrap_or_default()
    }

    /// Consume up to (not including) the next `delim`; `None` if absent.
    fn until(&mut self, delim: char) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(delim)?;
        self.pos += len + delim.len_utf8();
        rest.get(..len)
    }

    fn at_boundary(&self) -> bool {
        self.peek().is_none_or(is_separator)
    }

    fn error(&mut self, start: usize, message: String) {
        let rule: String = self
            .src
            .get(start..self.pos.max(start))
            .unwrap_or_default()
            .chars()
            .take(MAX_RULE_ECHO)
            .collect();
        self.out.errors.push(ParseError {
            column: char_col(self.src, start),
            message,
            rule,
        });
    }

    fn run(mut self) -> Parsed {
        loop {
            self.take_while(is_separator);
            let start = self.pos;
            if self.peek().is_none() {
                break;
            }
            let rest = self.rest();
            if rest.starts_with("success:") || rest.starts_with("error:") {
                let token = self.take_while(|c| !is_separator(c));
                let outcome = match self.out.rules.last_mut() {
                    Some(rule) => rule.flow.set(token),
                    None => Err("flow control without a preceding rule".to_string()),
                };
                if let Err(message) = outcome {
                    self.error(start, message);
                }
                continue;
            }
            let result = self.rule();
            let result = match result {
                Ok(_) | Err(Fail::Invalid(_)) if !self.at_boundary() => {
                    self.take_while(|c| !is_separator(c));
                    Err(Fail::Fatal("separator expected behind rule".to_string()))
                }
                other => other,
            };
            match result {
                Ok(rule) => {
                    self.out.rules.push(rule);
                    self.out.columns.push(char_col(self.src, start));
                }
                Err(Fail::Invalid(message)) => self.error(start, message),
                Err(Fail::Fatal(message)) => {
                    if self.pos == start {
                        self.pos = self.src.len();
                    }
                    self.error(start, message);
                    break;
                }
            }
        }
        self.out
    }

    fn rule(&mut self) -> Result<SearchRule, Fail> {
        let rest = self.rest();
        let mut chars = rest.chars();
        let first = chars.next().unwrap_or(' ');
        let second = chars.next();
        let kind = match first {
            '%' => self.label()?,
            '>' | 'F' | '<' | 'B' if second.is_some_and(|c| !c.is_whitespace()) => {
                self.search()?
            }
            '0'..='9' | '+' | '-' => self.reposition()?,
            'a'..='z' => self.word()?,
            _ => return Err(Fail::Fatal(format!("not recognized input: {}", clip(rest)))),
        };
        Ok(SearchRule::new(kind))
    }

    fn label(&mut self) -> Result<RuleKind, Fail> {
        self.bump();
        let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
        if !(self.eat('%') && self.eat(':')) {
            return Err(Fail::Fatal("label must be written as %name%:".to_string()));
        }
        if !is_label_name(name) {
            return Err(Fail::Invalid(format!("invalid label name: {name}")));
        }
        Ok(RuleKind::Label(name.to_string()))
    }

    fn search(&mut self) -> Result<RuleKind, Fail> {
        let direction = match self.bump() {
            Some('>' | 'F') => Direction::Forward,
            _ => Direction::Backward,
        };
        let delim = self.bump().unwrap_or(' ');
        let pattern = self
            .until(delim)
            .ok_or_else(|| Fail::Fatal(format!("missing closing delimiter {delim}")))?;
        let options = self.take_while(|c| !is_separator(c));
        if pattern.is_empty() {
            return Err(Fail::Invalid("empty search expression".to_string()));
        }
        let data = SearchData::new(pattern, options).map_err(Fail::Invalid)?;
        Ok(RuleKind::Search { direction, data })
    }

    fn reposition(&mut self) -> Result<RuleKind, Fail> {
        let token = self.take_while(|c| !is_separator(c));
        parse_reposition(token)
            .map(RuleKind::Reposition)
            .ok_or_else(|| Fail::Invalid(format!("invalid position: {token}")))
    }

    fn word(&mut self) -> Result<RuleKind, Fail> {
        let start = self.pos;
        let word = self.take_while(|c| c.is_ascii_lowercase());
        if let Ok(anchor) = word.parse::<Anchor>()
            && self.at_boundary()
        {
            return Ok(RuleKind::Anchor(anchor));
        }
        if !COMMAND_NAMES.contains(&word) {
            self.pos = start;
            return Err(Fail::Fatal(format!("not recognized input: {}", clip(self.rest()))));
        }
        let var1 = self.var(true)?;
        let var2 = if var1.is_some() { self.var(false)? } else { None };
        let clause = self.clause(word)?;
        let command = build_command(word, var1, var2, clause).map_err(Fail::Invalid)?;
        match &command {
            Command::Mark(marker) => {
                self.marked.insert(*marker);
            }
            other => {
                if let Some(marker) = other.used_marker()
                    && !self.marked.contains(&marker)
                {
                    return Err(Fail::Invalid(format!(
                        "marker {marker} was not previously defined"
                    )));
                }
            }
        }
        Ok(RuleKind::Command(command))
    }

    fn var(&mut self, allow_group: bool) -> Result<Option<Var>, Fail> {
        if !self.eat('-') {
            return Ok(None);
        }
        match self.peek() {
            Some(c) if c.is_ascii_digit() && allow_group => {
                let digits = self.take_while(|c| c.is_ascii_digit());
                if digits.len() > 2 {
                    return Err(Fail::Invalid(format!("group number too large: {digits}")));
                }
                let group = digits
                    .parse()
                    .map_err(|e| Fail::Invalid(format!("invalid group {digits}: {e}")))?;
                Ok(Some(Var::Group(group)))
            }
            Some(c) => {
                if let Some(register) = RegisterName::new(c) {
                    self.bump();
                    Ok(Some(Var::Register(register)))
                } else if let Some(marker) = MarkerName::new(c) {
                    self.bump();
                    Ok(Some(Var::Marker(marker)))
                } else {
                    Err(Fail::Fatal(format!("register or marker expected, not {c}")))
                }
            }
            None => Err(Fail::Fatal("register or marker expected".to_string())),
        }
    }

    fn clause(&mut self, name: &str) -> Result<Clause, Fail> {
        if !self.eat(':') {
            return Ok(Clause::None);
        }
        if name == "jump" {
            if !self.eat('%') {
                return Err(Fail::Fatal("jump:%label% expected".to_string()));
            }
            let label = self
                .until('%')
                .ok_or_else(|| Fail::Fatal("missing closing % of the label".to_string()))?;
            return if is_label_name(label) {
                Ok(Clause::Label(label.to_string()))
            } else {
                Err(Fail::Invalid(format!("invalid label name: {label}")))
            };
        }
        let delim = match self.bump() {
            Some(c) if !c.is_whitespace() => c,
            _ => return Err(Fail::Fatal("text delimiter expected after ':'".to_string())),
        };
        let unterminated = || Fail::Fatal(format!("missing closing delimiter {delim}"));
        let text = self.until(delim).ok_or_else(unterminated)?;
        if name == "replace" {
            let replacement = self.until(delim).ok_or_else(unterminated)?;
            let options = self.take_while(|c| !is_separator(c));
            let (esc, limit) = parse_replace_options(options).map_err(Fail::Invalid)?;
            return Ok(Clause::Replace {
                pattern: text.to_string(),
                replacement: replacement.to_string(),
                esc,
                limit,
            });
        }
        let mut esc = None;
        if self.rest().starts_with("e=") {
            self.pos += 2;
            esc = Some(
                self.bump()
                    .ok_or_else(|| Fail::Fatal("escape character expected".to_string()))?,
            );
        }
        Ok(Clause::Text(TextTemplate::new(text, esc)))
    }
}

fn clip(text: &str) -> String {
    text.chars().take(MAX_RULE_ECHO).collect()
}

/// `L:C` (1-based) or `[+-]L:[+-]C`.
fn parse_reposition(token: &str) -> Option<Reposition> {
    let (line, col) = token.split_once(':')?;
    let signed = |s: &str| -> Option<(Option<char>, i64)> {
        let sign = s.chars().next().filter(|c| *c == '+' || *c == '-');
        let digits = s.get(sign.map_or(0, char::len_utf8)..)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some((sign, digits.parse().ok()?))
    };
    let (line_sign, line_value) = signed(line)?;
    let (col_sign, col_value) = signed(col)?;
    match line_sign {
        None => {
            if col_sign.is_some() {
                return None;
            }
            let line = usize::try_from(line_value).ok()?.saturating_sub(1);
            let col = usize::try_from(col_value).ok()?.saturating_sub(1);
            Some(Reposition::Absolute(Position::new(line, col)))
        }
        Some(sign) => {
            let apply = |sign: char, value: i64| if sign == '-' { -value } else { value };
            Some(Reposition::Relative {
                lines: apply(sign, line_value),
                cols: apply(col_sign.unwrap_or(sign), col_value),
            })
        }
    }
}

/// `e=c` and `c=N` items separated by `,`.
fn parse_replace_options(options: &str) -> Result<(Option<char>, usize), String> {
    let mut esc = None;
    let mut limit = 0;
    for item in options.split(',').filter(|item| !item.is_empty()) {
        if let Some(c) = item.strip_prefix("e=") {
            let mut chars = c.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => esc = Some(c),
                _ => return Err(format!("one escape character expected: {item}")),
            }
        } else if let Some(count) = item.strip_prefix("c=") {
            limit = count
                .parse()
                .map_err(|e| format!("invalid replacement count {count}: {e}"))?;
        } else {
            return Err(format!("unknown replace option: {item}"));
        }
    }
    Ok((esc, limit))
}

fn build_command(
    name: &str,
    var1: Option<Var>,
    var2: Option<Var>,
    clause: Clause,
) -> Result<Command, String> {
    use Var::{Group, Marker, Register};
    let command = match (name, var1, var2, clause) {
        ("add", Some(Register(register)), Some(Marker(m)), Clause::None) => Command::Add {
            register,
            source: Source::Marker(m),
        },
        ("add", Some(Register(register)), Some(Register(r)), Clause::None) => Command::Add {
            register,
            source: Source::Register(r),
        },
        ("add", Some(Register(register)), None, Clause::Text(t)) => Command::Add {
            register,
            source: Source::Text(t),
        },
        ("add", ..) => return Err("add-R-m, add-R-S or add-R:DtextD expected".to_string()),

        ("cut", Some(Marker(marker)), None, Clause::None) => Command::Cut {
            marker,
            register: None,
        },
        (
            "cut",
            Some(Register(register)),
            Some(Marker(marker)),
            Clause::None,
        )
        | (
            "cut",
            Some(Marker(marker)),
            Some(Register(register)),
            Clause::None,
        ) => Command::Cut {
            marker,
            register: Some(register),
        },
        ("cut", ..) => return Err("cut-m or cut-R-m expected".to_string()),

        ("expr", Some(Register(register)), None, Clause::Text(t)) => {
            let (operator, operand) = parse_expr(t.raw())?;
            Command::Expr {
                register,
                operator,
                operand,
            }
        }
        ("expr", ..) => return Err("expr-R:\"<operator><operand>\" expected".to_string()),

        ("group", Some(Group(group)), Some(Register(register)), Clause::None) => {
            Command::Group { group, register }
        }
        ("group", ..) => return Err("group-G-R expected".to_string()),

        ("insert", Some(Register(r)), None, Clause::None) => Command::Insert(Source::Register(r)),
        ("insert", None, None, Clause::Text(t)) => Command::Insert(Source::Text(t)),
        ("insert", ..) => return Err("insert-R or insert:DtextD expected".to_string()),

        ("jump", Some(Marker(m)), None, Clause::None) => Command::Jump(JumpTarget::Marker(m)),
        ("jump", None, None, Clause::Label(label)) => Command::Jump(JumpTarget::Label(label)),
        ("jump", ..) => return Err("jump-m or jump:%label% expected".to_string()),

        ("mark", Some(Marker(m)), None, Clause::None) => Command::Mark(m),
        ("mark", ..) => return Err("mark-m expected".to_string()),

        ("print", Some(Marker(m)), None, Clause::None) => Command::Print(Source::Marker(m)),
        ("print", Some(Register(r)), None, Clause::None) => Command::Print(Source::Register(r)),
        ("print", None, None, Clause::Text(t)) => Command::Print(Source::Text(t)),
        ("print", ..) => return Err("print-m, print-R or print:DtextD expected".to_string()),

        (
            "replace",
            var,
            None,
            Clause::Replace {
                pattern,
                replacement,
                esc,
                limit,
            },
        ) => {
            let target = match var {
                None => ReplaceTarget::Line,
                Some(Marker(m)) => ReplaceTarget::Marker(m),
                Some(Register(r)) => ReplaceTarget::Register(r),
                Some(Group(_)) => return Err("replace-m or replace-R expected".to_string()),
            };
            Command::Replace(Replace::new(
                target,
                TextTemplate::new(pattern, esc),
                TextTemplate::new(replacement, esc),
                limit,
            )?)
        }
        ("replace", ..) => {
            return Err("replace[-m|-R]:DwhatDwithD[e=c,c=N] expected".to_string());
        }

        ("set", Some(Register(register)), Some(Marker(m)), Clause::None) => Command::Set {
            register,
            source: Source::Marker(m),
        },
        ("set", Some(Register(register)), None, Clause::Text(t)) => Command::Set {
            register,
            source: Source::Text(t),
        },
        ("set", ..) => return Err("set-R-m or set-R:DtextD expected".to_string()),

        ("state", Some(Register(register)), None, Clause::Text(t)) => Command::State {
            register,
            variable: t.raw().parse()?,
        },
        ("state", ..) => {
            return Err("state-R:\"{row|col|rows|size-R|rows-R|hits}\" expected".to_string());
        }

        ("swap", Some(Marker(m)), None, Clause::None) => Command::Swap(m),
        ("swap", ..) => return Err("swap-m expected".to_string()),

        (other, ..) => return Err(format!("unknown command {other}")),
    };
    Ok(command)
}

/// `<op><operand>` with operand a decimal or `$R`.
fn parse_expr(text: &str) -> Result<(Operator, Operand), String> {
    let mut chars = text.chars();
    let operator = chars
        .next()
        .and_then(Operator::from_char)
        .ok_or_else(|| format!("<operator><operand> expected, not \"{text}\""))?;
    let operand = chars.as_str();
    if let Some(name) = operand.strip_prefix('$') {
        let mut letters = name.chars();
        return match (letters.next().and_then(RegisterName::new), letters.next()) {
            (Some(register), None) => Ok((operator, Operand::Register(register))),
            _ => Err(format!("register expected behind $ in \"{text}\"")),
        };
    }
    if operand.is_empty() {
        return Err(format!("operand missing in \"{text}\""));
    }
    operand
        .parse()
        .map(|n| (operator, Operand::Literal(n)))
        .map_err(|e| format!("invalid operand in \"{text}\": {e}"))
}
