//! The parsed rule program and its interpreter loop.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::flow::Reaction;
use super::parser::{ParseError, parse};
use super::rule::{RuleKind, SearchRule};
use super::state::ProcessState;
use crate::logging::Log;

/// Why a run ended early with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// A rule's flow control selected `error`.
    ErrorReaction {
        /// Index of the rule whose reaction fired.
        rule: usize,
    },
    /// More label jumps than `max_loops * lines`.
    LoopLimit,
}

/// How [`SearchRuleList::apply`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Ran past the last rule.
    Completed,
    /// A `stop` reaction ended the run.
    Stopped,
    /// The run was aborted; buffer changes made so far are kept.
    Aborted(AbortReason),
}

impl Outcome {
    /// Whether the run was aborted.
    #[must_use]
    pub const fn is_aborted(self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Stopped => f.write_str("stopped"),
            Self::Aborted(AbortReason::ErrorReaction { rule }) => {
                write!(f, "aborted by rule {rule}")
            }
            Self::Aborted(AbortReason::LoopLimit) => f.write_str("aborted: too many loops"),
        }
    }
}

/// An ordered list of rules with its label table.
///
/// Build with [`parse`](Self::parse), validate with [`check`](Self::check)
/// and run with [`apply`](Self::apply). A list with a non-zero
/// [`error_count`](Self::error_count) must not be applied.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sysedit_cli::logging::MemoryLog;
/// use sysedit_cli::rules::SearchRuleList;
///
/// let mut list = SearchRuleList::new(Arc::new(MemoryLog::new()));
/// list.parse(">/x/ error:%missing% bof %missing%:");
/// assert!(list.check());
/// assert_eq!(list.len(), 3);
/// assert_eq!(list.labels().get("missing"), Some(&2));
/// ```
pub struct SearchRuleList {
    rules: Vec<SearchRule>,
    columns: Vec<usize>,
    labels: BTreeMap<String, usize>,
    parse_errors: Vec<ParseError>,
    check_errors: Vec<ParseError>,
    log: Arc<dyn Log>,
}

impl fmt::Debug for SearchRuleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRuleList")
            .field("rules", &self.rules)
            .field("labels", &self.labels)
            .field("parse_errors", &self.parse_errors)
            .field("check_errors", &self.check_errors)
            .finish_non_exhaustive()
    }
}

impl SearchRuleList {
    /// An empty list reporting to `log`.
    #[must_use]
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self {
            rules: Vec::new(),
            columns: Vec::new(),
            labels: BTreeMap::new(),
            parse_errors: Vec::new(),
            check_errors: Vec::new(),
            log,
        }
    }

    /// Parse `input`, replacing any previous content.
    ///
    /// Each error is logged once at error level. Returns `true` if the
    /// input parsed cleanly.
    pub fn parse(&mut self, input: &str) -> bool {
        let parsed = parse(input);
        for error in &parsed.errors {
            self.log.error(&error.to_string());
        }
        self.rules = parsed.rules;
        self.columns = parsed.columns;
        self.parse_errors = parsed.errors;
        self.labels.clear();
        self.check_errors.clear();
        self.parse_errors.is_empty()
    }

    /// Build the label table and verify every referenced label exists and
    /// no label is defined twice.
    ///
    /// Check errors are recomputed on each call. Returns `true` if the whole
    /// list (parse and check) is clean.
    pub fn check(&mut self) -> bool {
        self.labels.clear();
        self.check_errors.clear();
        let mut errors = Vec::new();
        for (ix, rule) in self.rules.iter().enumerate() {
            if let Some(name) = rule.label()
                && self.labels.insert(name.to_string(), ix).is_some()
            {
                errors.push(self.rule_error(ix, format!("label %{name}% is defined twice")));
            }
        }
        for (ix, rule) in self.rules.iter().enumerate() {
            for (condition, label) in rule.flow.labels() {
                if !self.labels.contains_key(label) {
                    let message = format!("unknown label (on {condition}): %{label}%");
                    errors.push(self.rule_error(ix, message));
                }
            }
            if let RuleKind::Command(command) = &rule.kind
                && let Some(label) = command.jump_label()
                && !self.labels.contains_key(label)
            {
                errors.push(self.rule_error(ix, format!("unknown jump target: %{label}%")));
            }
        }
        for error in &errors {
            self.log.error(&error.to_string());
        }
        self.check_errors = errors;
        self.error_count() == 0
    }

    fn rule_error(&self, ix: usize, message: String) -> ParseError {
        ParseError {
            column: self.columns.get(ix).copied().unwrap_or_default(),
            message,
            rule: self.rules.get(ix).map(ToString::to_string).unwrap_or_default(),
        }
    }

    /// Number of parse and check errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.parse_errors.len() + self.check_errors.len()
    }

    /// All parse and check errors in order.
    pub fn errors(&self) -> impl Iterator<Item = &ParseError> {
        self.parse_errors.iter().chain(&self.check_errors)
    }

    /// Label name to rule index, filled by [`check`](Self::check).
    #[must_use]
    pub const fn labels(&self) -> &BTreeMap<String, usize> {
        &self.labels
    }

    /// The parsed rules.
    #[must_use]
    pub fn rules(&self) -> &[SearchRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the list has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the rules against `state`.
    ///
    /// Every label jump, from flow control or `jump:`, counts against
    /// `state.max_loops * lines`; exceeding it aborts the run.
    pub fn apply(&self, state: &mut ProcessState<'_>) -> Outcome {
        let budget = state.max_loops.saturating_mul(state.lines().len().max(1));
        let mut jumps = 0_usize;
        let mut ix = 0;
        while let Some(rule) = self.rules.get(ix) {
            let before = state.cursor;
            let target = rule.apply(state);
            self.log.debug(&format!(
                "{ix:03}: {} {rule} {before} => {}",
                if state.success { "success" } else { "error" },
                state.cursor
            ));
            ix += 1;
            let mut next = target.map(str::to_string);
            if rule.label().is_none() {
                match rule.flow.reaction(state.success) {
                    Reaction::Continue => {}
                    Reaction::Stop => return Outcome::Stopped,
                    Reaction::Error => {
                        self.log
                            .error(&format!("rule {} ({rule}) stopped with error", ix - 1));
                        return Outcome::Aborted(AbortReason::ErrorReaction { rule: ix - 1 });
                    }
                    Reaction::Jump(label) => next = Some(label.clone()),
                }
            }
            if let Some(label) = next {
                let Some(&target_ix) = self.labels.get(&label) else {
                    self.log.error(&format!("unknown label %{label}%"));
                    return Outcome::Aborted(AbortReason::ErrorReaction { rule: ix - 1 });
                };
                jumps += 1;
                if jumps > budget {
                    self.log.error(&format!("too many loops: more than {budget} jumps"));
                    return Outcome::Aborted(AbortReason::LoopLimit);
                }
                ix = target_ix + 1;
            }
        }
        Outcome::Completed
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{MemoryLog, MockLog};
    use crate::rules::{Position, RegisterName};

    fn list(input: &str) -> SearchRuleList {
        let mut list = SearchRuleList::new(Arc::new(MemoryLog::new()));
        list.parse(input);
        list.check();
        list
    }

    /// Apply `rules` to `content`; returns the outcome, the final lines and
    /// the content of register `A`.
    fn run(content: &str, rules: &str) -> (Outcome, Vec<String>, String, bool) {
        let list = list(rules);
        assert_eq!(list.error_count(), 0, "{:?}", list.errors().collect::<Vec<_>>());
        let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
        let range = (Position::default(), Position::end_of(&lines));
        let log = MemoryLog::new();
        let mut out = Vec::new();
        let mut state = ProcessState::new(&mut lines, range, Position::default(), &log, &mut out);
        let outcome = list.apply(&mut state);
        let register = state.register(RegisterName::new('A').unwrap()).to_string();
        let success = state.success;
        (outcome, lines, register, success)
    }

    #[test]
    fn parse_and_check_are_idempotent() {
        let input = "%top%: >/x/ error:%end% -1:0 jump:%top% %end%:";
        let mut first = list(input);
        let labels = first.labels().clone();
        assert!(first.check());
        assert_eq!(first.labels(), &labels);
        let second = list(input);
        assert_eq!(second.len(), first.len());
        assert_eq!(second.labels(), &labels);
    }

    #[test]
    fn check_reports_unknown_and_duplicate_labels() {
        let mut rules = SearchRuleList::new(Arc::new(MemoryLog::new()));
        assert!(rules.parse(">/x/ success:%nowhere% jump:%gone% %a%: %a%:"));
        assert!(!rules.check());
        assert_eq!(rules.error_count(), 3);
        assert!(!rules.check());
        assert_eq!(rules.error_count(), 3);
    }

    #[test]
    fn parse_errors_are_logged_once_each() {
        let mut log = MockLog::new();
        log.expect_error().times(2).return_const(());
        let mut rules = SearchRuleList::new(Arc::new(log));
        assert!(!rules.parse("swap-A group-x-A bof"));
        assert_eq!(rules.error_count(), 2);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn stop_reaction_ends_without_error() {
        let (outcome, _, register, _) = run("abc", r#">/b/ success:stop set-A:"late""#);
        assert_eq!(outcome, Outcome::Stopped);
        assert_eq!(register, "");
    }

    #[test]
    fn error_reaction_aborts_without_rollback() {
        let (outcome, lines, _, _) = run("abc", r#"insert:"x" >/zzz/ insert:"y""#);
        assert_eq!(outcome, Outcome::Aborted(AbortReason::ErrorReaction { rule: 1 }));
        assert_eq!(lines, vec!["xabc"]);
    }

    #[test]
    fn error_continue_keeps_going() {
        let (outcome, _, register, success) =
            run("abc", r#">/zzz/ error:continue set-A:"reached""#);
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(register, "reached");
        assert!(success);
    }

    #[test]
    fn labels_do_not_reset_success() {
        let (outcome, _, _, success) = run("abc", ">/zzz/ error:%end% %end%:");
        assert_eq!(outcome, Outcome::Completed);
        assert!(!success);
    }

    #[test]
    fn loop_counts_lines() {
        let rules = r#"set-A:"0" %loop%: >/x/ error:%done% expr-A:"+1" +0:+1 jump:%loop% %done%:"#;
        let (outcome, _, register, _) = run("x..x\n.x", rules);
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(register, "3");
    }

    #[test]
    fn endless_loop_hits_guard() {
        let (outcome, _, _, _) = run("a\nb", "%again%: bof jump:%again%");
        assert_eq!(outcome, Outcome::Aborted(AbortReason::LoopLimit));
    }
}
