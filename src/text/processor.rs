//! The text processor: a line buffer with file I/O, standalone regex passes
//! and the rule-engine entry point.
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use super::backup::backup_path;
use super::replace::ReplaceOptions;
use crate::error::TextError;
use crate::logging::Log;
use crate::rules::{Edit, Markers, Outcome, Position, ProcessState, Registers, SearchRuleList};

/// Snapshot of a [`ProcessState`] after [`TextProcessor::execute_rules`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// How the rule list ended.
    pub outcome: Outcome,
    /// `success` of the last executed rule.
    pub success: bool,
    /// Final cursor.
    pub cursor: Position,
    /// Final registers.
    pub registers: Registers,
    /// Final markers.
    pub markers: Markers,
    /// Whether the buffer changed.
    pub has_changed: bool,
    /// Hit count of the last replace.
    pub hits: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "outcome: {}", self.outcome)?;
        writeln!(f, "success: {}", self.success)?;
        writeln!(f, "cursor: {}", self.cursor)?;
        writeln!(f, "changed: {}", self.has_changed)?;
        writeln!(f, "hits: {}", self.hits)?;
        for (name, position) in &self.markers {
            writeln!(f, "marker {name}: {position}")?;
        }
        for (name, value) in &self.registers {
            writeln!(f, "register {name}: {value:?}")?;
        }
        Ok(())
    }
}

/// Result of [`TextProcessor::insert_or_replace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineChange {
    /// The key line already had the wanted content.
    Unchanged {
        /// Index of the key line.
        index: usize,
    },
    /// The key line was overwritten.
    Replaced {
        /// Index of the key line.
        index: usize,
        /// Its previous content.
        old: String,
    },
    /// No key line existed; the line was inserted.
    Inserted {
        /// Index of the new line.
        index: usize,
    },
}

/// Result of [`TextProcessor::adapt_variable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableChange {
    /// The variable already had the value.
    Unchanged,
    /// The value was replaced.
    Changed {
        /// The previous value.
        old: String,
    },
}

/// A line buffer with an optional file name, a cursor and a search range.
///
/// All log output goes to the injected [`Log`]; `print` commands of rule
/// lists write to the output sink (stdout unless replaced with
/// [`with_output`](Self::with_output)).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sysedit_cli::logging::MemoryLog;
/// use sysedit_cli::rules::Position;
/// use sysedit_cli::text::TextProcessor;
///
/// let mut processor = TextProcessor::new(Arc::new(MemoryLog::new()));
/// processor.set_content("abc\nHello World!\nHi!");
/// assert!(processor.execute_rules("eof;</O/ie"));
/// assert_eq!(processor.cursor(), Position::new(1, 8));
/// ```
pub struct TextProcessor {
    lines: Vec<String>,
    filename: Option<PathBuf>,
    cursor: Position,
    start_range: Position,
    end_range: Position,
    has_changed: bool,
    max_loops: usize,
    summary: Option<RunSummary>,
    log: Arc<dyn Log>,
    output: Box<dyn Write + Send>,
}

impl fmt::Debug for TextProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextProcessor")
            .field("lines", &self.lines.len())
            .field("filename", &self.filename)
            .field("cursor", &self.cursor)
            .field("start_range", &self.start_range)
            .field("end_range", &self.end_range)
            .field("has_changed", &self.has_changed)
            .field("max_loops", &self.max_loops)
            .finish_non_exhaustive()
    }
}

/// Split `content` into lines, dropping the `\r` of `\r\n` endings.
fn split_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

impl TextProcessor {
    /// An empty processor logging to `log` and printing to stdout.
    #[must_use]
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self {
            lines: Vec::new(),
            filename: None,
            cursor: Position::default(),
            start_range: Position::default(),
            end_range: Position::default(),
            has_changed: false,
            max_loops: ProcessState::DEFAULT_MAX_LOOPS,
            summary: None,
            log,
            output: Box::new(io::stdout()),
        }
    }

    /// Replace the sink of `print` commands.
    #[must_use]
    pub fn with_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = output;
        self
    }

    /// Change the loop guard factor used by [`execute_rules`](Self::execute_rules).
    pub const fn set_max_loops(&mut self, max_loops: usize) {
        self.max_loops = max_loops;
    }

    /// The buffer.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The buffer joined with `\n`.
    #[must_use]
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    /// The file last read, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// The cursor, kept across [`execute_rules`](Self::execute_rules) calls.
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor.
    pub const fn set_cursor(&mut self, cursor: Position) {
        self.cursor = cursor;
    }

    /// Whether any operation changed the buffer since it was loaded.
    #[must_use]
    pub const fn has_changed(&self) -> bool {
        self.has_changed
    }

    /// The state snapshot of the last [`execute_rules`](Self::execute_rules) run.
    #[must_use]
    pub const fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    fn reset_positions(&mut self) {
        self.start_range = Position::default();
        self.end_range = Position::end_of(&self.lines);
        self.cursor = Position::default();
        self.has_changed = false;
        self.summary = None;
    }

    // ------------------------------------------------------------------
    // Buffer input and output
    // ------------------------------------------------------------------

    /// Load `path` into the buffer.
    ///
    /// Line endings are normalised to `\n`. Returns `Ok(false)` and leaves
    /// the buffer empty if the file does not exist; with `must_exist` the
    /// miss is also logged as an error.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Read`] for any other I/O error.
    pub fn read_file(&mut self, path: &Path, must_exist: bool) -> Result<bool, TextError> {
        self.filename = Some(path.to_path_buf());
        match fs::read_to_string(path) {
            Ok(content) => {
                self.lines = split_lines(&content);
                self.reset_positions();
                self.log.debug(&format!("read {}: {} lines", path.display(), self.lines.len()));
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if must_exist {
                    self.log.error(&format!("{} does not exist", path.display()));
                }
                self.lines.clear();
                self.reset_positions();
                Ok(false)
            }
            Err(source) => Err(TextError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Replace the buffer by `content` split at `\n` or `\r\n`.
    pub fn set_content(&mut self, content: &str) {
        self.lines = split_lines(content);
        self.reset_positions();
    }

    /// Replace the buffer by `lines`.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.reset_positions();
    }

    /// Write the buffer to `path`, or to the file last read.
    ///
    /// With `backup`, an existing file is first renamed to its backup name
    /// (see [`backup_path`]). Rename and write are not atomic.
    ///
    /// # Errors
    ///
    /// Returns [`TextError`] if no path is known, the rename fails or the
    /// write fails.
    pub fn write_file(&self, path: Option<&Path>, backup: Option<&str>) -> Result<(), TextError> {
        let path = path
            .or(self.filename.as_deref())
            .ok_or(TextError::NoFileName)?;
        if let Some(extension) = backup
            && path.exists()
        {
            let target = backup_path(path, extension, chrono::Local::now());
            self.log
                .info(&format!("renaming {} => {}", path.display(), target.display()));
            fs::rename(path, &target).map_err(|source| TextError::Backup {
                from: path.to_path_buf(),
                to: target.clone(),
                source,
            })?;
        }
        fs::write(path, self.content()).map_err(|source| TextError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Narrow the range where rule cursors are valid.
    pub const fn set_range(&mut self, start: Position, end: Position) {
        self.start_range = start;
        self.end_range = end;
    }

    // ------------------------------------------------------------------
    // Standalone passes
    // ------------------------------------------------------------------

    fn prefix(&self) -> String {
        self.filename
            .as_ref()
            .map_or_else(String::new, |p| format!("{}-", p.display()))
    }

    /// Substitute `pattern` by `replacement` in every line.
    ///
    /// Returns the number of changed lines, or the number of replacements
    /// with [`ReplaceOptions::count_hits`].
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Regex`] if `pattern` does not compile.
    pub fn replace(
        &mut self,
        pattern: &str,
        replacement: &str,
        options: &ReplaceOptions,
    ) -> Result<usize, TextError> {
        let regex = options.compile(pattern)?;
        let replacement = options.replacement(replacement);
        let prefix = self.prefix();
        let mut total = 0;
        for (ix, line) in self.lines.iter_mut().enumerate() {
            let hits = regex.find_iter(line).count();
            if hits == 0 {
                continue;
            }
            let new = regex.replace_all(line, replacement.as_str()).into_owned();
            self.log
                .debug(&format!("{prefix}{}: {hits} hit(s)\n{line}\n{new}", ix + 1));
            if new != *line {
                *line = new;
                self.has_changed = true;
            }
            total += if options.count_hits { hits } else { 1 };
        }
        if total > 0 {
            self.log.debug(&format!("{prefix}{total} hit(s)"));
        }
        Ok(total)
    }

    /// Replace each `(what, with)` pair literally in every line.
    ///
    /// Returns the total number of replacements.
    pub fn replace_many(&mut self, pairs: &[(&str, &str)]) -> usize {
        let mut total = 0;
        for line in &mut self.lines {
            for (what, with) in pairs {
                if what.is_empty() {
                    continue;
                }
                let hits = line.matches(what).count();
                if hits > 0 {
                    total += hits;
                    *line = line.replace(what, with);
                    self.has_changed = true;
                }
            }
        }
        if total > 0 {
            self.log.debug(&format!("{}{total} hit(s)", self.prefix()));
        }
        total
    }

    /// Index of the first line in `first..last` containing a match.
    ///
    /// `last` is exclusive and defaults to the line count.
    #[must_use]
    pub fn find_line(&self, regex: &Regex, first: usize, last: Option<usize>) -> Option<usize> {
        let last = last.map_or(self.lines.len(), |l| l.min(self.lines.len()));
        self.lines
            .get(first..last)?
            .iter()
            .position(|line| regex.is_match(line))
            .map(|ix| ix + first)
    }

    /// Capture group `group` of the first line that matches at its start.
    ///
    /// An unmatched group of a matching line gives `None`.
    #[must_use]
    pub fn search_by_group(&self, regex: &Regex, group: usize) -> Option<String> {
        self.lines
            .iter()
            .find_map(|line| regex.captures(line).filter(|c| c.get(0).is_some_and(|m| m.start() == 0)))
            .and_then(|captures| captures.get(group).map(|m| m.as_str().to_string()))
    }

    /// Replace the line matching `key` by `line`, or insert `line` at
    /// `anchor` (see [`insert_by_anchor`](Self::insert_by_anchor)).
    pub fn insert_or_replace(
        &mut self,
        key: &Regex,
        line: &str,
        anchor: Option<&Regex>,
        above: bool,
    ) -> LineChange {
        let Some(index) = self.find_line(key, 0, None) else {
            let index = self.insert_by_anchor(anchor, line, above);
            return LineChange::Inserted { index };
        };
        match self.lines.get_mut(index) {
            Some(existing) if *existing != line => {
                let old = std::mem::replace(existing, line.to_string());
                self.log
                    .debug(&format!("replacement at {}:\n{old}\n{line}", index + 1));
                self.has_changed = true;
                LineChange::Replaced { index, old }
            }
            _ => {
                self.log
                    .debug(&format!("key found, but same content at {}", index + 1));
                LineChange::Unchanged { index }
            }
        }
    }

    /// Insert `line` below the first line matching `anchor`, or above it
    /// with `above`.
    ///
    /// Without anchor, or when it is not found, the line is appended; a
    /// trailing empty line (the final newline) stays last. The cursor and
    /// the range keep pointing at the same text. Returns the index of the
    /// new line.
    pub fn insert_by_anchor(&mut self, anchor: Option<&Regex>, line: &str, above: bool) -> usize {
        let found = anchor.and_then(|re| self.find_line(re, 0, None));
        let index = match found {
            Some(ix) if above => ix,
            Some(ix) => ix + 1,
            None if self.lines.last().is_some_and(String::is_empty) => self.lines.len() - 1,
            None => self.lines.len(),
        };
        let end_was_eof = self.end_range.line >= self.lines.len();
        self.lines.insert(index, line.to_string());
        let edit = Edit::Inserted {
            at: Position::new(index, 0),
            end: Position::new(index + 1, 0),
        };
        self.cursor = edit.shift(self.cursor);
        if self.start_range.line > index {
            self.start_range = edit.shift(self.start_range);
        }
        self.end_range = if end_was_eof {
            Position::end_of(&self.lines)
        } else {
            edit.shift(self.end_range)
        };
        self.has_changed = true;
        self.log.debug(&format!("insert at {}: {line}", index + 1));
        index
    }

    /// Set `name = value` in the first line defining `name`, keeping the
    /// line's spacing.
    ///
    /// Returns `None` if no line defines the variable.
    pub fn adapt_variable(&mut self, name: &str, value: &str) -> Option<VariableChange> {
        let pattern = format!(r"^(\s*{}\s*=\s*)(.*)$", regex::escape(name));
        let regex = Regex::new(&pattern).ok()?;
        let (index, head, old) = self.lines.iter().enumerate().find_map(|(ix, line)| {
            let captures = regex.captures(line)?;
            let head = captures.get(1)?.as_str().to_string();
            let old = captures.get(2)?.as_str().to_string();
            Some((ix, head, old))
        })?;
        if old == value {
            return Some(VariableChange::Unchanged);
        }
        if let Some(line) = self.lines.get_mut(index) {
            *line = format!("{head}{value}");
        }
        self.has_changed = true;
        self.log.info(&format!("{name}: {old} -> {value}"));
        Some(VariableChange::Changed { old })
    }

    // ------------------------------------------------------------------
    // Rule engine
    // ------------------------------------------------------------------

    /// Parse, check and apply `rules` to the buffer.
    ///
    /// Returns `false` without touching the buffer if the rules have parse
    /// or check errors. Otherwise returns the success of the last rule,
    /// `false` if the run was aborted.
    pub fn execute_rules(&mut self, rules: &str) -> bool {
        let mut list = SearchRuleList::new(Arc::clone(&self.log));
        let parsed = list.parse(rules);
        let checked = list.check();
        if !(parsed && checked) {
            self.log
                .error(&format!("{} error(s) in rules, nothing executed", list.error_count()));
            return false;
        }
        let range = (self.start_range, self.end_range);
        let mut state = ProcessState::new(
            &mut self.lines,
            range,
            self.cursor,
            &*self.log,
            &mut *self.output,
        );
        state.max_loops = self.max_loops;
        let outcome = list.apply(&mut state);
        let summary = RunSummary {
            outcome,
            success: state.success,
            cursor: state.cursor,
            registers: std::mem::take(&mut state.registers),
            markers: std::mem::take(&mut state.markers),
            has_changed: state.has_changed,
            hits: state.last_hits,
        };
        let end_range = state.end_range;
        drop(state);
        if let Err(e) = self.output.flush() {
            self.log.warn(&format!("cannot flush output: {e}"));
        }
        self.cursor = summary.cursor;
        self.end_range = end_range;
        self.has_changed |= summary.has_changed;
        let rc = summary.success && !outcome.is_aborted();
        self.summary = Some(summary);
        rc
    }
}
