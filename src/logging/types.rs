//! Core logging types: edit entries, status, and the [`Log`] trait.

/// One file edit, collected for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEntry {
    /// Path of the edited file as given on the command line.
    pub path: String,
    /// Final status of the edit.
    pub status: EditStatus,
    /// Optional detail (e.g. hit count or error description).
    pub message: Option<String>,
}

/// Outcome of editing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    /// The file content changed and was written.
    Changed,
    /// The file already had the desired content.
    Unchanged,
    /// The file would have changed; nothing was written.
    DryRun,
    /// The edit could not be completed.
    Failed,
}

impl EditStatus {
    /// Summary icon and ANSI colour for this status.
    #[must_use]
    pub const fn style(self) -> (&'static str, &'static str) {
        match self {
            Self::Changed => ("✓", "\x1b[32m"),
            Self::Unchanged => ("·", "\x1b[2m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) forwards to `tracing` for the CLI and
/// [`MemoryLog`](super::memory::MemoryLog) keeps everything in memory, so the
/// rule engine and the text processor log without knowing where output goes.
#[cfg_attr(test, mockall::automock)]
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a file edit for the summary.
    fn record_edit<'a>(&self, path: &str, status: EditStatus, message: Option<&'a str>);
}
