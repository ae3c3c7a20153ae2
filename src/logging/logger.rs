//! Structured logger with dry-run awareness and edit summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{EditEntry, EditStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// The `record_edit` method is **not** included because its signature differs
/// from the `fn(&self, &str)` pattern shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and edit summary collection.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/sysedit/<command>.log` (default `~/.cache/sysedit/<command>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    edits: Mutex<Vec<EditEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The log file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber) via
    /// [`FileLayer`](super::subscriber::FileLayer); this constructor does not write to the file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            edits: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded edits.
    #[must_use]
    pub fn edit_entries(&self) -> Vec<EditEntry> {
        self.edits.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "sysedit::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file via the [`FileLayer`](super::subscriber::FileLayer)).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "sysedit::dry_run", "{msg}");
    }

    /// Record a file edit for the summary.
    pub fn record_edit(&self, path: &str, status: EditStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.edits.lock() {
            guard.push(EditEntry {
                path: path.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed edits.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.edits.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|e| e.status == EditStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded edits.
    pub fn print_summary(&self) {
        let edits = self.edit_entries();
        if edits.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut changed = 0u32;
        let mut unchanged = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for edit in &edits {
            match edit.status {
                EditStatus::Changed => changed += 1,
                EditStatus::Unchanged => unchanged += 1,
                EditStatus::DryRun => dry_run += 1,
                EditStatus::Failed => failed += 1,
            }
            let (icon, color) = edit.status.style();
            let suffix = edit
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", edit.path));
        }

        let total = changed + unchanged + dry_run + failed;
        self.info(&format!(
            "{total} files: \x1b[32m{changed} changed\x1b[0m, \x1b[2m{unchanged} unchanged\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_edit(&self, path: &str, status: EditStatus, message: Option<&str>) {
        self.record_edit(path, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.edit_entries().is_empty(), "expected empty edit list");
    }

    #[test]
    fn record_edit_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_edit("/etc/fstab", EditStatus::Changed, Some("2 hits"));
        let edits = log.edit_entries();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].path, "/etc/fstab");
        assert_eq!(edits[0].message, Some("2 hits".to_string()));
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let (log, _tmp, _guard) = isolated_logger();
        assert_eq!(log.failure_count(), 0);
        log.record_edit("a", EditStatus::Changed, None);
        log.record_edit("b", EditStatus::Failed, Some("error 1"));
        log.record_edit("c", EditStatus::Failed, Some("error 2"));
        log.record_edit("d", EditStatus::DryRun, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_edit("via-trait", EditStatus::Unchanged, None);
        assert_eq!(log.edit_entries().len(), 1);
    }

    #[test]
    fn log_file_is_created() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().expect("log path should exist");
        assert!(path.exists(), "log file should be created with the file layer");
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[debug]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn error_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("error-marker-{}", std::process::id());
        log.error(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[error]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn stage_written_to_file_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("stage-marker-{}", std::process::id());
        log.stage(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains(&format!("==> {marker}")));
    }

    #[test]
    fn dry_run_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("dryrun-marker-{}", std::process::id());
        log.dry_run(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[dry run]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn summary_lists_each_edit() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_edit("/etc/a.conf", EditStatus::Changed, None);
        log.record_edit("/etc/b.conf", EditStatus::Failed, Some("denied"));
        log.print_summary();
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("==> Summary"));
        assert!(contents.contains("✗ /etc/b.conf (denied)"));
        assert!(contents.contains("2 files: 1 changed, 0 unchanged, 0 dry-run, 1 failed"));
    }
}
