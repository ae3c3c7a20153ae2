//! In-memory logger for embedding and tests.
use std::sync::Mutex;

use super::types::{EditEntry, EditStatus, Log};

/// Severity of a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Debug output.
    Debug,
    /// Plain information.
    Info,
    /// Stage header.
    Stage,
    /// Dry-run notice.
    DryRun,
    /// Warning.
    Warn,
    /// Error.
    Error,
}

/// A captured log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity.
    pub level: Level,
    /// The message text.
    pub message: String,
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` with the given [`Level`].
macro_rules! capture_log_methods {
    ($($method:ident => $level:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry {
                        level: Level::$level,
                        message: msg.to_string(),
                    });
                }
            }
        )+
    };
}

/// A [`Log`] that keeps every message and edit in memory.
///
/// Nothing reaches the console or the log file.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
    edits: Mutex<Vec<EditEntry>>,
}

impl MemoryLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Messages captured at `level`.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries.lock().map_or_else(
            |_| vec![],
            |g| {
                g.iter()
                    .filter(|e| e.level == level)
                    .map(|e| e.message.clone())
                    .collect()
            },
        )
    }

    /// Whether any message at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }

    /// All recorded edits in order.
    #[must_use]
    pub fn edits(&self) -> Vec<EditEntry> {
        self.edits.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
        if let Ok(mut guard) = self.edits.lock() {
            guard.clear();
        }
    }
}

impl Log for MemoryLog {
    capture_log_methods!(
        stage => Stage,
        info => Info,
        debug => Debug,
        warn => Warn,
        error => Error,
        dry_run => DryRun,
    );

    fn record_edit(&self, path: &str, status: EditStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.edits.lock() {
            guard.push(EditEntry {
                path: path.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn captures_messages_by_level() {
        let log = MemoryLog::new();
        log.info("reading /etc/fstab");
        log.error("rule 3 failed");
        log.debug("000: success bof");
        assert_eq!(log.entries().len(), 3);
        assert_eq!(log.messages(Level::Error), vec!["rule 3 failed"]);
        assert!(log.contains(Level::Debug, "bof"));
        assert!(!log.contains(Level::Warn, "bof"));
    }

    #[test]
    fn records_edits() {
        let log = MemoryLog::new();
        log.record_edit("a.conf", EditStatus::Changed, Some("2 hits"));
        log.record_edit("b.conf", EditStatus::Unchanged, None);
        let edits = log.edits();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].message.as_deref(), Some("2 hits"));
        assert_eq!(edits[1].status, EditStatus::Unchanged);
    }

    #[test]
    fn clear_drops_everything() {
        let log = MemoryLog::new();
        log.warn("x");
        log.record_edit("a", EditStatus::Failed, None);
        log.clear();
        assert!(log.entries().is_empty());
        assert!(log.edits().is_empty());
    }

    #[test]
    fn usable_through_trait_object() {
        let log = MemoryLog::new();
        let dyn_log: &dyn Log = &log;
        dyn_log.dry_run("would write /etc/hosts");
        assert_eq!(log.messages(Level::DryRun).len(), 1);
    }
}
