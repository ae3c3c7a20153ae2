// Shared helpers for integration tests.
//
// Provides a temporary directory for the edited files and builds the
// `CommandSetup` each command handler expects.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sysedit_cli::commands::CommandSetup;
use sysedit_cli::config::Settings;
use sysedit_cli::logging::{EditEntry, EditStatus, Logger};

/// An isolated working directory backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding the files under test.
    pub root: tempfile::TempDir,
    dry_run: bool,
    backup: Option<String>,
}

impl IntegrationTestContext {
    /// Create a new, empty context.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
            dry_run: false,
            backup: None,
        }
    }

    /// Path of `name` inside the context.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Write `content` to `name` and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("write test file");
        path
    }

    /// Read `name` back.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("read test file")
    }

    /// Whether `name` exists.
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// A fresh command setup with default settings.
    pub fn setup(&self) -> CommandSetup {
        CommandSetup {
            settings: Settings::default(),
            dry_run: self.dry_run,
            backup: self.backup.clone(),
            log: Arc::new(Logger::new("test")),
        }
    }

    /// Root path of the context.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `name` before the test runs.
    pub fn with_file(self, name: &str, content: &str) -> Self {
        self.ctx.write(name, content);
        self
    }

    /// Run commands in dry-run mode.
    pub const fn dry_run(mut self) -> Self {
        self.ctx.dry_run = true;
        self
    }

    /// Back up written files with `extension`.
    pub fn with_backup(mut self, extension: &str) -> Self {
        self.ctx.backup = Some(extension.to_string());
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

/// Statuses of the recorded edits in order.
pub fn statuses(setup: &CommandSetup) -> Vec<EditStatus> {
    setup
        .log
        .edit_entries()
        .iter()
        .map(|entry: &EditEntry| entry.status)
        .collect()
}
