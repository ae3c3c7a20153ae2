pub mod adapt_variables;
pub mod describe;
pub mod example;
pub mod replace;
pub mod replace_range;
pub mod rules;
pub mod upsert;
pub mod version;

use anyhow::Result;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::logging::{EditStatus, Log, Logger};
use crate::text::TextProcessor;

/// Shared state produced by the common command setup sequence.
///
/// Loads the settings and resolves the backup extension so that each
/// file-editing command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded settings.
    pub settings: Settings,
    /// Preview only.
    pub dry_run: bool,
    /// `--backup`, or the settings' `backup_extension`.
    pub backup: Option<String>,
    /// The run's logger.
    pub log: Arc<Logger>,
}

impl CommandSetup {
    /// Load the settings named by `global`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but is invalid.
    pub fn init(global: &GlobalOpts, log: Arc<Logger>) -> Result<Self> {
        let settings = Settings::resolve(global.config.as_deref())?;
        log.debug(&format!(
            "settings: max_loops={} default_min_length={} backup_extension={:?}",
            settings.max_loops, settings.default_min_length, settings.backup_extension
        ));
        let backup = global
            .backup
            .clone()
            .or_else(|| settings.backup_extension.clone());
        if global.dry_run {
            log.dry_run("dry run: no file will be written");
        }
        Ok(Self {
            settings,
            dry_run: global.dry_run,
            backup,
            log,
        })
    }

    /// The logger as an injectable [`Log`] handle.
    #[must_use]
    pub fn log_handle(&self) -> Arc<dyn Log> {
        Arc::clone(&self.log) as Arc<dyn Log>
    }

    /// A processor logging to this run's logger.
    #[must_use]
    pub fn processor(&self) -> TextProcessor {
        TextProcessor::new(self.log_handle())
    }

    /// Load `path` into a new processor.
    ///
    /// Returns `Ok(None)` after recording a failed edit if the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(&self, path: &Path) -> Result<Option<TextProcessor>> {
        let mut processor = self.processor();
        if processor.read_file(path, true)? {
            Ok(Some(processor))
        } else {
            self.log
                .record_edit(&path.display().to_string(), EditStatus::Failed, Some("not found"));
            Ok(None)
        }
    }

    /// Write the processor's buffer to `path` if `changed`, honouring dry
    /// run and backup, and record the edit with `detail`.
    pub fn persist(
        &self,
        processor: &TextProcessor,
        path: &Path,
        changed: bool,
        detail: Option<&str>,
    ) {
        let name = path.display().to_string();
        let status = if !changed {
            EditStatus::Unchanged
        } else if self.dry_run {
            self.log.dry_run(&format!("would write {name}"));
            EditStatus::DryRun
        } else {
            match processor.write_file(Some(path), self.backup.as_deref()) {
                Ok(()) => EditStatus::Changed,
                Err(e) => {
                    self.log.error(&e.to_string());
                    self.log.record_edit(&name, EditStatus::Failed, Some(&e.to_string()));
                    return;
                }
            }
        };
        self.log.record_edit(&name, status, detail);
    }

    /// Print the summary and bail if any edit failed.
    ///
    /// # Errors
    ///
    /// Returns an error if one or more edits recorded a failure.
    pub fn finish(&self) -> Result<()> {
        self.log.print_summary();
        let count = self.log.failure_count();
        if count > 0 {
            anyhow::bail!("{count} file(s) failed");
        }
        Ok(())
    }
}

/// Write `text` to stdout.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn print(text: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Print completions for `shell` to stdout.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory as _;
    let mut command = crate::cli::Cli::command();
    clap_complete::generate(shell, &mut command, "sysedit", &mut std::io::stdout());
}
