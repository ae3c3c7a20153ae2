//! Command: set variables in config files as described by a JSON form.
use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::AdaptVariablesOpts;
use crate::config::AdaptForm;
use crate::logging::EditStatus;
use crate::resources::process_resource;
use crate::resources::variables::ConfigVariables;

/// Adapt every file of the form `opts.form`, in form order.
///
/// # Errors
///
/// Returns an error if the form is invalid, or if any file failed.
pub fn run(setup: &CommandSetup, opts: &AdaptVariablesOpts) -> Result<()> {
    let log = &setup.log;
    let form = AdaptForm::load(&opts.form)
        .with_context(|| format!("loading form {}", opts.form.display()))?;
    if let Some(comment) = &form.comment {
        log.debug(&format!("comment: {comment}"));
    }
    log.stage(&format!(
        "Adapting {} file(s) from {}",
        form.files.len(),
        opts.form.display()
    ));
    for file in form.files {
        let name = file.path.display().to_string();
        let resource = ConfigVariables::from_rules(file, setup.backup.clone(), setup.log_handle());
        match process_resource(&resource, &**log, setup.dry_run, "adapt") {
            Ok((status, message)) => log.record_edit(&name, status, message.as_deref()),
            Err(e) => {
                log.error(&format!("{name}: {e:#}"));
                log.record_edit(&name, EditStatus::Failed, Some(&format!("{e:#}")));
            }
        }
    }
    setup.finish()
}
