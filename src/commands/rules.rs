//! Command: execute a rule string on a file.
use anyhow::Result;

use super::{CommandSetup, print};
use crate::cli::RulesOpts;
use crate::logging::EditStatus;

/// Run the rule list of `opts` on its file.
///
/// The file is written only if the rules succeeded and changed it.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if the rules failed.
pub fn run(setup: &CommandSetup, opts: &RulesOpts) -> Result<()> {
    let log = &setup.log;
    log.stage(&format!("Executing rules on {}", opts.file.display()));
    if let Some(mut processor) = setup.open(&opts.file)? {
        processor.set_max_loops(opts.max_loops.unwrap_or(setup.settings.max_loops));
        let success = processor.execute_rules(&opts.rules);
        if opts.show_state
            && let Some(summary) = processor.summary()
        {
            print(&summary.to_string())?;
        }
        if success {
            let changed = processor.has_changed();
            setup.persist(&processor, &opts.file, changed, None);
        } else {
            let reason = match processor.summary() {
                None => "invalid rules".to_string(),
                Some(summary) if summary.outcome.is_aborted() => summary.outcome.to_string(),
                Some(_) => "last rule failed".to_string(),
            };
            log.error(&format!("{}: {reason}, nothing written", opts.file.display()));
            log.record_edit(
                &opts.file.display().to_string(),
                EditStatus::Failed,
                Some(&reason),
            );
        }
    }
    setup.finish()
}
