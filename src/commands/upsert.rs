//! Command: replace the line matching a key, or insert it.
use anyhow::{Context as _, Result};
use regex::Regex;

use super::CommandSetup;
use crate::cli::UpsertOpts;
use crate::text::LineChange;

fn compile(pattern: &str, what: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("invalid {what} regex: {pattern}"))
}

/// Make sure `opts.file` contains `opts.line`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a regex is invalid.
pub fn run(setup: &CommandSetup, opts: &UpsertOpts) -> Result<()> {
    let key = compile(&opts.key, "key")?;
    let anchor = opts
        .anchor
        .as_deref()
        .map(|pattern| compile(pattern, "anchor"))
        .transpose()?;
    setup
        .log
        .stage(&format!("Upserting into {}", opts.file.display()));
    if let Some(mut processor) = setup.open(&opts.file)? {
        let change = processor.insert_or_replace(&key, &opts.line, anchor.as_ref(), opts.above);
        let detail = match change {
            LineChange::Unchanged { index } => format!("line {} already set", index + 1),
            LineChange::Replaced { index, .. } => format!("replaced line {}", index + 1),
            LineChange::Inserted { index } => format!("inserted at line {}", index + 1),
        };
        let changed = processor.has_changed();
        setup.persist(&processor, &opts.file, changed, Some(&detail));
    }
    setup.finish()
}
