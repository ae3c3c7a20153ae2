//! Command: whole-file regex replacement.
use anyhow::{Context as _, Result};

use super::CommandSetup;
use crate::cli::ReplaceOpts;
use crate::text::ReplaceOptions;

impl From<&ReplaceOpts> for ReplaceOptions {
    fn from(opts: &ReplaceOpts) -> Self {
        Self {
            literal: opts.literal,
            word_only: opts.word,
            ignore_case: opts.ignore_case,
            group_marker: opts.group_marker,
            count_hits: opts.count_hits,
            unescape: opts.unescape,
        }
    }
}

/// Replace `opts.pattern` in every line of `opts.file`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the pattern is invalid.
pub fn run(setup: &CommandSetup, opts: &ReplaceOpts) -> Result<()> {
    setup
        .log
        .stage(&format!("Replacing in {}", opts.file.display()));
    if let Some(mut processor) = setup.open(&opts.file)? {
        let hits = processor
            .replace(&opts.pattern, &opts.replacement, &ReplaceOptions::from(opts))
            .with_context(|| format!("replacing in {}", opts.file.display()))?;
        let unit = if opts.count_hits { "hit(s)" } else { "line(s)" };
        let detail = format!("{hits} {unit}");
        let changed = processor.has_changed();
        setup.persist(&processor, &opts.file, changed, Some(&detail));
    }
    setup.finish()
}
