//! Command: replace the text between two delimiters of a document.
use anyhow::Result;
use regex::Regex;
use std::path::Path;

use super::CommandSetup;
use crate::cli::ReplaceRangeOpts;
use crate::error::{RangeError, SyseditError, TextError};
use crate::logging::EditStatus;
use crate::text::{RangeOptions, replace_range};

fn compile(pattern: &str) -> Result<Regex, TextError> {
    Regex::new(pattern).map_err(|e| TextError::regex(pattern, e))
}

fn read(path: &Path) -> Result<String, TextError> {
    std::fs::read_to_string(path).map_err(|source| TextError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// The replacement text named by `--replacement` or `--file`.
fn replacement(opts: &ReplaceRangeOpts) -> Result<String, SyseditError> {
    match (&opts.replacement, &opts.file) {
        (Some(_), Some(_)) => Err(RangeError::ConflictingReplacement.into()),
        (None, None) => Err(RangeError::NoReplacement.into()),
        (Some(text), None) if opts.newline => Ok(format!("{text}\n")),
        (Some(text), None) => Ok(text.clone()),
        (None, Some(path)) => Ok(read(path)?),
    }
}

/// Build the range options of `opts`; `min_length` applies when
/// `--min-length` is absent.
fn options(opts: &ReplaceRangeOpts, min_length: usize) -> Result<RangeOptions, SyseditError> {
    if opts.start.is_empty() {
        return Err(RangeError::EmptyPattern("start").into());
    }
    if opts.end.is_empty() {
        return Err(RangeError::EmptyPattern("end").into());
    }
    let optional = |pattern: Option<&str>| pattern.filter(|p| !p.is_empty()).map(compile).transpose();
    let mut options = RangeOptions::new(compile(&opts.start)?, compile(&opts.end)?);
    options.anchor = optional(opts.anchor.as_deref())?;
    options.min_length = opts.min_length.unwrap_or(min_length);
    options.insertion.clone_from(&opts.insertion);
    options.insertion_position = optional(opts.insertion_position.as_deref())?;
    Ok(options)
}

/// Replace the range of `opts.document`.
///
/// # Errors
///
/// Returns an error if the arguments are inconsistent, a regex is invalid,
/// or a file cannot be read. A range that cannot be located is recorded
/// as a failed edit.
pub fn run(setup: &CommandSetup, opts: &ReplaceRangeOpts) -> Result<()> {
    let replacement = replacement(opts)?;
    let options = options(opts, setup.settings.default_min_length)?;
    let log = &setup.log;
    let name = opts.document.display().to_string();
    log.stage(&format!("Replacing range in {name}"));
    let document = read(&opts.document)?;
    match replace_range(&document, &replacement, &options) {
        Ok((content, report)) => {
            log.info(&report.to_string());
            let mut processor = setup.processor();
            processor.set_content(&content);
            setup.persist(
                &processor,
                &opts.document,
                report.changed(),
                Some(&report.to_string()),
            );
        }
        Err(e) => {
            log.error(&format!("{name}: {e}"));
            log.record_edit(&name, EditStatus::Failed, Some(&e.to_string()));
        }
    }
    setup.finish()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::Parser as _;

    fn parse(args: &[&str]) -> ReplaceRangeOpts {
        let mut argv = vec!["replace-range", "doc.md"];
        argv.extend_from_slice(args);
        ReplaceRangeOpts::parse_from(argv)
    }

    #[test]
    fn replacement_sources_are_exclusive() {
        assert!(matches!(
            replacement(&parse(&[])).unwrap_err(),
            SyseditError::Range(RangeError::NoReplacement)
        ));
        assert!(matches!(
            replacement(&parse(&["-r", "x", "-f", "y"])).unwrap_err(),
            SyseditError::Range(RangeError::ConflictingReplacement)
        ));
        assert_eq!(replacement(&parse(&["-r", "abc", "-n"])).unwrap(), "abc\n");
    }

    #[test]
    fn empty_start_is_rejected() {
        assert!(matches!(
            options(&parse(&["-r", "x", "--start", ""]), 3).unwrap_err(),
            SyseditError::Range(RangeError::EmptyPattern("start"))
        ));
    }

    #[test]
    fn min_length_falls_back_to_settings() {
        assert_eq!(options(&parse(&["-r", "x"]), 7).unwrap().min_length, 7);
        assert_eq!(
            options(&parse(&["-r", "x", "-m", "1"]), 7).unwrap().min_length,
            1
        );
    }

    #[test]
    fn invalid_anchor_is_a_regex_error() {
        assert!(matches!(
            options(&parse(&["-r", "x", "-a", "("]), 3).unwrap_err(),
            SyseditError::Text(TextError::Regex { .. })
        ));
    }
}
