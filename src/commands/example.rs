//! Command: print an example adapt-variables form.
use anyhow::{Context as _, Result};

use super::print;
use crate::cli::ExampleOpts;
use crate::config::EXAMPLE_FORM;

/// Print [`EXAMPLE_FORM`], or write it to `opts.file`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn run(opts: &ExampleOpts) -> Result<()> {
    match &opts.file {
        Some(path) => std::fs::write(path, EXAMPLE_FORM)
            .with_context(|| format!("writing {}", path.display())),
        None => print(EXAMPLE_FORM),
    }
}
