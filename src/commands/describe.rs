//! Command: print the rule language reference.
use anyhow::Result;

/// Print [`describe`](crate::rules::describe) to stdout.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn run() -> Result<()> {
    super::print(crate::rules::describe())
}
