//! Command: print version information.
use anyhow::Result;

/// The version embedded by the build script, or the package version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("SYSEDIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the sysedit version to stdout.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn run() -> Result<()> {
    super::print(&format!("sysedit {}", version()))
}
