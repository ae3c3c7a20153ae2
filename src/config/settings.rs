//! User settings loaded from `config.toml`.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::rules::ProcessState;
use crate::text::DEFAULT_MIN_LENGTH;

/// Settings shared by all subcommands.
///
/// Every key is optional; unknown keys are rejected.
///
/// ```toml
/// max_loops = 20
/// backup_extension = ".%date%"
/// default_min_length = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Loop guard factor for rule lists.
    pub max_loops: usize,
    /// Backup extension used when `--backup` is not given.
    pub backup_extension: Option<String>,
    /// Minimum replacement length for `replace-range`.
    pub default_min_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_loops: ProcessState::DEFAULT_MAX_LOOPS,
            backup_extension: None,
            default_min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl Settings {
    /// `$XDG_CONFIG_HOME/sysedit/config.toml` (default `~/.config/sysedit/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join("sysedit").join("config.toml"))
    }

    /// Load settings from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `explicit`, or from [`default_path`](Self::default_path).
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}
