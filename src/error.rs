//! Domain-specific error types for sysedit.
//!
//! Internal modules return typed errors (e.g. [`TextError`], [`FormError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! Rule parse errors are not part of this hierarchy: they are collected by
//! [`SearchRuleList`](crate::rules::SearchRuleList) and only logged.
//!
//! # Error hierarchy
//!
//! ```text
//! SyseditError
//! ├── Text(TextError)         file I/O, backup rename, invalid regex
//! ├── Form(FormError)         adapt-variables forms
//! ├── Range(RangeError)       replace-range
//! └── Settings(SettingsError) config.toml
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for sysedit.
#[derive(Error, Debug)]
pub enum SyseditError {
    /// Reading, writing or searching a text buffer failed.
    #[error("Text error: {0}")]
    Text(#[from] TextError),

    /// An adapt-variables form is unusable.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// A replace-range request could not be carried out.
    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    /// The settings file is unreadable or invalid.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors of the text processor.
#[derive(Error, Debug)]
pub enum TextError {
    /// A file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The existing file could not be renamed to its backup name.
    #[error("cannot rename {from} => {to}: {source}")]
    Backup {
        /// Original file.
        from: PathBuf,
        /// Backup name.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A pattern is not a valid regular expression.
    #[error("invalid regular expression '{pattern}': {source}")]
    Regex {
        /// The offending pattern.
        pattern: String,
        /// Compiler error.
        source: regex::Error,
    },

    /// A write was requested but no file name is known.
    #[error("no file name given")]
    NoFileName,
}

impl TextError {
    /// Wrap a regex compile error together with its pattern.
    pub(crate) fn regex(pattern: &str, source: regex::Error) -> Self {
        Self::Regex {
            pattern: pattern.to_string(),
            source,
        }
    }
}

/// Errors of adapt-variables forms.
#[derive(Error, Debug)]
pub enum FormError {
    /// The form file could not be read.
    #[error("cannot read form {path}: {source}")]
    Io {
        /// Form file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The form is not valid JSON or has the wrong shape.
    #[error("invalid form {path}: {source}")]
    Json {
        /// Form file.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },

    /// A `%(NAME)` placeholder names no variable.
    #[error("unknown variable %({name}) in '{text}'")]
    UnknownVariable {
        /// The placeholder name.
        name: String,
        /// Text containing the placeholder.
        text: String,
    },

    /// A rule is not `VAR|VALUE` or `VAR|VALUE|ANCHOR`.
    #[error("invalid rule '{rule}' for {file}: expected VARIABLE|VALUE[|ANCHOR]")]
    InvalidRule {
        /// File the rule belongs to.
        file: String,
        /// The offending rule.
        rule: String,
    },

    /// A rule's anchor is not a valid regular expression.
    #[error("invalid anchor '{anchor}' in rule for {file}: {source}")]
    InvalidAnchor {
        /// File the rule belongs to.
        file: String,
        /// The offending anchor.
        anchor: String,
        /// Compiler error.
        source: regex::Error,
    },
}

/// Errors of replace-range.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    /// No line matches the anchor.
    #[error("missing anchor: {0}")]
    MissingAnchor(String),

    /// No start match after the anchor.
    #[error("missing start \"{0}\"")]
    MissingStart(String),

    /// No end match after the start.
    #[error("missing end \"{0}\"")]
    MissingEnd(String),

    /// The replacement has fewer than the required characters.
    #[error("replacement is shorter than {min_length} characters: {length}")]
    TooShort {
        /// Character count of the replacement.
        length: usize,
        /// Required minimum.
        min_length: usize,
    },

    /// A start or end pattern is empty.
    #[error("{0} must not be empty")]
    EmptyPattern(&'static str),

    /// Neither `--replacement` nor `--file` was given.
    #[error("missing --replacement or --file")]
    NoReplacement,

    /// Both `--replacement` and `--file` were given.
    #[error("only one option is allowed: --replacement or --file")]
    ConflictingReplacement,
}

/// Errors loading `config.toml`.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("IO error reading settings file {path}: {source}")]
    Io {
        /// Settings file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`](crate::config::Settings).
    #[error("invalid settings file {path}: {source}")]
    Parse {
        /// Settings file.
        path: PathBuf,
        /// Parser error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::io;

    // -----------------------------------------------------------------------
    // TextError
    // -----------------------------------------------------------------------

    #[test]
    fn text_error_read_display_and_source() {
        let e = TextError::Read {
            path: PathBuf::from("/etc/hosts"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(e.to_string(), "cannot read /etc/hosts: permission denied");
        assert!(e.source().is_some());
    }

    #[test]
    fn text_error_regex_keeps_pattern() {
        let source = regex::Regex::new("(").expect_err("unbalanced group");
        let e = TextError::regex("(", source);
        assert!(e.to_string().starts_with("invalid regular expression '('"));
    }

    // -----------------------------------------------------------------------
    // FormError
    // -----------------------------------------------------------------------

    #[test]
    fn form_error_unknown_variable_display() {
        let e = FormError::UnknownVariable {
            name: "VERSION".to_string(),
            text: "/etc/php/%(VERSION)".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "unknown variable %(VERSION) in '/etc/php/%(VERSION)'"
        );
    }

    #[test]
    fn form_error_invalid_rule_display() {
        let e = FormError::InvalidRule {
            file: "php.ini".to_string(),
            rule: "memory_limit".to_string(),
        };
        assert!(e.to_string().contains("expected VARIABLE|VALUE[|ANCHOR]"));
    }

    // -----------------------------------------------------------------------
    // RangeError
    // -----------------------------------------------------------------------

    #[test]
    fn range_error_display() {
        assert_eq!(
            RangeError::MissingStart("```".to_string()).to_string(),
            "missing start \"```\""
        );
        assert_eq!(
            RangeError::TooShort {
                length: 1,
                min_length: 3
            }
            .to_string(),
            "replacement is shorter than 3 characters: 1"
        );
        assert_eq!(RangeError::EmptyPattern("end").to_string(), "end must not be empty");
    }

    // -----------------------------------------------------------------------
    // SyseditError
    // -----------------------------------------------------------------------

    #[test]
    fn sysedit_error_from_range_error() {
        let e: SyseditError = RangeError::NoReplacement.into();
        assert!(matches!(e, SyseditError::Range(_)));
        assert_eq!(e.to_string(), "Range error: missing --replacement or --file");
    }

    #[test]
    fn sysedit_error_from_settings_error() {
        let e: SyseditError = SettingsError::Io {
            path: PathBuf::from("config.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        }
        .into();
        assert!(e.to_string().starts_with("Settings error: IO error reading settings file"));
    }

    #[test]
    fn sysedit_error_converts_to_anyhow() {
        let e: SyseditError = TextError::NoFileName.into();
        let any: anyhow::Error = e.into();
        assert!(any.to_string().contains("no file name given"));
    }
}
