//! Options and helpers for whole-buffer replacement.
use regex::{Regex, RegexBuilder};

use super::unescape::unescape;
use crate::error::TextError;
use crate::rules::translate_replacement;

/// How [`TextProcessor::replace`](super::TextProcessor::replace) interprets
/// its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReplaceOptions {
    /// The pattern is plain text, not a regex.
    pub literal: bool,
    /// Only whole words match (`\b…\b`).
    pub word_only: bool,
    /// Case-insensitive matching.
    pub ignore_case: bool,
    /// This character stands for `\` in the replacement, so `%1` with
    /// marker `%` refers to group 1.
    pub group_marker: Option<char>,
    /// Count replacements instead of changed lines.
    pub count_hits: bool,
    /// Decode backslash escapes in the replacement.
    pub unescape: bool,
}

impl ReplaceOptions {
    /// Compile `pattern` according to the options.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Regex`] if the pattern does not compile.
    pub fn compile(&self, pattern: &str) -> Result<Regex, TextError> {
        let source = if self.literal {
            regex::escape(pattern)
        } else {
            pattern.to_string()
        };
        let source = if self.word_only {
            format!(r"\b{source}\b")
        } else {
            source
        };
        RegexBuilder::new(&source)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|e| TextError::regex(pattern, e))
    }

    /// The replacement in `regex` crate syntax.
    ///
    /// Literal replacements are escaped so that `$` stays `$`.
    #[must_use]
    pub fn replacement(&self, replacement: &str) -> String {
        let text = if self.unescape {
            unescape(replacement)
        } else {
            replacement.to_string()
        };
        if self.literal {
            return text.replace('$', "$$");
        }
        let text = match self.group_marker {
            Some(marker) => text.replace(marker, "\\"),
            None => text,
        };
        translate_replacement(&text)
    }
}
