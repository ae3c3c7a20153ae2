//! Replace the text between two regex matches of a document.
use std::fmt;

use regex::Regex;

use crate::error::RangeError;

/// Default start and end delimiter.
pub const DEFAULT_DELIMITER: &str = "```";
/// Default minimum replacement length in characters.
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Where the range is and what to do when it is missing.
#[derive(Debug, Clone)]
pub struct RangeOptions {
    /// Lines up to and including the first match are skipped.
    pub anchor: Option<Regex>,
    /// The range starts behind the first match after the anchor.
    pub start: Regex,
    /// The range ends before the next match behind the start.
    pub end: Regex,
    /// Shortest allowed replacement.
    pub min_length: usize,
    /// Line inserted when `start` is not found.
    pub insertion: Option<String>,
    /// The insertion goes behind the first line matching this.
    pub insertion_position: Option<Regex>,
}

impl RangeOptions {
    /// Options with the given `start` and `end`, no anchor and the default
    /// minimum length.
    #[must_use]
    pub const fn new(start: Regex, end: Regex) -> Self {
        Self {
            anchor: None,
            start,
            end,
            min_length: DEFAULT_MIN_LENGTH,
            insertion: None,
            insertion_position: None,
        }
    }
}

/// What [`replace_range`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeReport {
    /// The range already held the replacement.
    Equal,
    /// A single line was replaced by a single line.
    Characters {
        /// Old character count.
        old: usize,
        /// New character count.
        new: usize,
    },
    /// Multi-line replacement.
    Lines {
        /// Old line count.
        old: usize,
        /// New line count.
        new: usize,
    },
    /// `start` was missing; the insertion line went in at this line index.
    Inserted {
        /// Index of the inserted line.
        index: usize,
    },
}

impl RangeReport {
    /// Whether the document changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::Equal)
    }
}

impl fmt::Display for RangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => f.write_str("new and old content are equal. Nothing changed."),
            Self::Characters { old, new } => {
                write!(f, "{old} characters have been replaced by {new} characters")
            }
            Self::Lines { old, new } => write!(f, "{old} lines have been replaced by {new} lines"),
            Self::Inserted { index } => write!(f, "insertion at line {}", index + 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Looking for the anchor.
    Top,
    /// Looking for the start.
    Anchor,
    /// Inside the range, looking for the end.
    Range,
    /// Copying the rest.
    Tail,
}

/// Position of the first `regex` match in `text`, ignoring a trailing
/// newline so that `$` matches before it.
fn find_end(regex: &Regex, text: &str) -> Option<usize> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    regex.find(body).map(|m| m.start())
}

/// Replace the range of `document` selected by `options` with
/// `replacement`.
///
/// Returns the new document and a report. An unchanged range gives the
/// document back as is with [`RangeReport::Equal`].
///
/// # Errors
///
/// Returns [`RangeError`] if the replacement is too short, or the anchor,
/// start or end is missing and no insertion line is given.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use sysedit_cli::text::{RangeOptions, replace_range};
///
/// let fence = Regex::new("```").unwrap();
/// let options = RangeOptions::new(fence.clone(), fence);
/// let (doc, report) = replace_range("a\n```\nold\n```\nb\n", "new\n", &options).unwrap();
/// assert_eq!(doc, "a\n```\nnew\n```\nb\n");
/// assert_eq!(report.to_string(), "4 characters have been replaced by 4 characters");
/// ```
pub fn replace_range(
    document: &str,
    replacement: &str,
    options: &RangeOptions,
) -> Result<(String, RangeReport), RangeError> {
    let length = replacement.chars().count();
    if length < options.min_length {
        return Err(RangeError::TooShort {
            length,
            min_length: options.min_length,
        });
    }
    let mut top = String::new();
    let mut old = String::new();
    let mut tail = String::new();
    let mut scan = if options.anchor.is_some() {
        Scan::Top
    } else {
        Scan::Anchor
    };
    for line in document.split_inclusive('\n') {
        match scan {
            Scan::Top => {
                top.push_str(line);
                if options.anchor.as_ref().is_some_and(|a| a.is_match(line)) {
                    scan = Scan::Anchor;
                }
            }
            Scan::Anchor => {
                let Some(found) = options.start.find(line) else {
                    top.push_str(line);
                    continue;
                };
                let (head, rest) = line.split_at(found.end());
                top.push_str(head);
                let rest = if rest == "\n" {
                    top.push('\n');
                    ""
                } else {
                    rest
                };
                match find_end(&options.end, rest) {
                    Some(pos) => {
                        let (inside, behind) = rest.split_at(pos);
                        old.push_str(inside);
                        tail.push_str(behind);
                        scan = Scan::Tail;
                    }
                    None => {
                        old.push_str(rest);
                        scan = Scan::Range;
                    }
                }
            }
            Scan::Range => match find_end(&options.end, line) {
                Some(pos) => {
                    let (inside, behind) = line.split_at(pos);
                    old.push_str(inside);
                    tail.push_str(behind);
                    scan = Scan::Tail;
                }
                None => old.push_str(line),
            },
            Scan::Tail => tail.push_str(line),
        }
    }
    match scan {
        Scan::Top => {
            let anchor = options.anchor.as_ref().map(ToString::to_string);
            Err(RangeError::MissingAnchor(anchor.unwrap_or_default()))
        }
        Scan::Anchor => match &options.insertion {
            Some(insertion) => Ok(insert_line(document, insertion, options)),
            None => Err(RangeError::MissingStart(options.start.to_string())),
        },
        Scan::Range => Err(RangeError::MissingEnd(options.end.to_string())),
        Scan::Tail if old == replacement => Ok((document.to_string(), RangeReport::Equal)),
        Scan::Tail => {
            let report = match (old.matches('\n').count(), replacement.matches('\n').count()) {
                (1, 1) => RangeReport::Characters {
                    old: old.chars().count(),
                    new: length,
                },
                (old, new) => RangeReport::Lines { old, new },
            };
            Ok((format!("{top}{replacement}{tail}"), report))
        }
    }
}

/// Insert `insertion` as a line behind the first line matching
/// `insertion_position`, or at the end.
fn insert_line(document: &str, insertion: &str, options: &RangeOptions) -> (String, RangeReport) {
    let lines: Vec<&str> = document.split_inclusive('\n').collect();
    let index = options
        .insertion_position
        .as_ref()
        .and_then(|re| lines.iter().position(|line| re.is_match(line)))
        .map_or(lines.len(), |ix| ix + 1);
    let mut out = String::with_capacity(document.len() + insertion.len() + 2);
    for (ix, chunk) in lines.iter().enumerate() {
        if ix == index {
            out.push_str(insertion);
            out.push('\n');
        }
        out.push_str(chunk);
    }
    if index == lines.len() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(insertion);
        out.push('\n');
    }
    (out, RangeReport::Inserted { index })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn options(start: &str, end: &str) -> RangeOptions {
        RangeOptions::new(Regex::new(start).unwrap(), Regex::new(end).unwrap())
    }

    #[test]
    fn replaces_multi_line_range() {
        let doc = "# Usage\n```\nold one\nold two\n```\nrest\n";
        let (out, report) = replace_range(doc, "new\n", &options("```", "```")).unwrap();
        insta::assert_snapshot!(out.trim_end(), @r"
        # Usage
        ```
        new
        ```
        rest
        ");
        assert_eq!(report, RangeReport::Lines { old: 2, new: 1 });
    }

    #[test]
    fn range_within_one_line() {
        let doc = "version: <1.0> end\n";
        let (out, report) = replace_range(doc, "2.10", &options("<", ">")).unwrap();
        assert_eq!(out, "version: <2.10> end\n");
        assert_eq!(report, RangeReport::Lines { old: 0, new: 0 });
    }

    #[test]
    fn dollar_end_matches_before_newline() {
        let doc = "key: value\nnext\n";
        let (out, _) = replace_range(doc, " other", &options("key:", "$")).unwrap();
        assert_eq!(out, "key: other\nnext\n");
    }

    #[test]
    fn anchor_skips_earlier_ranges() {
        let doc = "```\nfirst\n```\n## Second\n```\nsecond\n```\n";
        let mut opts = options("```", "```");
        opts.anchor = Some(Regex::new("^## Second").unwrap());
        let (out, _) = replace_range(doc, "changed\n", &opts).unwrap();
        assert_eq!(out, "```\nfirst\n```\n## Second\n```\nchanged\n```\n");
    }

    #[test]
    fn equal_content_is_reported() {
        let doc = "```\nsame\n```\n";
        let (out, report) = replace_range(doc, "same\n", &options("```", "```")).unwrap();
        assert_eq!(out, doc);
        assert_eq!(report, RangeReport::Equal);
        assert!(!report.changed());
    }

    #[test]
    fn missing_parts_are_errors() {
        let opts = options("```", "```");
        assert_eq!(
            replace_range("no fence\n", "abc", &opts).unwrap_err(),
            RangeError::MissingStart("```".to_string())
        );
        assert_eq!(
            replace_range("```\nopen\n", "abc", &opts).unwrap_err(),
            RangeError::MissingEnd("```".to_string())
        );
        let mut anchored = opts;
        anchored.anchor = Some(Regex::new("^#").unwrap());
        assert!(matches!(
            replace_range("```\nx\n```\n", "abc", &anchored).unwrap_err(),
            RangeError::MissingAnchor(_)
        ));
    }

    #[test]
    fn short_replacement_is_rejected() {
        let err = replace_range("```\nx\n```\n", "ab", &options("```", "```")).unwrap_err();
        assert_eq!(
            err,
            RangeError::TooShort {
                length: 2,
                min_length: 3
            }
        );
    }

    #[test]
    fn insertion_fallback() {
        let mut opts = options("^version=", "$");
        opts.insertion = Some("version=1".to_string());
        opts.insertion_position = Some(Regex::new(r"^\[main\]").unwrap());
        let (out, report) = replace_range("[main]\nname=x\n", "1.0", &opts).unwrap();
        assert_eq!(out, "[main]\nversion=1\nname=x\n");
        assert_eq!(report, RangeReport::Inserted { index: 1 });

        opts.insertion_position = None;
        let (out, report) = replace_range("[main]\nname=x", "1.0", &opts).unwrap();
        assert_eq!(out, "[main]\nname=x\nversion=1\n");
        assert_eq!(report, RangeReport::Inserted { index: 2 });
    }
}
