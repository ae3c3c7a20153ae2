//! Literal text with register placeholders, and replacement templates.
use std::fmt;

use regex::Regex;

use super::names::RegisterName;
use super::state::Registers;

/// Text taken from a `:DtextD[e=c]` clause.
///
/// When an escape character is set, `<esc><REGISTER>` is replaced with the
/// register's content at run time; an escape followed by anything else is
/// kept as written.
///
/// # Examples
///
/// ```
/// use sysedit_cli::rules::TextTemplate;
/// use sysedit_cli::rules::{RegisterName, Registers};
///
/// let mut registers = Registers::new();
/// registers.insert(RegisterName::new('A').unwrap(), "42".to_string());
/// let template = TextTemplate::new("x=$A, $b", Some('$'));
/// assert_eq!(template.render(&registers), "x=42, $b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTemplate {
    text: String,
    esc: Option<char>,
}

impl TextTemplate {
    /// Create a template from raw text and an optional escape character.
    #[must_use]
    pub fn new(text: impl Into<String>, esc: Option<char>) -> Self {
        Self {
            text: text.into(),
            esc,
        }
    }

    /// The raw text as written in the rule.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.text
    }

    /// The escape character, if any.
    #[must_use]
    pub const fn esc(&self) -> Option<char> {
        self.esc
    }

    /// Expand register placeholders.
    #[must_use]
    pub fn render(&self, registers: &Registers) -> String {
        let Some(esc) = self.esc else {
            return self.text.clone();
        };
        let mut out = String::with_capacity(self.text.len());
        let mut chars = self.text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != esc {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some(name) => match RegisterName::new(name) {
                    Some(register) => {
                        out.push_str(registers.get(&register).map_or("", String::as_str));
                    }
                    None => {
                        out.push(esc);
                        out.push(name);
                    }
                },
                None => out.push(esc),
            }
        }
        out
    }
}

impl fmt::Display for TextTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.text)?;
        if let Some(esc) = self.esc {
            write!(f, "e={esc}")?;
        }
        Ok(())
    }
}

/// Translate a backslash-style replacement template into the `regex` crate's
/// `$`-style syntax.
///
/// Recognised: `\1`..`\99` and `\g<name>` group references, `\\`, `\n`,
/// `\r` and `\t`. A literal `$` stays literal. Other backslash sequences are
/// kept unchanged.
///
/// # Examples
///
/// ```
/// use sysedit_cli::rules::translate_replacement;
///
/// assert_eq!(translate_replacement(r"var_\1"), "var_${1}");
/// assert_eq!(translate_replacement(r"\g<key>=$5"), "${key}=$$5");
/// ```
#[must_use]
pub fn translate_replacement(template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('r') => {
                    chars.next();
                    out.push('\r');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some(d @ '1'..='9') => {
                    chars.next();
                    let mut group = String::from(d);
                    if let Some(d2) = chars.peek().copied().filter(char::is_ascii_digit) {
                        chars.next();
                        group.push(d2);
                    }
                    out.push_str(&format!("${{{group}}}"));
                }
                Some('g') => {
                    let rest: String = chars.clone().collect();
                    let name = rest
                        .strip_prefix("g<")
                        .and_then(|r| r.split_once('>'))
                        .map(|(name, _)| name)
                        .filter(|name| {
                            !name.is_empty()
                                && name.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
                        });
                    if let Some(name) = name {
                        for _ in 0..name.chars().count() + 3 {
                            chars.next();
                        }
                        out.push_str(&format!("${{{name}}}"));
                    } else {
                        out.push('\\');
                    }
                }
                _ => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}

/// Replace up to `limit` matches of `regex` in `hay` (`0` = all).
///
/// `replacement` uses the `regex` crate's syntax. Returns the new text and
/// the number of matches replaced.
pub(crate) fn substitute(
    regex: &Regex,
    hay: &str,
    replacement: &str,
    limit: usize,
) -> (String, usize) {
    let found = regex.find_iter(hay).count();
    let hits = if limit == 0 { found } else { found.min(limit) };
    if hits == 0 {
        return (hay.to_string(), 0);
    }
    (regex.replacen(hay, limit, replacement).into_owned(), hits)
}
