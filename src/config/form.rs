//! Adapt-variables forms: which variables to set in which config files.
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::FormError;

/// One `VARIABLE|VALUE[|ANCHOR]` rule.
#[derive(Debug, Clone)]
pub struct VariableRule {
    /// Variable name.
    pub name: String,
    /// Wanted value.
    pub value: String,
    /// A missing variable is inserted below the first line matching this.
    pub anchor: Option<Regex>,
}

impl VariableRule {
    /// Parse `rule`, an entry of the file `file`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidRule`] if the rule does not have two or
    /// three `|`-separated parts or the name is empty, and
    /// [`FormError::InvalidAnchor`] if the anchor does not compile.
    pub fn parse(rule: &str, file: &str) -> Result<Self, FormError> {
        let invalid = || FormError::InvalidRule {
            file: file.to_string(),
            rule: rule.to_string(),
        };
        let mut parts = rule.splitn(3, '|');
        let name = parts.next().map(str::trim).filter(|n| !n.is_empty());
        let (Some(name), Some(value)) = (name, parts.next()) else {
            return Err(invalid());
        };
        let anchor = parts
            .next()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| FormError::InvalidAnchor {
                    file: file.to_string(),
                    anchor: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;
        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
            anchor,
        })
    }
}

/// The rules for one file.
#[derive(Debug, Clone)]
pub struct FileRules {
    /// The file to adapt.
    pub path: PathBuf,
    /// Its rules in form order.
    pub rules: Vec<VariableRule>,
}

/// A parsed adapt-variables form.
#[derive(Debug, Clone, Default)]
pub struct AdaptForm {
    /// Free text comment.
    pub comment: Option<String>,
    /// `%(NAME)` values in form order, already expanded.
    pub variables: Vec<(String, String)>,
    /// Files in form order.
    pub files: Vec<FileRules>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawForm {
    #[serde(rename = "Variables", default)]
    variables: Map<String, Value>,
    #[serde(rename = "Comment", default)]
    comment: Option<Value>,
    #[serde(rename = "Files", default)]
    files: Map<String, Value>,
}

/// Text of a JSON scalar; strings without quotes.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace every `%(NAME)` in `text` by its value.
///
/// # Errors
///
/// Returns [`FormError::UnknownVariable`] for a name not in `variables`.
pub fn expand(text: &str, variables: &[(String, String)]) -> Result<String, FormError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("%(") {
        let Some(len) = rest.get(start + 2..).and_then(|r| r.find(')')) else {
            break;
        };
        out.push_str(rest.get(..start).unwrap_or_default());
        let name = rest.get(start + 2..start + 2 + len).unwrap_or_default();
        let value = variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| FormError::UnknownVariable {
                name: name.to_string(),
                text: text.to_string(),
            })?;
        out.push_str(value);
        rest = rest.get(start + 3 + len..).unwrap_or_default();
    }
    out.push_str(rest);
    Ok(out)
}

impl AdaptForm {
    /// Read and parse the form at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] if the file is unreadable or the form invalid.
    pub fn load(path: &Path) -> Result<Self, FormError> {
        let content = std::fs::read_to_string(path).map_err(|source| FormError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse form `content`; `origin` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] if the JSON is malformed, a rule is invalid or
    /// a placeholder is unknown.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, FormError> {
        let raw: RawForm = serde_json::from_str(content).map_err(|source| FormError::Json {
            path: origin.to_path_buf(),
            source,
        })?;
        let mut variables: Vec<(String, String)> = Vec::with_capacity(raw.variables.len());
        for (name, value) in &raw.variables {
            let value = expand(&scalar(value), &variables)?;
            variables.push((name.clone(), value));
        }
        let mut files = Vec::with_capacity(raw.files.len());
        for (name, rules) in raw.files {
            let path = expand(&name, &variables)?;
            let rules: Vec<String> =
                serde_json::from_value(rules).map_err(|source| FormError::Json {
                    path: origin.to_path_buf(),
                    source,
                })?;
            let rules = rules
                .iter()
                .map(|rule| VariableRule::parse(&expand(rule, &variables)?, &path))
                .collect::<Result<Vec<_>, _>>()?;
            files.push(FileRules {
                path: PathBuf::from(path),
                rules,
            });
        }
        Ok(Self {
            comment: raw.comment.as_ref().map(scalar),
            variables,
            files,
        })
    }
}

/// The form printed by `example-adapt-variables`.
pub const EXAMPLE_FORM: &str = r#"{
  "Variables": {
    "VERSION": "8.2",
    "BASE": "/etc/php/%(VERSION)"
  },
  "Comment": "Each rule is VARIABLE|VALUE or VARIABLE|VALUE|ANCHOR. A missing variable is inserted below the first line matching ANCHOR, or at the end.",
  "Files": {
    "%(BASE)/fpm/php.ini": [
      "memory_limit|2048M",
      "upload_max_filesize|512M",
      "max_execution_time|600",
      "session.save_handler|redis|^\\[Session\\]",
      "opcache.enable|1|^\\[opcache\\]"
    ],
    "%(BASE)/cli/php.ini": [
      "memory_limit|2048M",
      "max_execution_time|600"
    ]
  }
}
"#;
