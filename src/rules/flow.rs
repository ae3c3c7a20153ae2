//! Per-rule reactions to success and failure.
use std::fmt;
use std::str::FromStr;

/// What the interpreter does after a rule finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Go on with the next rule.
    Continue,
    /// End processing without an error.
    Stop,
    /// End processing and report an error.
    Error,
    /// Continue behind the named label (name without the `%` delimiters).
    Jump(String),
}

impl FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continue" => Ok(Self::Continue),
            "stop" => Ok(Self::Stop),
            "error" => Ok(Self::Error),
            _ => s
                .strip_prefix('%')
                .and_then(|rest| rest.strip_suffix('%'))
                .filter(|name| is_label_name(name))
                .map(|name| Self::Jump(name.to_string()))
                .ok_or_else(|| format!("unknown reaction: {s}")),
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("continue"),
            Self::Stop => f.write_str("stop"),
            Self::Error => f.write_str("error"),
            Self::Jump(label) => write!(f, "%{label}%"),
        }
    }
}

/// The success and error reactions of one rule.
///
/// Defaults to `success:continue` and `error:error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowControl {
    /// Reaction when the rule succeeded.
    pub on_success: Reaction,
    /// Reaction when the rule failed.
    pub on_error: Reaction,
}

impl Default for FlowControl {
    fn default() -> Self {
        Self {
            on_success: Reaction::Continue,
            on_error: Reaction::Error,
        }
    }
}

impl FlowControl {
    /// Apply one `success:<reaction>` or `error:<reaction>` statement.
    ///
    /// # Errors
    ///
    /// Returns a message if the condition or the reaction is unknown.
    pub fn set(&mut self, control: &str) -> Result<(), String> {
        let (condition, reaction) = control
            .split_once(':')
            .ok_or_else(|| format!("unknown control statement: {control}"))?;
        let reaction: Reaction = reaction.parse()?;
        match condition {
            "success" => self.on_success = reaction,
            "error" => self.on_error = reaction,
            _ => return Err(format!("unknown control statement: {control}")),
        }
        Ok(())
    }

    /// The reaction for the given rule outcome.
    #[must_use]
    pub const fn reaction(&self, success: bool) -> &Reaction {
        if success {
            &self.on_success
        } else {
            &self.on_error
        }
    }

    /// Labels named by either reaction.
    pub fn labels(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [("success", &self.on_success), ("error", &self.on_error)]
            .into_iter()
            .filter_map(|(condition, reaction)| match reaction {
                Reaction::Jump(label) => Some((condition, label.as_str())),
                _ => None,
            })
    }

    /// Whether both reactions are the defaults.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for FlowControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "success:{} error:{}", self.on_success, self.on_error)
    }
}

/// Whether `name` is a valid label name: `[A-Za-z_]\w*`.
pub(crate) fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_continue_on_success_and_error_on_failure() {
        let flow = FlowControl::default();
        assert_eq!(flow.reaction(true), &Reaction::Continue);
        assert_eq!(flow.reaction(false), &Reaction::Error);
        assert!(flow.is_default());
    }

    #[test]
    fn set_parses_each_reaction() {
        let mut flow = FlowControl::default();
        flow.set("success:stop").unwrap();
        flow.set("error:%retry%").unwrap();
        assert_eq!(flow.on_success, Reaction::Stop);
        assert_eq!(flow.on_error, Reaction::Jump("retry".to_string()));
        flow.set("error:continue").unwrap();
        assert_eq!(flow.on_error, Reaction::Continue);
    }

    #[test]
    fn set_rejects_unknown_statements() {
        let mut flow = FlowControl::default();
        assert!(flow.set("failure:stop").is_err());
        assert!(flow.set("success:halt").is_err());
        assert!(flow.set("success:%1x%").is_err());
        assert!(flow.set("success").is_err());
    }

    #[test]
    fn labels_lists_jump_targets() {
        let mut flow = FlowControl::default();
        flow.set("success:%done%").unwrap();
        let labels: Vec<_> = flow.labels().collect();
        assert_eq!(labels, vec![("success", "done")]);
    }

    #[test]
    fn display_round_trips_through_set() {
        let mut flow = FlowControl::default();
        flow.set("success:%a%").unwrap();
        assert_eq!(flow.to_string(), "success:%a% error:error");
    }

    #[test]
    fn label_names() {
        assert!(is_label_name("eve_not_found"));
        assert!(is_label_name("_x1"));
        assert!(!is_label_name("1x"));
        assert!(!is_label_name(""));
    }
}
