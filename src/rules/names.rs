//! Register and marker names.
use std::fmt;

/// A register name: one of `'A'..='Z'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterName(char);

impl RegisterName {
    /// Validate `c` as a register name.
    #[must_use]
    pub const fn new(c: char) -> Option<Self> {
        if c.is_ascii_uppercase() {
            Some(Self(c))
        } else {
            None
        }
    }

    /// The letter of this register.
    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A marker name: one of `'a'..='z'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerName(char);

impl MarkerName {
    /// Validate `c` as a marker name.
    #[must_use]
    pub const fn new(c: char) -> Option<Self> {
        if c.is_ascii_lowercase() {
            Some(Self(c))
        } else {
            None
        }
    }

    /// The letter of this marker.
    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for MarkerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn register_names_are_uppercase_letters() {
        assert_eq!(RegisterName::new('Q').unwrap().as_char(), 'Q');
        assert!(RegisterName::new('q').is_none());
        assert!(RegisterName::new('1').is_none());
        assert!(RegisterName::new('Ä').is_none());
    }

    #[test]
    fn marker_names_are_lowercase_letters() {
        assert_eq!(MarkerName::new('m').unwrap().to_string(), "m");
        assert!(MarkerName::new('M').is_none());
        assert!(MarkerName::new('_').is_none());
    }
}
