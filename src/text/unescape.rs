//! Backslash escape decoding for replacement strings.

/// Decode `\n \r \t \\ \xHH \uHHHH \UHHHHHHHH` in `s`.
///
/// Unknown or malformed sequences are kept verbatim.
///
/// ```
/// use sysedit_cli::text::unescape;
///
/// assert_eq!(unescape(r"a\tb\x41ä"), "a\tbAä");
/// assert_eq!(unescape(r"\q\x4"), r"\q\x4");
/// ```
#[must_use]
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('\\') {
        out.push_str(rest.get(..pos).unwrap_or_default());
        let tail = rest.get(pos + 1..).unwrap_or_default();
        let mut chars = tail.chars();
        let (decoded, used) = match chars.next() {
            Some('n') => (Some('\n'), 1),
            Some('r') => (Some('\r'), 1),
            Some('t') => (Some('\t'), 1),
            Some('\\') => (Some('\\'), 1),
            Some('x') => (hex(tail, 2), 3),
            Some('u') => (hex(tail, 4), 5),
            Some('U') => (hex(tail, 8), 9),
            _ => (None, 0),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = tail.get(used..).unwrap_or_default();
            }
            None => {
                out.push('\\');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The char written as `digits` hex digits behind the escape letter.
fn hex(tail: &str, digits: usize) -> Option<char> {
    let code = tail.get(1..=digits)?;
    if !code.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(code, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn decodes_control_characters() {
        assert_eq!(unescape(r"line\nnext\r\n"), "line\nnext\r\n");
        assert_eq!(unescape(r"a\\nb"), r"a\nb");
    }

    #[test]
    fn decodes_code_points() {
        assert_eq!(unescape(r"\x7e€\U0001F600"), "~€😀");
    }

    #[test]
    fn keeps_malformed_sequences() {
        assert_eq!(unescape(r"\xZZ"), r"\xZZ");
        assert_eq!(unescape(r"\uD800"), r"\uD800");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
