//! Reference text for the rule language.

const REFERENCE: &str = r#"A rule list is a sequence of rules separated by blanks and/or ';'.
A register holds a string and is named by an uppercase letter, e.g. A.
A marker holds a position and is named by a lowercase letter, e.g. m.
A label is a named position in the rule list, e.g. %not_found%.

Legend:
    D   any non-blank delimiter character, e.g. / or "
    R   register name A..Z
    m   marker name a..z
    G   capture group number 0..99

Rules:
    %<label>%:
        a jump target
    >D<regex>D[<range>][i][e]    FD<regex>D[<range>][i][e]
        search forward; <range> is N (next N lines) or :N (next N columns)
    <D<regex>D[<range>][i][e]    BD<regex>D[<range>][i][e]
        search backward; <range> is N (previous N lines) or :N (previous N columns)
        i: ignore case  e: cursor is placed behind the match
    <line>:<col>
        absolute position, both starting at 1, e.g. 24:2
    [+-]<lines>:[+-]<cols>
        relative move; a column without sign takes the sign of the lines
    bof eof bol eol bonl eonl bopl eopl
        begin/end of file, line, next line, previous line

Commands:
    add-R-m         append the text from marker m to the cursor onto R
    add-R-S         append register S onto R
    add-R:DtextD    append the text onto R
    cut-m           delete the text from marker m to the cursor
    cut-R-m         the same, storing the deleted text in R first
    expr-R:D<op><operand>D
                    R = R <op> <operand>; <op> is + - * / %,
                    <operand> a decimal number or $<register>
    group-G-R       store capture group G of the last search into R
    insert-R        insert register R at the cursor
    insert:DtextD   insert the text at the cursor
    jump-m          move the cursor to marker m
    jump:%<label>%  continue behind the label
    mark-m          store the cursor as marker m
    print-m         print the text from marker m to the cursor
    print-R         print register R
    print:DtextD    print the text
    replace:D<regex>D<replacement>D[<options>]
                    replace in the cursor line
    replace-m:D<regex>D<replacement>D[<options>]
                    replace between marker m and the cursor
    replace-R:D<regex>D<replacement>D[<options>]
                    replace in register R
                    <options>: c=<count> at most <count> replacements per line
                               e=<char> register placeholder prefix
                    \1 or \g<name> in <replacement> refer to capture groups
    set-R-m         store the text from marker m to the cursor into R
    set-R:DtextD    store the text into R
    state-R:D<variable>D
                    store a value into R: row, col, rows, size-S, rows-S, hits
    swap-m          exchange the cursor and marker m

    DtextD may be followed by e=<char>: <char><register> is replaced by the
    register's content, e.g. print:"Name: $N"e=$

Flow control, written behind a rule:
    success:<reaction>   error:<reaction>
    <reaction>: continue, stop, error or %<label>%
    default: success:continue error:error

Examples:
    >/jonny/:80i success:stop >/eve/4 error:stop print:"eve without jonny"
    10:1 error:%short% >/Name:\s+/e mark-n >/$/ set-N-n print-N success:stop %short%: print:"less than 10 lines"
"#;

/// The rule-language reference shown by `describe-rules`.
#[must_use]
pub const fn describe() -> &'static str {
    REFERENCE
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use crate::rules::SearchRuleList;
    use std::sync::Arc;

    #[test]
    fn mentions_every_command() {
        for name in crate::rules::COMMAND_NAMES {
            assert!(describe().contains(&format!("    {name}")), "{name}");
        }
    }

    #[test]
    fn examples_parse() {
        let examples = describe()
            .split("Examples:\n")
            .nth(1)
            .unwrap()
            .lines()
            .filter(|line| line.starts_with("    ") && !line.starts_with("     "));
        for example in examples {
            let mut list = SearchRuleList::new(Arc::new(MemoryLog::new()));
            list.parse(example);
            assert!(list.check(), "{example}");
        }
    }
}
