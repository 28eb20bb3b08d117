//! Keyword matching for destructive SQL.
//!
//! Classification is lexical: the input is upper-cased and trimmed, then each
//! keyword is searched for with the pattern `(^|WS|\()KEYWORD WS`. A keyword
//! glued to other characters (e.g. `updates`) or ending the input does not
//! match.
//!
//! `WS` is the ECMAScript whitespace set, not Unicode `White_Space`: it adds
//! U+FEFF and leaves out U+0085. Trimming uses the same set.

use regex::Regex;
use std::sync::LazyLock;

use super::{DestructiveKeyword, Verdict};

/// ECMAScript `WhiteSpace` plus `LineTerminator`, as a regex class.
const WHITESPACE_CLASS: &str =
    r"[\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]";

/// Membership test for [`WHITESPACE_CLASS`].
fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// A keyword paired with its compiled boundary pattern.
struct KeywordPattern {
    keyword: DestructiveKeyword,
    pattern: Regex,
}

/// Compiled patterns, in keyword priority order.
static PATTERNS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    DestructiveKeyword::ALL
        .iter()
        .map(|&keyword| KeywordPattern {
            keyword,
            pattern: Regex::new(&format!(
                "(?:^|{ws}|\\(){keyword}{ws}",
                ws = WHITESPACE_CLASS,
                keyword = keyword.as_str()
            ))
            .expect("keyword patterns are valid regexes"),
        })
        .collect()
});

/// Returns the highest-priority destructive keyword found in `sql`.
///
/// Absent or empty input yields `None`.
pub fn destructive_keyword<'a>(sql: impl Into<Option<&'a str>>) -> Option<DestructiveKeyword> {
    let sql: Option<&str> = sql.into();
    let sql = sql.filter(|s| !s.is_empty())?;
    let normalized = sql.to_uppercase();
    let normalized = normalized.trim_matches(is_whitespace);

    PATTERNS
        .iter()
        .find(|p| p.pattern.is_match(normalized))
        .map(|p| p.keyword)
}

/// Returns true if `sql` contains a destructive keyword anywhere.
pub fn is_destructive<'a>(sql: impl Into<Option<&'a str>>) -> bool {
    destructive_keyword(sql).is_some()
}

/// Classifies `sql` into a verdict.
pub fn classify<'a>(sql: impl Into<Option<&'a str>>) -> Verdict {
    Verdict::from(destructive_keyword(sql))
}
