//! The quoting oracle (§4.1): decides whether a string needs `"..."` quoting
//! and performs JSON-style escape/unescape.

use crate::error::{Error, Result};

const RESERVED_LITERALS: [&str; 3] = ["true", "false", "null"];

/// True if `s` matches the accepted numeric literal grammar
/// `-?\d+(\.\d+)?([eE][+-]?\d+)?`, or the leading-zero integer form `0\d+`
/// that the grammar excludes from numbers but the oracle still must quote
/// (§6 "Numbers", §9 numeric grammar note).
pub fn looks_numeric(s: &str) -> bool {
    parse_numeric_grammar(s).is_some() || is_leading_zero_integer(s)
}

fn is_leading_zero_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses the documented grammar and returns the numeric value on success.
/// Rejects the leading-zero integer form (that's handled separately so it
/// can still be *quoted* without being *parsed as a number*).
pub fn parse_numeric_grammar(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut i = 0;
    if bytes[i] == b'-' {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return None;
    }
    // Reject leading-zero integer forms like "0123" (but "0" and "0.5" are fine).
    if i - int_start > 1 && bytes[int_start] == b'0' {
        return None;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j == frac_start {
            return None;
        }
        i = j;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j == exp_start {
            return None;
        }
        i = j;
    }
    if i != bytes.len() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// `needs-quoting?` (§4.1): whether a string value must be wrapped in
/// `"..."` to round-trip unambiguously as a value cell.
pub fn needs_quoting(s: &str, delimiter: char) -> bool {
    if s.is_empty() || s.trim().is_empty() {
        return true;
    }
    if s.trim_start() != s || s.trim_end() != s {
        return true;
    }
    if RESERVED_LITERALS.contains(&s) {
        return true;
    }
    if looks_numeric(s) {
        return true;
    }
    if s.contains(delimiter) {
        return true;
    }
    s.chars().any(|c| {
        matches!(c, ':' | '"' | '\\' | '[' | ']' | '{' | '}' | '-')
            || matches!(c, '\n' | '\r' | '\t')
    })
}

/// `valid-unquoted-key?` (§4.1): stricter than value quoting — keys must
/// look like identifiers, optionally dotted or slashed.
pub fn valid_unquoted_key(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '/')
}

/// True if `s` is a bare identifier segment (§4.4 `identifier-segment?`):
/// used both by the key collapser (which dotted keys are safe to fold) and
/// the path expander (which dotted keys are safe to split back apart).
pub fn is_identifier_segment(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `wrap` (§4.1): escapes `\\ " \n \r \t` and surrounds with `"`.
pub fn wrap(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// `unescape` (§4.1): inverse of `wrap`, applied to the content between the
/// quotes (quotes already stripped by the caller). In strict mode an
/// unrecognized `\x` raises *invalid-escape*; otherwise the backslash is
/// kept literally and `x` follows it unchanged.
pub fn unescape(s: &str, line: usize, strict: bool) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                if strict {
                    return Err(Error::invalid_escape(line, other));
                }
                out.push('\\');
                out.push(other);
            }
            None => {
                if strict {
                    return Err(Error::unterminated_string(line));
                }
                out.push('\\');
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_need_quoting() {
        assert!(needs_quoting("", ','));
        assert!(needs_quoting("   ", ','));
        assert!(needs_quoting(" leading", ','));
        assert!(needs_quoting("trailing ", ','));
    }

    #[test]
    fn reserved_words_need_quoting() {
        assert!(needs_quoting("true", ','));
        assert!(needs_quoting("false", ','));
        assert!(needs_quoting("null", ','));
    }

    #[test]
    fn numeric_looking_strings_need_quoting() {
        assert!(needs_quoting("42", ','));
        assert!(needs_quoting("-3.14", ','));
        assert!(needs_quoting("1e-6", ','));
        assert!(needs_quoting("05", ','));
    }

    #[test]
    fn structural_characters_need_quoting() {
        assert!(needs_quoting("a:b", ','));
        assert!(needs_quoting("a,b", ','));
        assert!(!needs_quoting("a,b", '|'));
        assert!(needs_quoting("[3]", ','));
        assert!(needs_quoting("a-b", ','));
    }

    #[test]
    fn plain_words_do_not_need_quoting() {
        assert!(!needs_quoting("Alice", ','));
        assert!(!needs_quoting("hello world", ','));
    }

    #[test]
    fn key_validity_rejects_hyphens_and_digit_starts() {
        assert!(valid_unquoted_key("user_name"));
        assert!(valid_unquoted_key("user.email"));
        assert!(!valid_unquoted_key("2ndPlace"));
        assert!(!valid_unquoted_key("user-id"));
    }

    #[test]
    fn wrap_unescape_roundtrip() {
        let s = "line1\nline2\t\"quoted\"\\end";
        let wrapped = wrap(s);
        let inner = &wrapped[1..wrapped.len() - 1];
        assert_eq!(unescape(inner, 1, true).unwrap(), s);
    }

    #[test]
    fn strict_rejects_unknown_escape() {
        assert!(unescape("\\q", 1, true).is_err());
        assert_eq!(unescape("\\q", 1, false).unwrap(), "\\q");
    }
}
