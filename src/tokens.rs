//! Parser tokens (§4.6): primitives, delimited rows, bracket segments, array
//! header lines, and key tokens. These are pure functions over `&str` with
//! no dependency on the scanner's cursor — the structural decoder (§4.7)
//! drives them line by line.

use crate::error::{Error, Result};
use crate::options::Delimiter;
use crate::quoting::{self, unescape};
use crate::value::Value;

/// `{ key?, length, delimiter, fields?, inline_values? }` (§3 `ArrayHeader`).
#[derive(Debug, Clone)]
pub struct ArrayHeader {
    pub key: Option<String>,
    pub length: usize,
    pub delimiter: Delimiter,
    pub fields: Option<Vec<String>>,
    pub inline_values: Option<String>,
}

/// Parses a primitive token (§4.6 "Primitive"). Trims first; `null`,
/// `true`/`false`, a quoted string, or the numeric grammar each short-circuit;
/// anything else is returned as an unquoted string verbatim.
pub fn parse_primitive(token: &str, line: usize, strict: bool) -> Result<Value> {
    let trimmed = token.trim();
    if trimmed == "null" {
        return Ok(Value::Null);
    }
    if trimmed == "true" {
        return Ok(Value::Bool(true));
    }
    if trimmed == "false" {
        return Ok(Value::Bool(false));
    }
    if let Some(rest) = trimmed.strip_prefix('"') {
        return Ok(Value::String(parse_quoted_string(rest, line, strict)?));
    }
    if let Some(n) = quoting::parse_numeric_grammar(trimmed) {
        return Ok(Value::number(n));
    }
    Ok(Value::String(trimmed.to_string()))
}

/// Parses the body of a `"..."` quoted string, given the text starting
/// right after the opening quote. Returns the unescaped content.
fn parse_quoted_string(after_open_quote: &str, line: usize, strict: bool) -> Result<String> {
    let close = find_closing_quote(after_open_quote, 0)
        .ok_or_else(|| Error::unterminated_string(line))?;
    if close != after_open_quote.len() - 1 {
        return Err(Error::invalid_string_literal(
            line,
            "unexpected characters after closing quote",
        ));
    }
    unescape(&after_open_quote[..close], line, strict)
}

/// Index (within `s`) of the first unescaped `"`, starting the scan at
/// `start`. `\X` inside the scan is treated as a two-character unit so an
/// escaped quote is never mistaken for the terminator.
pub fn find_closing_quote(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Index of the first unquoted occurrence of `needle` in `s`.
pub fn find_unquoted_char(s: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\\' && in_quotes {
            chars.next();
            continue;
        }
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if c == needle && !in_quotes {
            return Some(i);
        }
    }
    None
}

/// Splits a delimited row into raw cell tokens (§4.6 "Delimited row"). A `"`
/// toggles an in-quotes flag; inside quotes `\X` is retained verbatim and
/// resolved later by `parse_primitive`. Cells are right-trimmed.
pub fn split_delimited_row(content: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' && in_quotes {
            buf.push(c);
            if let Some(next) = chars.next() {
                buf.push(next);
            }
            continue;
        }
        if c == '"' {
            in_quotes = !in_quotes;
            buf.push(c);
            continue;
        }
        if c == delimiter && !in_quotes {
            cells.push(buf.trim_end().to_string());
            buf = String::new();
            continue;
        }
        buf.push(c);
    }
    cells.push(buf.trim_end().to_string());
    cells
}

/// Parses a bracket segment's contents (text between `[` and `]`, §4.6
/// "Bracket segment"): an optional trailing delimiter marker followed by a
/// non-negative integer length.
pub fn parse_bracket_segment(
    segment: &str,
    line: usize,
    column: usize,
    default_delimiter: Delimiter,
) -> Result<(usize, Delimiter)> {
    if segment.is_empty() {
        return Err(Error::empty_bracket_segment(line, column));
    }

    let (digits, delimiter) = match segment.chars().last() {
        Some('\t') => (&segment[..segment.len() - 1], Delimiter::Tab),
        Some('|') => (&segment[..segment.len() - '|'.len_utf8()], Delimiter::Pipe),
        _ => (segment, default_delimiter),
    };

    if digits.is_empty() {
        return Err(Error::empty_bracket_segment(line, column));
    }
    if digits.starts_with('-') {
        return Err(Error::negative_array_length(line, column, digits));
    }
    let length = digits
        .parse::<usize>()
        .map_err(|_| Error::invalid_bracket_segment(line, column, digits))?;

    Ok((length, delimiter))
}

/// Parses an array header line (§4.6 "Array header line"). Returns `None`
/// when `content` doesn't contain a `[`, i.e. isn't an array header at all;
/// that's not an error, it just means the caller should try another
/// dispatch branch.
pub fn parse_array_header_line(
    content: &str,
    line: usize,
    default_delimiter: Delimiter,
) -> Result<Option<ArrayHeader>> {
    let Some(bracket_start) = content.find('[') else {
        return Ok(None);
    };
    let Some(bracket_end_rel) = content[bracket_start..].find(']') else {
        return Err(Error::invalid_array_header(
            line,
            bracket_start,
            "missing closing ']'",
        ));
    };
    let bracket_end = bracket_start + bracket_end_rel;

    let key = if bracket_start > 0 {
        let raw_key = content[..bracket_start].trim();
        if let Some(rest) = raw_key.strip_prefix('"') {
            Some(parse_quoted_string(rest, line, true)?)
        } else if raw_key.is_empty() {
            None
        } else {
            Some(raw_key.to_string())
        }
    } else {
        None
    };

    let (length, delimiter) = parse_bracket_segment(
        &content[bracket_start + 1..bracket_end],
        line,
        bracket_start + 1,
        default_delimiter,
    )?;

    let mut cursor = bracket_end + 1;
    let fields = if content[cursor..].starts_with('{') {
        let brace_start = cursor;
        let Some(brace_end_rel) = content[brace_start..].find('}') else {
            return Err(Error::invalid_array_header(
                line,
                brace_start,
                "missing closing '}'",
            ));
        };
        let brace_end = brace_start + brace_end_rel;
        let raw_fields = &content[brace_start + 1..brace_end];
        let fields = split_delimited_row(raw_fields, delimiter.as_char())
            .into_iter()
            .map(|f| {
                let f = f.trim();
                if let Some(rest) = f.strip_prefix('"') {
                    parse_quoted_string(rest, line, true)
                } else {
                    Ok(f.to_string())
                }
            })
            .collect::<Result<Vec<_>>>()?;
        cursor = brace_end + 1;
        Some(fields)
    } else {
        None
    };

    let Some(colon_rel) = content[cursor..].find(':') else {
        return Err(Error::invalid_array_header(
            line,
            cursor,
            "missing ':' after array header",
        ));
    };
    let after_colon = content[cursor + colon_rel + 1..].trim();
    let inline_values = if after_colon.is_empty() {
        None
    } else {
        Some(after_colon.to_string())
    };

    Ok(Some(ArrayHeader {
        key,
        length,
        delimiter,
        fields,
        inline_values,
    }))
}

/// Parses a key token (§4.6 "Key token"): trims a trailing `:`; if the
/// remainder begins with `"`, parses a quoted string literal and reports
/// `was_quoted = true`.
pub fn parse_key_token(content: &str, line: usize) -> Result<(String, usize, bool)> {
    let trimmed_start = content.len() - content.trim_start().len();
    let body = &content[trimmed_start..];

    if let Some(rest) = body.strip_prefix('"') {
        let close = find_closing_quote(rest, 0).ok_or_else(|| Error::unterminated_string(line))?;
        let key = unescape(&rest[..close], line, true)?;
        let after_quote = trimmed_start + 1 + close + 1;
        let colon_rel = content[after_quote..]
            .find(':')
            .ok_or_else(|| Error::invalid_string_literal(line, "missing ':' after quoted key"))?;
        Ok((key, after_quote + colon_rel + 1, true))
    } else {
        let colon = content
            .find(':')
            .ok_or_else(|| Error::invalid_string_literal(line, "missing ':' after key"))?;
        Ok((content[..colon].trim().to_string(), colon + 1, false))
    }
}

/// True when `content` (already past a `"- "` prefix, or a bare line) looks
/// like the start of an array header rather than an object field or
/// primitive — i.e. it contains `[` before any unquoted `:`.
pub fn looks_like_array_header(content: &str) -> bool {
    let Some(bracket) = content.find('[') else {
        return false;
    };
    match find_unquoted_char(content, ':') {
        Some(colon) => bracket < colon,
        None => true,
    }
}
