//! The structural decoder (§4.7) and path expander (§4.8).

use crate::error::{Error, Result};
use crate::map::ToonMap;
use crate::options::{DecodeOptions, Delimiter, PathExpansion};
use crate::quoting::is_identifier_segment;
use crate::scanner::{scan, LineCursor, ParsedLine};
use crate::tokens::{
    find_unquoted_char, looks_like_array_header, parse_array_header_line, parse_key_token,
    parse_primitive, split_delimited_row, ArrayHeader,
};
use crate::value::Value;

/// Decodes a complete TOON document, applying path expansion afterward if
/// `options.expand_paths` is `:safe`.
pub fn decode(text: &str, options: &DecodeOptions) -> Result<Value> {
    let (lines, blanks) = scan(text, options)?;
    let value = decode_root(&lines, &blanks, options)?;
    match options.expand_paths {
        PathExpansion::Off => Ok(value),
        PathExpansion::Safe => expand_paths(value, options.strict),
    }
}

fn decode_root(lines: &[ParsedLine], blanks: &[crate::scanner::BlankLine], options: &DecodeOptions) -> Result<Value> {
    let Some(first) = lines.first() else {
        return Ok(Value::Object(ToonMap::new()));
    };

    if is_empty_array_header(&first.content) {
        return Ok(Value::Array(Vec::new()));
    }

    let mut cursor = LineCursor::new(lines, blanks);

    if first.content.starts_with('[')
        && first.content.contains(']')
        && find_unquoted_char(&first.content, ':').is_some()
    {
        let header = parse_array_header_line(&first.content, first.line_number, Delimiter::Comma)?
            .ok_or_else(|| Error::invalid_array_header(first.line_number, 0, "expected array header"))?;
        cursor.advance();
        return decode_array(&header, first.line_number, &mut cursor, 1, options);
    }

    if lines.len() == 1 && find_unquoted_char(&first.content, ':').is_none() {
        return parse_primitive(&first.content, first.line_number, options.strict);
    }

    let obj = decode_object(&mut cursor, 0, options)?;
    Ok(Value::Object(obj))
}

fn is_empty_array_header(content: &str) -> bool {
    let Some(inner) = content
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return false;
    };
    inner == "0" || inner == "0\t" || inner == "0|" || inner == "0,"
}

/// Object decoding at depth `d` (§4.7 "Object decoding"): loops while the
/// cursor peeks a line at depth `d`, dispatching on the four field shapes.
fn decode_object(cursor: &mut LineCursor, depth: usize, options: &DecodeOptions) -> Result<ToonMap> {
    let mut map = ToonMap::new();

    while let Some(line) = cursor.peek_at_depth(depth) {
        let content = line.content.clone();
        let line_number = line.line_number;

        let Some(colon_idx) = find_unquoted_char(&content, ':') else {
            break;
        };

        let key_part_literal = &content[..colon_idx];
        let is_quoted_key = key_part_literal.trim_start().starts_with('"');
        let has_bracket = !is_quoted_key && key_part_literal.contains('[');

        if has_bracket {
            let header = parse_array_header_line(&content, line_number, Delimiter::Comma)?
                .ok_or_else(|| Error::invalid_array_header(line_number, 0, "expected array header"))?;
            cursor.advance();
            let value = decode_array(&header, line_number, cursor, depth + 1, options)?;
            let key = header.key.clone().unwrap_or_default();
            map.insert(key, value);
            continue;
        }

        let (key, value_start, _was_quoted) = parse_key_token(&content, line_number)?;
        let value_part = content[value_start..].trim();

        if value_part.is_empty() {
            cursor.advance();
            if cursor.peek().is_some_and(|l| l.depth > depth) {
                let nested = decode_object(cursor, depth + 1, options)?;
                map.insert(key, Value::Object(nested));
            } else {
                map.insert(key, Value::Null);
            }
            continue;
        }

        let value = parse_primitive(value_part, line_number, options.strict)?;
        cursor.advance();
        map.insert(key, value);
    }

    Ok(map)
}

/// Array decoding (§4.7 "Array decoding"): dispatches on the header shape.
fn decode_array(
    header: &ArrayHeader,
    line_number: usize,
    cursor: &mut LineCursor,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Value> {
    if header.inline_values.is_some() {
        return decode_inline_array(header, line_number, options);
    }
    if let Some(fields) = &header.fields {
        return decode_tabular_array(header, fields, line_number, cursor, depth, options);
    }
    decode_list_array(header, line_number, cursor, depth, options)
}

fn decode_inline_array(header: &ArrayHeader, line_number: usize, options: &DecodeOptions) -> Result<Value> {
    let raw = header.inline_values.as_deref().unwrap_or("");
    let cells = split_delimited_row(raw, header.delimiter.as_char());
    if options.strict && cells.len() != header.length {
        return Err(Error::array_length_mismatch(line_number, header.length, cells.len()));
    }
    let values = cells
        .iter()
        .map(|c| parse_primitive(c, line_number, options.strict))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(values))
}

fn decode_tabular_array(
    header: &ArrayHeader,
    fields: &[String],
    line_number: usize,
    cursor: &mut LineCursor,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Value> {
    let mut rows = Vec::new();

    while let Some(line) = cursor.peek_at_depth(depth) {
        let next = cursor.peek_nth_at_depth(1, depth);
        if !classify_row(&line.content, next, header.delimiter.as_char()) {
            break;
        }

        let cells = split_delimited_row(&line.content, header.delimiter.as_char());
        let mut obj = ToonMap::new();
        for (field, cell) in fields.iter().zip(cells.iter()) {
            obj.insert(field.clone(), parse_primitive(cell, line.line_number, options.strict)?);
        }
        rows.push(Value::Object(obj));
        cursor.advance();
    }

    if options.strict && rows.len() != header.length {
        return Err(Error::tabular_array_length_mismatch(line_number, header.length, rows.len()));
    }
    Ok(Value::Array(rows))
}

/// The row-vs-key-value heuristic (§4.7): decides whether a candidate
/// tabular line is a data row or the start of a sibling object field.
fn classify_row(content: &str, next: Option<&ParsedLine>, delimiter: char) -> bool {
    let colon = find_unquoted_char(content, ':');
    let delim_pos = find_unquoted_char(content, delimiter);

    match (colon, delim_pos) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(c), Some(d)) if d < c => true,
        (Some(_), Some(_)) => match next {
            Some(n) => {
                let c2 = find_unquoted_char(&n.content, ':');
                let d2 = find_unquoted_char(&n.content, delimiter);
                matches!((c2, d2), (Some(c2), Some(d2)) if d2 < c2)
            }
            None => false,
        },
    }
}

fn decode_list_array(
    header: &ArrayHeader,
    line_number: usize,
    cursor: &mut LineCursor,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Value> {
    let mut items = Vec::new();

    while let Some(line) = cursor.peek_at_depth(depth) {
        if line.content != "-" && !line.content.starts_with("- ") {
            break;
        }
        items.push(decode_list_item(cursor, depth, options)?);
    }

    if options.strict && items.len() != header.length {
        return Err(Error::list_array_length_mismatch(line_number, header.length, items.len()));
    }
    Ok(Value::Array(items))
}

/// Decodes one `- `-prefixed list item (§4.7): inline-array, object, or
/// primitive.
fn decode_list_item(cursor: &mut LineCursor, depth: usize, options: &DecodeOptions) -> Result<Value> {
    let line = cursor.peek_at_depth(depth).expect("caller checked presence");
    let line_number = line.line_number;
    let rest = if line.content == "-" {
        ""
    } else {
        line.content[2..].trim_start()
    };
    cursor.advance();

    if rest.is_empty() {
        if cursor.peek().is_some_and(|l| l.depth > depth) {
            let nested = decode_object(cursor, depth + 1, options)?;
            return Ok(Value::Object(nested));
        }
        return Ok(Value::Null);
    }

    if looks_like_array_header(rest) {
        let header = parse_array_header_line(rest, line_number, Delimiter::Comma)?
            .ok_or_else(|| Error::invalid_array_header(line_number, 2, "expected array header"))?;
        let value = decode_array(&header, line_number, cursor, depth + 1, options)?;

        return match &header.key {
            Some(key) => {
                let mut obj = ToonMap::new();
                obj.insert(key.clone(), value);
                let rest_obj = decode_object(cursor, depth + 1, options)?;
                for (k, v) in rest_obj {
                    obj.insert(k, v);
                }
                Ok(Value::Object(obj))
            }
            None => Ok(value),
        };
    }

    if find_unquoted_char(rest, ':').is_some() {
        return decode_object_list_item(rest, line_number, cursor, depth, options);
    }

    if cursor.peek().is_some_and(|l| l.depth > depth) {
        return Err(Error::invalid_object_list_item(line_number));
    }

    parse_primitive(rest, line_number, options.strict)
}

fn decode_object_list_item(
    first_field: &str,
    line_number: usize,
    cursor: &mut LineCursor,
    depth: usize,
    options: &DecodeOptions,
) -> Result<Value> {
    let (key, value_start, _was_quoted) = parse_key_token(first_field, line_number)?;
    let value_part = first_field[value_start..].trim();

    let mut obj = ToonMap::new();
    if value_part.is_empty() {
        if cursor.peek().is_some_and(|l| l.depth > depth + 1) {
            let nested = decode_object(cursor, depth + 2, options)?;
            obj.insert(key, Value::Object(nested));
        } else {
            obj.insert(key, Value::Null);
        }
    } else {
        obj.insert(key, parse_primitive(value_part, line_number, options.strict)?);
    }

    let rest_obj = decode_object(cursor, depth + 1, options)?;
    for (k, v) in rest_obj {
        obj.insert(k, v);
    }
    Ok(Value::Object(obj))
}

/// Post-decode path expansion (§4.8): splits dotted keys whose every segment
/// is an identifier into nested objects, deep-merging on convergence. Shared
/// with the event builder, which applies it after reconstructing a tree from
/// an event sequence.
pub(crate) fn expand_paths(value: Value, strict: bool) -> Result<Value> {
    match value {
        Value::Object(obj) => {
            let mut result = ToonMap::new();
            for (key, v) in obj {
                let v = expand_paths(v, strict)?;
                let segments: Vec<&str> = key.split('.').collect();
                if segments.len() > 1 && segments.iter().all(|s| is_identifier_segment(s)) {
                    insert_path(&mut result, &segments, v, strict, &key)?;
                } else {
                    merge_key(&mut result, key, v, strict)?;
                }
            }
            Ok(Value::Object(result))
        }
        Value::Array(arr) => Ok(Value::Array(
            arr.into_iter()
                .map(|v| expand_paths(v, strict))
                .collect::<Result<Vec<_>>>()?,
        )),
        other => Ok(other),
    }
}

fn insert_path(
    map: &mut ToonMap,
    segments: &[&str],
    value: Value,
    strict: bool,
    full_path: &str,
) -> Result<()> {
    if segments.len() == 1 {
        return merge_key(map, segments[0].to_string(), value, strict);
    }

    let head = segments[0];
    let mut nested = match map.get(head) {
        Some(Value::Object(existing)) => existing.clone(),
        Some(_) if strict => {
            return Err(Error::path_expansion_conflict(
                full_path.to_string(),
                "existing non-object value at an intermediate path segment",
            ));
        }
        _ => ToonMap::new(),
    };
    insert_path(&mut nested, &segments[1..], value, strict, full_path)?;
    map.insert(head.to_string(), Value::Object(nested));
    Ok(())
}

fn merge_key(map: &mut ToonMap, key: String, value: Value, strict: bool) -> Result<()> {
    match map.get(&key) {
        Some(Value::Object(existing)) => {
            if let Value::Object(incoming) = value {
                let mut merged = existing.clone();
                for (k, v) in incoming {
                    merge_key(&mut merged, k, v, strict)?;
                }
                map.insert(key, Value::Object(merged));
            } else if strict {
                return Err(Error::path_expansion_conflict(key, "conflicting value at path"));
            } else {
                map.insert(key, value);
            }
        }
        Some(_) if strict => {
            return Err(Error::path_expansion_conflict(key, "conflicting value at path"));
        }
        _ => {
            map.insert(key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_lines;
    use crate::options::{EncodeOptions, KeyFolding};

    #[test]
    fn decodes_flat_object() {
        let v = decode("name: Alice\nage: 30\n", &DecodeOptions::default()).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.get("name"), Some(&Value::from("Alice")));
        assert_eq!(obj.get("age"), Some(&Value::number(30.0)));
    }

    #[test]
    fn decodes_inline_primitive_array() {
        let v = decode("tags[2]: dev,clj\n", &DecodeOptions::default()).unwrap();
        let obj = v.as_object().unwrap();
        let tags = obj.get("tags").unwrap().as_array().unwrap();
        assert_eq!(tags, &vec![Value::from("dev"), Value::from("clj")]);
    }

    #[test]
    fn decodes_tabular_array() {
        let text = "[2]{id,name}:\n  1,Alice\n  2,Bob";
        let v = decode(text, &DecodeOptions::default()).unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(
            arr[0].as_object().unwrap().get("name"),
            Some(&Value::from("Alice"))
        );
    }

    #[test]
    fn decodes_list_with_nested_object() {
        let text = "items[2]:\n  - name: Laptop\n    price: 999\n  - name: Mouse\n    price: 29";
        let v = decode(text, &DecodeOptions::default()).unwrap();
        let items = v.as_object().unwrap().get("items").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].as_object().unwrap().get("price"),
            Some(&Value::number(999.0))
        );
    }

    #[test]
    fn strict_mode_rejects_length_mismatch() {
        let err = decode("tags[3]: a,b\n", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ArrayLengthMismatch { .. }));
    }

    #[test]
    fn non_strict_tolerates_length_mismatch() {
        let lenient = DecodeOptions::default().with_strict(false);
        let v = decode("tags[3]: a,b\n", &lenient).unwrap();
        assert_eq!(v.as_object().unwrap().get("tags").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn root_primitive_document() {
        let v = decode("42", &DecodeOptions::default()).unwrap();
        assert_eq!(v, Value::number(42.0));
    }

    #[test]
    fn root_empty_array_document() {
        let v = decode("[0]", &DecodeOptions::default()).unwrap();
        assert_eq!(v, Value::Array(Vec::new()));
    }

    #[test]
    fn empty_document_decodes_to_empty_object() {
        let v = decode("", &DecodeOptions::default()).unwrap();
        assert_eq!(v, Value::Object(ToonMap::new()));
    }

    #[test]
    fn path_expansion_rebuilds_nested_object() {
        let text = "data.config.server: localhost";
        let options = DecodeOptions::default().with_expand_paths(PathExpansion::Safe);
        let v = decode(text, &options).unwrap();
        let data = v.as_object().unwrap().get("data").unwrap().as_object().unwrap();
        let config = data.get("config").unwrap().as_object().unwrap();
        assert_eq!(config.get("server"), Some(&Value::from("localhost")));
    }

    #[test]
    fn collapse_then_expand_round_trips() {
        let mut inner = ToonMap::new();
        inner.insert("server".into(), Value::from("localhost"));
        let mut config = ToonMap::new();
        config.insert("config".into(), Value::Object(inner));
        let mut data = ToonMap::new();
        data.insert("data".into(), Value::Object(config));
        let original = Value::Object(data);

        let encode_options = EncodeOptions::default().with_key_folding(KeyFolding::Safe);
        let lines = encode_lines(&original, &encode_options).unwrap();
        let text = lines.join("\n");

        let decode_options = DecodeOptions::default().with_expand_paths(PathExpansion::Safe);
        let decoded = decode(&text, &decode_options).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn bare_list_item_with_continuation_lines_is_rejected() {
        let text = "items[2]:\n  - Alice\n    role: admin\n  - Bob";
        let err = decode(text, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidObjectListItem { .. }));
    }

    #[test]
    fn row_vs_key_value_heuristic_stops_tabular_block() {
        let text = "rows[2]{a,b}:\n  1,2\n  3,4\nc: 5";
        let v = decode(text, &DecodeOptions::default()).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.get("rows").unwrap().as_array().unwrap().len(), 2);
        assert_eq!(obj.get("c"), Some(&Value::number(5.0)));
    }
}
