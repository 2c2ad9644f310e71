//! The encoder (§4.3 arrays, §4.4 objects + key collapser).

use std::collections::HashSet;

use crate::error::Result;
use crate::map::ToonMap;
use crate::options::{Delimiter, EncodeOptions, KeyFolding};
use crate::quoting::{is_identifier_segment, needs_quoting, wrap};
use crate::value::Value;
use crate::writer::Writer;

/// Encodes `value` to a TOON string (no trailing newline).
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<String> {
    Ok(encode_lines(value, options)?.join("\n"))
}

/// Encodes `value` to an ordered sequence of lines (§6 `encode-lines`).
pub fn encode_lines(value: &Value, options: &EncodeOptions) -> Result<Vec<String>> {
    let root = apply_replacer(value, "", &[], options).unwrap_or_else(|| value.clone());

    if root.is_primitive() {
        return Ok(vec![encode_primitive(&root, options.delimiter.as_char())]);
    }

    let mut writer = Writer::new(options.indent);
    match &root {
        Value::Array(arr) => encode_array(None, arr, &mut writer, 0, options, &[]),
        Value::Object(obj) => {
            let root_literal_keys = root_dotted_keys(obj);
            encode_object(obj, &mut writer, 0, options, &root_literal_keys, &[])
        }
        _ => unreachable!("primitives handled above"),
    }
    Ok(writer.into_lines())
}

/// Runs the replacer (if any) on a single `(key, value, path)` triple (§6).
/// `None` means "omit"; at the synthetic root the caller treats `None` as
/// "leave the value unchanged" instead, since there's nothing to omit it
/// from.
fn apply_replacer(value: &Value, key: &str, path: &[String], options: &EncodeOptions) -> Option<Value> {
    match &options.replacer {
        Some(f) => f(key, value, path),
        None => Some(value.clone()),
    }
}

/// Runs the replacer pre-order over every field of `obj`, dropping fields
/// where it returns `None` (§6). The only place object fields get replaced;
/// every caller that needs an object's fields goes through this first.
fn replace_object_fields(obj: &ToonMap, path: &[String], options: &EncodeOptions) -> Vec<(String, Value)> {
    obj.iter()
        .filter_map(|(k, v)| {
            let mut child_path = path.to_vec();
            child_path.push(k.clone());
            apply_replacer(v, k, &child_path, options).map(|replaced| (k.clone(), replaced))
        })
        .collect()
}

/// Runs the replacer pre-order over every element of `arr`, keyed by its
/// stringified index, dropping elements where it returns `None` (§6). Pairs
/// each surviving element with its own path so deeper recursion (tabular
/// cells, list items) can keep building on it.
fn replace_array_elements(arr: &[Value], path: &[String], options: &EncodeOptions) -> Vec<(Vec<String>, Value)> {
    arr.iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let index_key = i.to_string();
            let mut child_path = path.to_vec();
            child_path.push(index_key.clone());
            apply_replacer(v, &index_key, &child_path, options).map(|replaced| (child_path, replaced))
        })
        .collect()
}

fn root_dotted_keys(obj: &ToonMap) -> HashSet<String> {
    obj.keys().filter(|k| k.contains('.')).cloned().collect()
}

fn encode_primitive(value: &Value, delimiter: char) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => {
            if needs_quoting(s, delimiter) {
                wrap(s)
            } else {
                s.clone()
            }
        }
        _ => unreachable!("encode_primitive called on a non-primitive value"),
    }
}

/// Renders a finite double without scientific notation, matching §6's
/// "no scientific notation: 1000000 not 1e6" rule, and without a trailing
/// `.0` for integral values.
fn format_number(n: f64) -> String {
    if n.is_nan() || n.is_infinite() {
        return "null".to_string();
    }
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let mut s = format!("{n}");
        if s.contains('e') || s.contains('E') {
            s = format!("{n:.}");
        }
        s
    }
}

fn header_marker(delimiter: Delimiter) -> String {
    match delimiter.marker() {
        Some(m) => m.to_string(),
        None => String::new(),
    }
}

fn format_array_header(
    length: usize,
    key: Option<&str>,
    fields: Option<&[String]>,
    delimiter: Delimiter,
) -> String {
    let key_part = key.map(Writer::encode_key).unwrap_or_default();
    let marker = header_marker(delimiter);
    let fields_part = match fields {
        Some(fields) => {
            let joined = fields
                .iter()
                .map(|f| Writer::encode_key(f))
                .collect::<Vec<_>>()
                .join(&delimiter.as_char().to_string());
            format!("{{{joined}}}")
        }
        None => String::new(),
    };
    format!("{key_part}[{length}{marker}]{fields_part}")
}

fn join_primitives(values: &[Value], delimiter: char) -> String {
    values
        .iter()
        .map(|v| encode_primitive(v, delimiter))
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}

struct TabularRows {
    fields: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Tabular eligibility (§4.3, §9), computed *after* the replacer has run on
/// every row's fields — a row that's ineligible only once the replacer
/// prunes/rewrites its fields falls back to list form just like one that
/// was always ineligible. `None` when any element isn't an object, or when
/// no columns survive both the replacer and the common-keys/all-primitive
/// filter.
fn tabular_rows(items: &[(Vec<String>, Value)], options: &EncodeOptions) -> Option<TabularRows> {
    let mut replaced: Vec<ToonMap> = Vec::with_capacity(items.len());
    for (path, value) in items {
        let obj = value.as_object()?;
        let mut map = ToonMap::new();
        for (k, v) in replace_object_fields(obj, path, options) {
            map.insert(k, v);
        }
        replaced.push(map);
    }

    let fields = tabular_fields(&replaced)?;
    let rows = replaced
        .iter()
        .map(|obj| {
            fields
                .iter()
                .map(|f| obj.get(f).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Some(TabularRows { fields, rows })
}

/// Tabular eligibility (§4.3, §9): the common keys across every row, minus
/// any common key whose value isn't a primitive in every row (a row value
/// cell can only hold a primitive). `None` when that leaves no columns, in
/// which case the caller falls back to list form.
fn tabular_fields(objects: &[ToonMap]) -> Option<Vec<String>> {
    let common = ToonMap::common_keys(objects);
    let fields: Vec<String> = common
        .into_iter()
        .filter(|k| objects.iter().all(|o| o.get(*k).is_some_and(Value::is_primitive)))
        .map(str::to_string)
        .collect();
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Encodes an array under `key` (`None` for an array at the document root
/// or inside a list item) at `depth`. `path` is this array's own path;
/// elements are replaced (§6) against `path` plus their stringified index
/// before anything else looks at them.
fn encode_array(
    key: Option<&str>,
    arr: &[Value],
    writer: &mut Writer,
    depth: usize,
    options: &EncodeOptions,
    path: &[String],
) {
    let items = replace_array_elements(arr, path, options);

    if items.is_empty() {
        let header = format_array_header(0, key, None, options.delimiter);
        writer.push_line(depth, &header);
        return;
    }

    if items.iter().all(|(_, v)| v.is_primitive()) {
        let header = format_array_header(items.len(), key, None, options.delimiter);
        let values: Vec<Value> = items.iter().map(|(_, v)| v.clone()).collect();
        let joined = join_primitives(&values, options.delimiter.as_char());
        writer.push_line(depth, &format!("{header}: {joined}"));
        return;
    }

    if let Some(table) = tabular_rows(&items, options) {
        let header = format_array_header(items.len(), key, Some(&table.fields), options.delimiter);
        writer.push_line(depth, &header);
        for row in &table.rows {
            let joined = join_primitives(row, options.delimiter.as_char());
            writer.push_line(depth + 1, &joined);
        }
        return;
    }

    let header = format_array_header(items.len(), key, None, options.delimiter);
    writer.push_line(depth, &header);
    for (item_path, item) in &items {
        encode_list_item(item, writer, depth + 1, options, item_path);
    }
}

fn encode_list_item(item: &Value, writer: &mut Writer, depth: usize, options: &EncodeOptions, path: &[String]) {
    match item {
        Value::Object(obj) => encode_object_as_list_item(obj, writer, depth, options, path),
        Value::Array(arr) => {
            let items = replace_array_elements(arr, path, options);
            if items.is_empty() {
                let header = format_array_header(0, None, None, options.delimiter);
                writer.push_line(depth, &format!("- {header}"));
            } else if items.iter().all(|(_, v)| v.is_primitive()) {
                let header = format_array_header(items.len(), None, None, options.delimiter);
                let values: Vec<Value> = items.iter().map(|(_, v)| v.clone()).collect();
                let joined = join_primitives(&values, options.delimiter.as_char());
                writer.push_line(depth, &format!("- {header}: {joined}"));
            } else {
                let header = format_array_header(items.len(), None, None, options.delimiter);
                writer.push_line(depth, &format!("- {header}:"));
                for (item_path, nested) in &items {
                    encode_list_item(nested, writer, depth + 1, options, item_path);
                }
            }
        }
        primitive => {
            writer.push_line(depth, &format!("- {}", encode_primitive(primitive, options.delimiter.as_char())));
        }
    }
}

fn encode_object_as_list_item(obj: &ToonMap, writer: &mut Writer, depth: usize, options: &EncodeOptions, path: &[String]) {
    let fields = replace_object_fields(obj, path, options);

    if fields.is_empty() {
        writer.push_line(depth, "-");
        return;
    }

    let mut entries = fields.iter();
    let (first_key, first_value) = entries.next().unwrap();
    let encoded_key = Writer::encode_key(first_key);
    let mut first_path = path.to_vec();
    first_path.push(first_key.clone());

    match first_value {
        Value::Array(arr) => {
            let items = replace_array_elements(arr, &first_path, options);
            if items.is_empty() {
                writer.push_line(depth, &format!("- {encoded_key}[0]"));
            } else if items.iter().all(|(_, v)| v.is_primitive()) {
                let header = format_array_header(items.len(), Some(first_key), None, options.delimiter);
                let values: Vec<Value> = items.iter().map(|(_, v)| v.clone()).collect();
                let joined = join_primitives(&values, options.delimiter.as_char());
                writer.push_line(depth, &format!("- {header}: {joined}"));
            } else {
                let header = format_array_header(items.len(), Some(first_key), None, options.delimiter);
                writer.push_line(depth, &format!("- {header}:"));
                for (item_path, nested) in &items {
                    encode_list_item(nested, writer, depth + 1, options, item_path);
                }
            }
        }
        Value::Object(nested) => {
            writer.push_line(depth, &format!("- {encoded_key}:"));
            encode_object(nested, writer, depth + 2, options, &HashSet::new(), &first_path);
        }
        primitive => {
            writer.push_line(
                depth,
                &format!("- {encoded_key}: {}", encode_primitive(primitive, options.delimiter.as_char())),
            );
        }
    }

    for (key, value) in entries {
        emit_field_value(key, value, writer, depth + 1, options, &HashSet::new(), path, &mut HashSet::new());
    }
}

/// Encodes every already-replaced field of `obj`, in insertion order, at
/// `depth`. `path` is this object's own path.
fn encode_object(
    obj: &ToonMap,
    writer: &mut Writer,
    depth: usize,
    options: &EncodeOptions,
    root_literal_keys: &HashSet<String>,
    path: &[String],
) {
    let fields = replace_object_fields(obj, path, options);
    let mut used_keys: HashSet<String> = fields.iter().map(|(k, _)| k.clone()).collect();
    for (key, value) in &fields {
        emit_field_value(key, value, writer, depth, options, root_literal_keys, path, &mut used_keys);
    }
}

/// Emits one already-replaced `(key, value)` pair: either collapsed into a
/// dotted path (§4.4) or as a plain field.
#[allow(clippy::too_many_arguments)]
fn emit_field_value(
    key: &str,
    value: &Value,
    writer: &mut Writer,
    depth: usize,
    options: &EncodeOptions,
    root_literal_keys: &HashSet<String>,
    path: &[String],
    used_keys: &mut HashSet<String>,
) {
    if options.key_folding == KeyFolding::Safe {
        if let Some((collapsed_key, terminal)) =
            try_collapse(key, value, options.flatten_depth, used_keys, root_literal_keys)
        {
            used_keys.insert(collapsed_key.clone());
            emit_collapsed(&collapsed_key, terminal, writer, depth, options, path);
            return;
        }
    }

    let mut child_path = path.to_vec();
    child_path.push(key.to_string());
    emit_field(key, value, writer, depth, options, &child_path);
}

/// Attempts to fold `key`'s single-key object chain into a dotted path
/// (§4.4). Returns the collapsed key and the terminal (non-chain-continuing)
/// value when the chain has ≥2 segments and doesn't collide with a sibling
/// or a root-literal dotted key. Walks the chain on the already-replaced
/// value; intermediate single-key wrappers are fused into one output field
/// rather than being visited as fields of their own.
fn try_collapse<'a>(
    key: &'a str,
    value: &'a Value,
    flatten_depth: usize,
    used_keys: &HashSet<String>,
    root_literal_keys: &HashSet<String>,
) -> Option<(String, &'a Value)> {
    let mut segments = vec![key];
    let mut current = value;

    while segments.len() < flatten_depth {
        let Value::Object(map) = current else { break };
        if map.len() != 1 {
            break;
        }
        let (k, v) = map.iter().next().unwrap();
        if !is_identifier_segment(k) {
            break;
        }
        segments.push(k.as_str());
        current = v;
    }

    if segments.len() < 2 {
        return None;
    }

    let collapsed = segments.join(".");
    if used_keys.contains(&collapsed) || root_literal_keys.contains(&collapsed) {
        return None;
    }
    Some((collapsed, current))
}

fn emit_collapsed(
    collapsed_key: &str,
    terminal: &Value,
    writer: &mut Writer,
    depth: usize,
    options: &EncodeOptions,
    path: &[String],
) {
    let mut child_path = path.to_vec();
    child_path.push(collapsed_key.to_string());
    emit_field(collapsed_key, terminal, writer, depth, options, &child_path);
}

fn emit_field(key: &str, value: &Value, writer: &mut Writer, depth: usize, options: &EncodeOptions, path: &[String]) {
    let encoded_key = Writer::encode_key(key);
    match value {
        Value::Array(arr) => encode_array(Some(key), arr, writer, depth, options, path),
        Value::Object(nested) if nested.is_empty() => {
            writer.push_line(depth, &format!("{encoded_key}:"));
        }
        Value::Object(nested) => {
            writer.push_line(depth, &format!("{encoded_key}:"));
            encode_object(nested, writer, depth + 1, options, &HashSet::new(), path);
        }
        primitive => {
            writer.push_line(
                depth,
                &format!("{encoded_key}: {}", encode_primitive(primitive, options.delimiter.as_char())),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::rc::Rc;

    fn obj(pairs: Vec<(&str, Value)>) -> ToonMap {
        let mut m = ToonMap::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v);
        }
        m
    }

    #[test]
    fn flat_primitive_object() {
        let v = Value::Object(obj(vec![
            ("name", Value::from("Alice")),
            ("age", Value::number(30.0)),
            (
                "tags",
                Value::Array(vec![Value::from("dev"), Value::from("clj")]),
            ),
        ]));
        let out = encode(&v, &EncodeOptions::default()).unwrap();
        assert_eq!(out, "name: Alice\nage: 30\ntags[2]: dev,clj");
    }

    #[test]
    fn tabular_uniform_array() {
        let row = |id: f64, name: &str, role: &str| {
            Value::Object(obj(vec![
                ("id", Value::number(id)),
                ("name", Value::from(name)),
                ("role", Value::from(role)),
            ]))
        };
        let v = Value::Array(vec![
            row(1.0, "Alice", "admin"),
            row(2.0, "Bob", "user"),
            row(3.0, "Carol", "user"),
        ]);
        let out = encode(&v, &EncodeOptions::default()).unwrap();
        assert_eq!(
            out,
            "[3]{id,name,role}:\n  1,Alice,admin\n  2,Bob,user\n  3,Carol,user"
        );
    }

    #[test]
    fn list_array_with_nested_objects() {
        let v = Value::Object(obj(vec![(
            "items",
            Value::Array(vec![
                Value::Object(obj(vec![
                    ("name", Value::from("Laptop")),
                    ("price", Value::number(999.0)),
                ])),
                Value::Object(obj(vec![
                    ("name", Value::from("Mouse")),
                    ("price", Value::number(29.0)),
                ])),
            ]),
        )]));
        let out = encode(&v, &EncodeOptions::default()).unwrap();
        assert_eq!(
            out,
            "items[2]:\n  - name: Laptop\n    price: 999\n  - name: Mouse\n    price: 29"
        );
    }

    #[test]
    fn quoting_necessity_for_leading_zero() {
        let v = Value::Object(obj(vec![("value", Value::from("05"))]));
        let out = encode(&v, &EncodeOptions::default()).unwrap();
        assert_eq!(out, "value: \"05\"");
    }

    #[test]
    fn key_collapse_chain() {
        let v = Value::Object(obj(vec![(
            "data",
            Value::Object(obj(vec![(
                "config",
                Value::Object(obj(vec![("server", Value::from("localhost"))])),
            )])),
        )]));
        let options = EncodeOptions::default().with_key_folding(KeyFolding::Safe);
        let out = encode(&v, &options).unwrap();
        assert_eq!(out, "data.config.server: localhost");
    }

    #[test]
    fn collapse_suppressed_on_sibling_collision() {
        let v = Value::Object(obj(vec![
            ("a", Value::Object(obj(vec![("b", Value::number(1.0))]))),
            ("a.b", Value::number(2.0)),
        ]));
        let options = EncodeOptions::default().with_key_folding(KeyFolding::Safe);
        let out = encode(&v, &options).unwrap();
        assert!(out.contains("a:\n  b: 1"));
        // "a.b" is a dotted literal key, not a collapsed chain: `valid_unquoted_key`
        // permits '.' in unquoted keys, so it's emitted bare, not `"a.b"`.
        assert!(out.contains("a.b: 2"));
    }

    #[test]
    fn negative_zero_encodes_without_sign() {
        let v = Value::Object(obj(vec![("x", Value::number(-0.0))]));
        let out = encode(&v, &EncodeOptions::default()).unwrap();
        assert_eq!(out, "x: 0");
    }

    #[test]
    fn non_uniform_objects_fall_back_to_list() {
        let v = Value::Array(vec![
            Value::Object(obj(vec![("a", Value::number(1.0))])),
            Value::Object(obj(vec![("b", Value::number(2.0))])),
        ]);
        let out = encode(&v, &EncodeOptions::default()).unwrap();
        assert!(out.starts_with("[2]:\n  - a: 1\n  - b: 2"));
    }

    #[test]
    fn empty_array_has_no_colon() {
        let v = Value::Array(vec![]);
        assert_eq!(encode(&v, &EncodeOptions::default()).unwrap(), "[0]");
    }

    #[test]
    fn replacer_leaves_root_unchanged_when_it_returns_none() {
        let v = Value::Object(obj(vec![("name", Value::from("Alice"))]));
        let options = EncodeOptions::default().with_replacer(|_k, _v, _path| None);
        let out = encode(&v, &options).unwrap();
        assert_eq!(out, "name: Alice");
    }

    #[test]
    fn replacer_omits_non_root_field_when_it_returns_none() {
        let v = Value::Object(obj(vec![
            ("name", Value::from("Alice")),
            ("password", Value::from("secret")),
        ]));
        let options = EncodeOptions::default().with_replacer(|key, value, _path| {
            if key == "password" {
                None
            } else {
                Some(value.clone())
            }
        });
        let out = encode(&v, &options).unwrap();
        assert_eq!(out, "name: Alice");
    }

    #[test]
    fn replacer_sees_array_elements_by_index_path() {
        let v = Value::Object(obj(vec![(
            "tags",
            Value::Array(vec![Value::from("dev"), Value::from("ops"), Value::from("dev")]),
        )]));
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen_inner = Rc::clone(&seen);
        let options = EncodeOptions::default().with_replacer(move |key, value, path| {
            seen_inner.borrow_mut().push((key.to_string(), path.to_vec()));
            Some(value.clone())
        });
        encode(&v, &options).unwrap();
        assert!(seen
            .borrow()
            .contains(&("1".to_string(), vec!["tags".to_string(), "1".to_string()])));
    }

    #[test]
    fn replacer_can_prune_array_elements() {
        let v = Value::Array(vec![
            Value::number(1.0),
            Value::number(2.0),
            Value::number(3.0),
        ]);
        let options = EncodeOptions::default().with_replacer(|_key, value, _path| {
            if value.as_f64() == Some(2.0) {
                None
            } else {
                Some(value.clone())
            }
        });
        let out = encode(&v, &options).unwrap();
        assert_eq!(out, "[2]: 1,3");
    }

    #[test]
    fn replacer_reaches_nested_object_fields() {
        let v = Value::Object(obj(vec![(
            "user",
            Value::Object(obj(vec![
                ("name", Value::from("Alice")),
                ("token", Value::from("abc123")),
            ])),
        )]));
        let options = EncodeOptions::default().with_replacer(|key, value, _path| {
            if key == "token" {
                None
            } else {
                Some(value.clone())
            }
        });
        let out = encode(&v, &options).unwrap();
        assert_eq!(out, "user:\n  name: Alice");
    }
}
