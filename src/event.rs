//! The event model (§3) and the Event Stream + Builder (§4.9).
//!
//! The emitter walks the same line/cursor substrate as the structural
//! decoder but produces a flat `Event` sequence instead of a value tree;
//! the builder is its exact inverse. Rather than a true zero-allocation
//! coroutine (Rust has no stable generators), the emitter walks eagerly
//! into a queue that `EventStream` then drains one event at a time — the
//! public surface is the same pull-based iterator the spec describes, at
//! the cost of holding the whole event sequence in memory at once.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::map::ToonMap;
use crate::options::{DecodeOptions, Delimiter, PathExpansion};
use crate::scanner::{scan, LineCursor, ParsedLine};
use crate::tokens::{
    find_unquoted_char, looks_like_array_header, parse_array_header_line, parse_key_token,
    parse_primitive, split_delimited_row, ArrayHeader,
};
use crate::value::Value;

/// One observation from the streaming decoder (§3 `Event`).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartObject,
    EndObject,
    StartArray { length: usize },
    EndArray,
    Key { name: String, was_quoted: bool },
    Primitive { value: Value },
}

/// A finite, single-pass pull iterator over a decode's event sequence.
pub struct EventStream {
    events: VecDeque<Event>,
}

impl Iterator for EventStream {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.events.pop_front()
    }
}

/// Emits the event sequence for `text` (§4.9). Path expansion does not
/// apply to the event surface — it's a value-tree transform, applied (if
/// requested) by `events_to_value` only when building a full tree.
pub fn events(text: &str, options: &DecodeOptions) -> Result<EventStream> {
    let (lines, blanks) = scan(text, options)?;
    let mut out = VecDeque::new();
    emit_root(&lines, &blanks, options, &mut out)?;
    Ok(EventStream { events: out })
}

/// `events->value` (§6): builds a value tree from an event sequence with
/// an explicit stack, then applies path expansion if requested.
pub fn events_to_value(events: impl IntoIterator<Item = Event>, options: &DecodeOptions) -> Result<Value> {
    let value = build_from_events(events)?;
    match options.expand_paths {
        PathExpansion::Off => Ok(value),
        PathExpansion::Safe => crate::decode::expand_paths(value, options.strict),
    }
}

enum Frame {
    Object(ToonMap, Option<String>),
    Array(Vec<Value>),
}

fn build_from_events(events: impl IntoIterator<Item = Event>) -> Result<Value> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    for event in events {
        match event {
            Event::StartObject => stack.push(Frame::Object(ToonMap::new(), None)),
            Event::StartArray { .. } => stack.push(Frame::Array(Vec::new())),
            Event::Key { name, .. } => match stack.last_mut() {
                Some(Frame::Object(_, pending)) => *pending = Some(name),
                _ => return Err(Error::malformed_event_stream("key event without an open object")),
            },
            Event::Primitive { value } => attach(&mut stack, &mut root, value)?,
            Event::EndObject => {
                let Some(Frame::Object(map, pending)) = stack.pop() else {
                    return Err(Error::malformed_event_stream("end-object without matching start-object"));
                };
                if pending.is_some() {
                    return Err(Error::malformed_event_stream("end-object with a dangling pending key"));
                }
                attach(&mut stack, &mut root, Value::Object(map))?;
            }
            Event::EndArray => {
                let Some(Frame::Array(items)) = stack.pop() else {
                    return Err(Error::malformed_event_stream("end-array without matching start-array"));
                };
                attach(&mut stack, &mut root, Value::Array(items))?;
            }
        }
    }

    if !stack.is_empty() {
        return Err(Error::malformed_event_stream("unclosed scope at end of stream"));
    }
    root.ok_or_else(|| Error::malformed_event_stream("empty event stream"))
}

fn attach(stack: &mut [Frame], root: &mut Option<Value>, value: Value) -> Result<()> {
    match stack.last_mut() {
        Some(Frame::Object(map, pending)) => {
            let key = pending
                .take()
                .ok_or_else(|| Error::malformed_event_stream("value without a preceding key"))?;
            map.insert(key, value);
            Ok(())
        }
        Some(Frame::Array(items)) => {
            items.push(value);
            Ok(())
        }
        None => {
            *root = Some(value);
            Ok(())
        }
    }
}

fn emit_root(
    lines: &[ParsedLine],
    blanks: &[crate::scanner::BlankLine],
    options: &DecodeOptions,
    out: &mut VecDeque<Event>,
) -> Result<()> {
    let Some(first) = lines.first() else {
        out.push_back(Event::StartObject);
        out.push_back(Event::EndObject);
        return Ok(());
    };

    let mut cursor = LineCursor::new(lines, blanks);

    if is_empty_array_header(&first.content) {
        out.push_back(Event::StartArray { length: 0 });
        out.push_back(Event::EndArray);
        return Ok(());
    }

    if first.content.starts_with('[')
        && first.content.contains(']')
        && find_unquoted_char(&first.content, ':').is_some()
    {
        let header = parse_array_header_line(&first.content, first.line_number, Delimiter::Comma)?
            .ok_or_else(|| Error::invalid_array_header(first.line_number, 0, "expected array header"))?;
        cursor.advance();
        return emit_array(&header, first.line_number, &mut cursor, 1, options, out);
    }

    if lines.len() == 1 && find_unquoted_char(&first.content, ':').is_none() {
        let value = parse_primitive(&first.content, first.line_number, options.strict)?;
        out.push_back(Event::Primitive { value });
        return Ok(());
    }

    out.push_back(Event::StartObject);
    emit_object(&mut cursor, 0, options, out)?;
    out.push_back(Event::EndObject);
    Ok(())
}

fn is_empty_array_header(content: &str) -> bool {
    let Some(inner) = content.strip_prefix('[').and_then(|r| r.strip_suffix(']')) else {
        return false;
    };
    inner == "0" || inner == "0\t" || inner == "0|" || inner == "0,"
}

fn emit_object(cursor: &mut LineCursor, depth: usize, options: &DecodeOptions, out: &mut VecDeque<Event>) -> Result<()> {
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
            out.push_back(Event::Key {
                name: header.key.clone().unwrap_or_default(),
                was_quoted: false,
            });
            emit_array(&header, line_number, cursor, depth + 1, options, out)?;
            continue;
        }

        let (key, value_start, was_quoted) = parse_key_token(&content, line_number)?;
        let value_part = content[value_start..].trim();
        out.push_back(Event::Key { name: key, was_quoted });

        if value_part.is_empty() {
            cursor.advance();
            if cursor.peek().is_some_and(|l| l.depth > depth) {
                out.push_back(Event::StartObject);
                emit_object(cursor, depth + 1, options, out)?;
                out.push_back(Event::EndObject);
            } else {
                out.push_back(Event::Primitive { value: Value::Null });
            }
            continue;
        }

        let value = parse_primitive(value_part, line_number, options.strict)?;
        cursor.advance();
        out.push_back(Event::Primitive { value });
    }

    Ok(())
}

fn emit_array(
    header: &ArrayHeader,
    line_number: usize,
    cursor: &mut LineCursor,
    depth: usize,
    options: &DecodeOptions,
    out: &mut VecDeque<Event>,
) -> Result<()> {
    if let Some(raw) = &header.inline_values {
        let cells = split_delimited_row(raw, header.delimiter.as_char());
        if options.strict && cells.len() != header.length {
            return Err(Error::array_length_mismatch(line_number, header.length, cells.len()));
        }
        out.push_back(Event::StartArray { length: header.length });
        for cell in &cells {
            let value = parse_primitive(cell, line_number, options.strict)?;
            out.push_back(Event::Primitive { value });
        }
        out.push_back(Event::EndArray);
        return Ok(());
    }

    if let Some(fields) = &header.fields {
        let mut rows = 0usize;
        let mut pending = VecDeque::new();
        while let Some(line) = cursor.peek_at_depth(depth) {
            let next = cursor.peek_nth_at_depth(1, depth);
            if !classify_row(&line.content, next, header.delimiter.as_char()) {
                break;
            }
            let cells = split_delimited_row(&line.content, header.delimiter.as_char());
            pending.push_back(Event::StartObject);
            for (field, cell) in fields.iter().zip(cells.iter()) {
                pending.push_back(Event::Key {
                    name: field.clone(),
                    was_quoted: false,
                });
                pending.push_back(Event::Primitive {
                    value: parse_primitive(cell, line.line_number, options.strict)?,
                });
            }
            pending.push_back(Event::EndObject);
            rows += 1;
            cursor.advance();
        }
        if options.strict && rows != header.length {
            return Err(Error::tabular_array_length_mismatch(line_number, header.length, rows));
        }
        out.push_back(Event::StartArray { length: header.length });
        out.extend(pending);
        out.push_back(Event::EndArray);
        return Ok(());
    }

    let mut items = 0usize;
    let mut pending = VecDeque::new();
    while let Some(line) = cursor.peek_at_depth(depth) {
        if line.content != "-" && !line.content.starts_with("- ") {
            break;
        }
        emit_list_item(cursor, depth, options, &mut pending)?;
        items += 1;
    }
    if options.strict && items != header.length {
        return Err(Error::list_array_length_mismatch(line_number, header.length, items));
    }
    out.push_back(Event::StartArray { length: header.length });
    out.extend(pending);
    out.push_back(Event::EndArray);
    Ok(())
}

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

fn emit_list_item(cursor: &mut LineCursor, depth: usize, options: &DecodeOptions, out: &mut VecDeque<Event>) -> Result<()> {
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
            out.push_back(Event::StartObject);
            emit_object(cursor, depth + 1, options, out)?;
            out.push_back(Event::EndObject);
        } else {
            out.push_back(Event::Primitive { value: Value::Null });
        }
        return Ok(());
    }

    if looks_like_array_header(rest) {
        let header = parse_array_header_line(rest, line_number, Delimiter::Comma)?
            .ok_or_else(|| Error::invalid_array_header(line_number, 2, "expected array header"))?;

        match &header.key {
            Some(key) => {
                out.push_back(Event::StartObject);
                out.push_back(Event::Key {
                    name: key.clone(),
                    was_quoted: false,
                });
                emit_array(&header, line_number, cursor, depth + 1, options, out)?;
                emit_object(cursor, depth + 1, options, out)?;
                out.push_back(Event::EndObject);
            }
            None => emit_array(&header, line_number, cursor, depth + 1, options, out)?,
        }
        return Ok(());
    }

    if find_unquoted_char(rest, ':').is_some() {
        let (key, value_start, was_quoted) = parse_key_token(rest, line_number)?;
        let value_part = rest[value_start..].trim();

        out.push_back(Event::StartObject);
        out.push_back(Event::Key { name: key, was_quoted });

        if value_part.is_empty() {
            if cursor.peek().is_some_and(|l| l.depth > depth + 1) {
                out.push_back(Event::StartObject);
                emit_object(cursor, depth + 2, options, out)?;
                out.push_back(Event::EndObject);
            } else {
                out.push_back(Event::Primitive { value: Value::Null });
            }
        } else {
            let value = parse_primitive(value_part, line_number, options.strict)?;
            out.push_back(Event::Primitive { value });
        }

        emit_object(cursor, depth + 1, options, out)?;
        out.push_back(Event::EndObject);
        return Ok(());
    }

    if cursor.peek().is_some_and(|l| l.depth > depth) {
        return Err(Error::invalid_object_list_item(line_number));
    }

    let value = parse_primitive(rest, line_number, options.strict)?;
    out.push_back(Event::Primitive { value });
    Ok(())
}

#[cfg(feature = "async")]
pub mod r#async {
    //! Queue/channel adapter over the event stream (§4.9, §5). Runs the
    //! (synchronous, single-threaded) emitter to completion inside a
    //! spawned task and forwards its events over a bounded `mpsc` channel,
    //! so a consumer on another task can pull with backpressure.

    use tokio::sync::mpsc;

    use super::{events, Event};
    use crate::error::Result;
    use crate::options::DecodeOptions;

    /// Spawns the emitter onto the current Tokio runtime and returns the
    /// receiving half of a bounded channel. The channel closes once the
    /// emitter finishes or errors; an error is delivered as the final item.
    pub fn event_channel(
        text: String,
        options: DecodeOptions,
        buffer: usize,
    ) -> mpsc::Receiver<Result<Event>> {
        let (tx, rx) = mpsc::channel(buffer);
        tokio::task::spawn_blocking(move || {
            let stream = match events(&text, &options) {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = tx.blocking_send(Err(err));
                    return;
                }
            };
            for event in stream {
                if tx.blocking_send(Ok(event)).is_err() {
                    return;
                }
            }
        });
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_object_events_balance() {
        let stream = events("name: Alice\nage: 30\n", &DecodeOptions::default()).unwrap();
        let collected: Vec<_> = stream.collect();
        assert_eq!(
            collected,
            vec![
                Event::StartObject,
                Event::Key {
                    name: "name".into(),
                    was_quoted: false
                },
                Event::Primitive {
                    value: Value::from("Alice")
                },
                Event::Key {
                    name: "age".into(),
                    was_quoted: false
                },
                Event::Primitive {
                    value: Value::number(30.0)
                },
                Event::EndObject,
            ]
        );
    }

    #[test]
    fn events_to_value_matches_decode() {
        let text = "items[2]:\n  - name: Laptop\n    price: 999\n  - name: Mouse\n    price: 29";
        let options = DecodeOptions::default();
        let stream = events(text, &options).unwrap();
        let via_events = events_to_value(stream, &options).unwrap();
        let via_decode = crate::decode::decode(text, &options).unwrap();
        assert_eq!(via_events, via_decode);
    }

    #[test]
    fn malformed_stream_is_rejected() {
        let bad = vec![Event::EndObject];
        let err = build_from_events(bad).unwrap_err();
        assert!(matches!(err, Error::MalformedEventStream { .. }));
    }

    #[test]
    fn bare_list_item_with_continuation_lines_is_rejected() {
        let text = "items[2]:\n  - Alice\n    role: admin\n  - Bob";
        let err = events(text, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidObjectListItem { .. }));
    }

    #[test]
    fn tabular_array_events_balance() {
        let text = "[2]{id,name}:\n  1,Alice\n  2,Bob";
        let stream = events(text, &DecodeOptions::default()).unwrap();
        let collected: Vec<_> = stream.collect();
        assert_eq!(collected.first(), Some(&Event::StartArray { length: 2 }));
        assert_eq!(collected.last(), Some(&Event::EndArray));
    }
}
