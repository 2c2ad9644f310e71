//! The line buffer the encoder writes through (§4.2).

use crate::quoting::{valid_unquoted_key, wrap};

/// Accumulates output lines at a fixed indent unit. `finish` joins them with
/// `\n`, producing a string with no trailing newline and no trailing spaces
/// on any line.
pub struct Writer {
    indent_unit: usize,
    lines: Vec<String>,
}

impl Writer {
    pub fn new(indent_unit: usize) -> Self {
        Writer {
            indent_unit,
            lines: Vec::new(),
        }
    }

    /// Appends one logical line at `depth`, trimming any trailing
    /// whitespace the caller's content happened to carry.
    pub fn push_line(&mut self, depth: usize, content: &str) {
        let indent = " ".repeat(depth * self.indent_unit);
        self.lines.push(format!("{indent}{}", content.trim_end()));
    }

    /// Encodes `key` as an object-field key, quoting it if it fails
    /// `valid-unquoted-key?`.
    pub fn encode_key(key: &str) -> String {
        if valid_unquoted_key(key) {
            key.to_string()
        } else {
            wrap(key)
        }
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
