//! Error types for TOON encoding and decoding.
//!
//! Every variant that can arise mid-parse carries a `line`/`column` position
//! (1-based line, the column is a segment index within the line rather than
//! a byte offset, since most of these errors point at a bracket segment or
//! an escape rather than a single character). All errors are fatal for the
//! call that raised them — there is no partial tree to recover.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("line {line}: invalid indentation: {message}")]
    InvalidIndentation { line: usize, message: String },

    #[error("line {line}, col {column}: invalid array header: {message}")]
    InvalidArrayHeader {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("line {line}, col {column}: empty bracket segment")]
    EmptyBracketSegment { line: usize, column: usize },

    #[error("line {line}, col {column}: invalid bracket segment: {found}")]
    InvalidBracketSegment {
        line: usize,
        column: usize,
        found: String,
    },

    #[error("line {line}, col {column}: negative array length: {found}")]
    NegativeArrayLength {
        line: usize,
        column: usize,
        found: String,
    },

    #[error("line {line}: array length mismatch: expected {expected}, found {found}")]
    ArrayLengthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: tabular array length mismatch: expected {expected} rows, found {found}")]
    TabularArrayLengthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: list array length mismatch: expected {expected} items, found {found}")]
    ListArrayLengthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: invalid string literal: {message}")]
    InvalidStringLiteral { line: usize, message: String },

    #[error("line {line}: invalid escape sequence: \\{escape}")]
    InvalidEscape { line: usize, escape: char },

    #[error("line {line}: invalid object list item: expected a \"key: value\" field after \"- \"")]
    InvalidObjectListItem { line: usize },

    #[error("path expansion conflict at \"{path}\": {message}")]
    PathExpansionConflict { path: String, message: String },

    #[error("malformed event stream: {message}")]
    MalformedEventStream { message: String },
}

impl Error {
    pub fn invalid_indentation(line: usize, message: impl Into<String>) -> Self {
        Error::InvalidIndentation {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_array_header(line: usize, column: usize, message: impl Into<String>) -> Self {
        Error::InvalidArrayHeader {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn empty_bracket_segment(line: usize, column: usize) -> Self {
        Error::EmptyBracketSegment { line, column }
    }

    pub fn invalid_bracket_segment(line: usize, column: usize, found: impl Into<String>) -> Self {
        Error::InvalidBracketSegment {
            line,
            column,
            found: found.into(),
        }
    }

    pub fn negative_array_length(line: usize, column: usize, found: impl Into<String>) -> Self {
        Error::NegativeArrayLength {
            line,
            column,
            found: found.into(),
        }
    }

    pub fn array_length_mismatch(line: usize, expected: usize, found: usize) -> Self {
        Error::ArrayLengthMismatch {
            line,
            expected,
            found,
        }
    }

    pub fn tabular_array_length_mismatch(line: usize, expected: usize, found: usize) -> Self {
        Error::TabularArrayLengthMismatch {
            line,
            expected,
            found,
        }
    }

    pub fn list_array_length_mismatch(line: usize, expected: usize, found: usize) -> Self {
        Error::ListArrayLengthMismatch {
            line,
            expected,
            found,
        }
    }

    pub fn unterminated_string(line: usize) -> Self {
        Error::UnterminatedString { line }
    }

    pub fn invalid_string_literal(line: usize, message: impl Into<String>) -> Self {
        Error::InvalidStringLiteral {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_escape(line: usize, escape: char) -> Self {
        Error::InvalidEscape { line, escape }
    }

    pub fn invalid_object_list_item(line: usize) -> Self {
        Error::InvalidObjectListItem { line }
    }

    pub fn path_expansion_conflict(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::PathExpansionConflict {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn malformed_event_stream(message: impl Into<String>) -> Self {
        Error::MalformedEventStream {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
