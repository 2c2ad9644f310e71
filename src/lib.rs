//! # toon
//!
//! TOON (Token-Oriented Object Notation) is a textual data format that
//! represents the JSON value model with materially fewer tokens than JSON
//! when fed to large language models. It replaces JSON's brace/bracket/comma
//! redundancy with YAML-style indentation for nesting and CSV-style row
//! tables for uniform arrays.
//!
//! This crate losslessly converts between the JSON value model ([`Value`])
//! and TOON text, in both directions, plus a streaming [`Event`] surface for
//! large inputs.
//!
//! ## Key Features
//!
//! - **Token-efficient**: no braces, no per-element quoting, tabular arrays
//!   collapse repeated keys into a single header row
//! - **Lossless for the JSON value model**: object key order, negative zero,
//!   and string content round-trip exactly
//! - **Streaming decode**: an [`Event`] sequence for inputs too large (or
//!   too latency-sensitive) to build a full tree up front
//! - **No unsafe code**
//!
//! ## Quick Start
//!
//! ```rust
//! use toon::{encode, ToonMap, Value};
//!
//! let mut user = ToonMap::new();
//! user.insert("id".into(), Value::number(123.0));
//! user.insert("name".into(), Value::from("Alice"));
//! user.insert("active".into(), Value::Bool(true));
//!
//! let text = encode(&Value::Object(user), &Default::default()).unwrap();
//! assert_eq!(text, "id: 123\nname: Alice\nactive: true");
//! ```
//!
//! ### Tabular Arrays
//!
//! Arrays of uniform objects encode as a header row plus one line per
//! element, rather than repeating every key:
//!
//! ```rust
//! use toon::{encode, toon, EncodeOptions};
//!
//! let products = toon!([
//!     {"id": 1, "name": "Widget"},
//!     {"id": 2, "name": "Gadget"}
//! ]);
//!
//! let text = encode(&products, &EncodeOptions::default()).unwrap();
//! assert_eq!(text, "[2]{id,name}:\n  1,Widget\n  2,Gadget");
//! ```
//!
//! ### Round-tripping
//!
//! ```rust
//! use toon::{decode, encode, DecodeOptions, EncodeOptions};
//!
//! let text = "name: Alice\nage: 30\ntags[2]: dev,clj";
//! let value = decode(text, &DecodeOptions::default()).unwrap();
//! let back = encode(&value, &EncodeOptions::default()).unwrap();
//! assert_eq!(text, back);
//! ```
//!
//! ## Format Reference
//!
//! See the `demos/` directory for runnable walkthroughs of tabular arrays,
//! dynamic [`Value`] construction, custom delimiters, and a token-count
//! comparison against JSON.

pub mod decode;
pub mod encode;
pub mod error;
pub mod event;
pub mod map;
pub mod macros;
pub mod options;
pub mod quoting;
pub mod scanner;
pub mod tokens;
pub mod value;
pub mod writer;

pub use decode::decode;
pub use encode::{encode, encode_lines};
pub use error::{Error, Result};
pub use event::{events, events_to_value, Event};
pub use map::ToonMap;
pub use options::{DecodeOptions, Delimiter, EncodeOptions, KeyFolding, PathExpansion};
pub use value::Value;

#[cfg(feature = "async")]
pub use event::r#async::event_channel;
