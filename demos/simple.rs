//! Basic TOON encoding and decoding.
//!
//! Run with: cargo run --example simple

use std::error::Error;
use toon::{decode, encode, DecodeOptions, EncodeOptions, ToonMap, Value};

fn user(id: f64, name: &str, email: &str) -> Value {
    let mut m = ToonMap::new();
    m.insert("id".into(), Value::number(id));
    m.insert("name".into(), Value::from(name));
    m.insert("email".into(), Value::from(email));
    Value::Object(m)
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = Value::Array(vec![
        user(42.0, "Alice Johnson", "alice@example.com"),
        user(43.0, "Bob Smith", "bob@example.com"),
    ]);

    let text = encode(&users, &EncodeOptions::default())?;
    println!("TOON output:\n{text}\n");

    let back = decode(&text, &DecodeOptions::default())?;
    assert_eq!(users, back);
    println!("✓ Round-trip successful");

    Ok(())
}
