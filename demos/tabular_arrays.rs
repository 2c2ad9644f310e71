//! Tabular array format for homogeneous collections.
//!
//! Run with: cargo run --example tabular_arrays

use std::error::Error;
use toon::{decode, encode, DecodeOptions, EncodeOptions, ToonMap, Value};

fn product(sku: &str, name: &str, price: f64, in_stock: bool) -> Value {
    let mut m = ToonMap::new();
    m.insert("sku".into(), Value::from(sku));
    m.insert("name".into(), Value::from(name));
    m.insert("price".into(), Value::number(price));
    m.insert("in_stock".into(), Value::Bool(in_stock));
    Value::Object(m)
}

fn main() -> Result<(), Box<dyn Error>> {
    let products = Value::Array(vec![
        product("WIDGET-001", "Super Widget", 29.99, true),
        product("GADGET-002", "Mega Gadget", 49.99, false),
        product("TOOL-003", "Ultra Tool", 19.99, true),
    ]);

    let text = encode(&products, &EncodeOptions::default())?;
    println!("TOON tabular output:\n{text}\n");

    let products_back = decode(&text, &DecodeOptions::default())?;
    assert_eq!(products, products_back);
    println!("✓ Round-trip successful");

    Ok(())
}
