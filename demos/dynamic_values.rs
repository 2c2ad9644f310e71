//! Working with Value for runtime flexibility.
//!
//! Run with: cargo run --example dynamic_values

use std::error::Error;
use toon::{encode, toon, EncodeOptions, ToonMap, Value};

fn main() -> Result<(), Box<dyn Error>> {
    let opts = EncodeOptions::default();

    let config = toon!({
        "host": "localhost",
        "port": 8080,
        "features": ["auth", "logging", "metrics"],
        "debug": true
    });

    println!("Config as TOON:\n{}\n", encode(&config, &opts)?);

    if let Value::Object(obj) = &config {
        if let Some(Value::String(host)) = obj.get("host") {
            println!("Accessing field 'host': {host}");
        }

        if let Some(port) = obj.get("port").and_then(Value::as_f64) {
            println!("Accessing field 'port': {port}");
        }

        if let Some(Value::Array(features)) = obj.get("features") {
            println!("Accessing field 'features': {} items\n", features.len());
        }
    }

    let mut user = ToonMap::new();
    user.insert("id".into(), Value::number(123.0));
    user.insert("name".into(), Value::from("Alice"));
    user.insert(
        "roles".into(),
        Value::Array(vec![Value::from("admin"), Value::from("developer")]),
    );
    let user_value = Value::Object(user);

    println!("User as Value:\n{}\n", encode(&user_value, &opts)?);

    println!("Type checks:");
    println!("  is_object: {}", user_value.is_object());
    println!("  is_array:  {}", user_value.is_array());
    println!("  is_string: {}", user_value.is_string());

    Ok(())
}
