//! TOON vs JSON token efficiency comparison.
//!
//! Run with: cargo run --example token_efficiency

use std::error::Error;
use toon::{encode, toon, EncodeOptions};

fn main() -> Result<(), Box<dyn Error>> {
    let response = toon!({
        "users": [
            {"id": 1, "name": "Alice Johnson", "email": "alice@example.com", "active": true},
            {"id": 2, "name": "Bob Smith", "email": "bob@example.com", "active": true},
            {"id": 3, "name": "Charlie Brown", "email": "charlie@example.com", "active": false}
        ],
        "total": 3,
        "page": 1
    });

    let json = serde_json::json!({
        "users": [
            {"id": 1, "name": "Alice Johnson", "email": "alice@example.com", "active": true},
            {"id": 2, "name": "Bob Smith", "email": "bob@example.com", "active": true},
            {"id": 3, "name": "Charlie Brown", "email": "charlie@example.com", "active": false}
        ],
        "total": 3,
        "page": 1
    });
    let json_text = serde_json::to_string_pretty(&json)?;
    println!("JSON ({} chars):\n{}\n", json_text.len(), json_text);

    let toon_text = encode(&response, &EncodeOptions::default())?;
    println!("TOON ({} chars):\n{}\n", toon_text.len(), toon_text);

    let savings = ((json_text.len() - toon_text.len()) as f64 / json_text.len() as f64) * 100.0;
    println!(
        "✓ Token savings: {:.1}% ({} → {} chars)",
        savings,
        json_text.len(),
        toon_text.len()
    );

    Ok(())
}
