//! Customizing TOON output with EncodeOptions.
//!
//! Run with: cargo run --example custom_options

use std::error::Error;
use toon::{encode, toon, Delimiter, EncodeOptions};

fn main() -> Result<(), Box<dyn Error>> {
    let config = toon!({
        "name": "MyApp",
        "version": "1.0.0",
        "debug": true
    });

    println!("Default (comma):");
    println!("{}\n", encode(&config, &EncodeOptions::default())?);

    let rows = toon!([
        {"id": 1, "value": "test", "active": true},
        {"id": 2, "value": "prod", "active": false}
    ]);

    println!("Tab delimiter:");
    let tab_options = EncodeOptions::default().with_delimiter(Delimiter::Tab);
    println!("{}\n", encode(&rows, &tab_options)?);

    println!("Pipe delimiter:");
    let pipe_options = EncodeOptions::default().with_delimiter(Delimiter::Pipe);
    println!("{}\n", encode(&rows, &pipe_options)?);

    Ok(())
}
