use toon::{decode, encode, DecodeOptions, EncodeOptions, ToonMap, Value};

fn user(id: f64, name: &str, active: bool, tags: &[&str]) -> Value {
    let mut m = ToonMap::new();
    m.insert("id".into(), Value::number(id));
    m.insert("name".into(), Value::from(name));
    m.insert("active".into(), Value::Bool(active));
    m.insert(
        "tags".into(),
        Value::Array(tags.iter().map(|t| Value::from(*t)).collect()),
    );
    Value::Object(m)
}

fn product(sku: &str, price: f64, quantity: f64) -> Value {
    let mut m = ToonMap::new();
    m.insert("sku".into(), Value::from(sku));
    m.insert("price".into(), Value::number(price));
    m.insert("quantity".into(), Value::number(quantity));
    Value::Object(m)
}

fn roundtrip(value: &Value) -> Value {
    let text = encode(value, &EncodeOptions::default()).unwrap();
    decode(&text, &DecodeOptions::default()).unwrap()
}

#[test]
fn simple_object_roundtrips() {
    let u = user(123.0, "Alice", true, &["admin", "developer"]);
    let back = roundtrip(&u);
    assert_eq!(u, back);
}

#[test]
fn nested_object_roundtrips() {
    let mut order = ToonMap::new();
    order.insert("order_id".into(), Value::number(12345.0));
    order.insert("customer".into(), user(123.0, "Alice", true, &["vip"]));
    order.insert(
        "items".into(),
        Value::Array(vec![
            product("WIDGET-001", 29.99, 2.0),
            product("GADGET-002", 49.99, 1.0),
        ]),
    );
    order.insert("total".into(), Value::number(109.97));
    let order = Value::Object(order);

    let text = encode(&order, &EncodeOptions::default()).unwrap();
    println!("Order TOON:\n{text}");
    let back = decode(&text, &DecodeOptions::default()).unwrap();
    assert_eq!(order, back);
}

#[test]
fn array_of_objects_roundtrips() {
    let products = Value::Array(vec![
        product("A001", 10.99, 5.0),
        product("B002", 15.99, 3.0),
        product("C003", 20.99, 1.0),
    ]);

    let text = encode(&products, &EncodeOptions::default()).unwrap();
    println!("Products TOON:\n{text}");
    let back = decode(&text, &DecodeOptions::default()).unwrap();
    assert_eq!(products, back);
}

#[test]
fn primitives_roundtrip() {
    assert_eq!(roundtrip(&Value::number(42.0)), Value::number(42.0));
    assert_eq!(roundtrip(&Value::number(3.5)), Value::number(3.5));
    assert_eq!(roundtrip(&Value::Bool(true)), Value::Bool(true));
    assert_eq!(roundtrip(&Value::Bool(false)), Value::Bool(false));
    assert_eq!(
        roundtrip(&Value::from("hello world")),
        Value::from("hello world")
    );
    let nums = Value::Array(vec![
        Value::number(1.0),
        Value::number(2.0),
        Value::number(3.0),
        Value::number(4.0),
        Value::number(5.0),
    ]);
    assert_eq!(roundtrip(&nums), nums);
}

#[test]
fn delimiter_options_roundtrip() {
    let u = user(123.0, "Alice", true, &["admin", "developer"]);

    for delimiter in [toon::Delimiter::Tab, toon::Delimiter::Pipe] {
        let options = EncodeOptions::default().with_delimiter(delimiter);
        let text = encode(&u, &options).unwrap();
        let back = decode(&text, &DecodeOptions::default()).unwrap();
        assert_eq!(u, back);
    }
}

#[test]
fn empty_collections_roundtrip() {
    let empty_array = Value::Array(vec![]);
    assert_eq!(roundtrip(&empty_array), empty_array);

    let empty_object = Value::Object(ToonMap::new());
    assert_eq!(roundtrip(&empty_object), empty_object);
}

#[test]
fn special_strings_roundtrip() {
    let special_strings = [
        "",
        "hello, world",
        "line1\nline2",
        "tab\there",
        "pipe|here",
        " leading space",
        "trailing space ",
        "true",
        "false",
        "null",
        "123",
        "3.5",
        "\"quoted\"",
    ];

    for s in special_strings {
        let value = Value::from(s);
        assert_eq!(roundtrip(&value), value, "failed for {s:?}");
    }
}

#[test]
fn numbers_roundtrip() {
    let numbers = [
        0.0,
        127.0,
        -128.0,
        32767.0,
        -32768.0,
        2147483647.0,
        -2147483648.0,
        0.0,
        3.5,
        -2.5,
        4.25,
        -5.75,
    ];

    for n in numbers {
        let value = Value::number(n);
        assert_eq!(roundtrip(&value), value, "failed for {n}");
    }
}

#[test]
fn negative_zero_normalizes_to_zero() {
    let value = Value::number(-0.0);
    assert_eq!(value, Value::number(0.0));
    let text = encode(&value, &EncodeOptions::default()).unwrap();
    assert_eq!(text, "0");
}
