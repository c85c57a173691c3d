//! Tests for `Value` decoding and conversions.

use serde_json::json;
use ullm_core::{Object, Value};

#[test]
fn quoted_number_stays_a_string() {
    let value: Value = serde_json::from_str(r#"{"a": "42", "b": 42}"#).unwrap();
    assert_eq!(value["a"], Value::String("42".into()));
    assert_eq!(value["a"].as_i64(), None);
    assert_eq!(value["b"].as_i64(), Some(42));
}

#[test]
fn decodes_every_kind() {
    let value: Value = serde_json::from_value(json!({
        "null": null,
        "bool": true,
        "int": -7,
        "float": 1.5,
        "string": "boston",
        "array": [1, "two", false],
        "object": { "nested": { "deep": [] } },
    }))
    .unwrap();

    assert!(value["null"].is_null());
    assert_eq!(value["bool"].as_bool(), Some(true));
    assert_eq!(value["int"].as_i64(), Some(-7));
    assert_eq!(value["float"].as_f64(), Some(1.5));
    assert_eq!(value["string"].as_str(), Some("boston"));
    assert_eq!(value["array"].as_array().map(<[Value]>::len), Some(3));
    assert_eq!(
        value["object"]["nested"]["deep"].as_array(),
        Some(&[][..])
    );
}

#[test]
fn absent_keys_index_to_null() {
    let value = Value::from(Object::new());
    assert!(value["missing"].is_null());
    assert!(value["missing"]["deeper"].is_null());
    assert!(Value::from(3i64)["key"].is_null());
    assert_eq!(value.get("missing"), None);
}

#[test]
fn round_trips_through_text() {
    let source = json!({
        "location": "Boston",
        "units": ["c", "f"],
        "days": 3,
        "precise": false,
        "extra": null,
    });
    let value = Value::from(source.clone());
    let text = serde_json::to_string(&value).unwrap();
    let back: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(back, source);
}

#[test]
fn object_keys_are_ordered() {
    let value: Value = serde_json::from_str(r#"{"b": 1, "a": 2, "c": 3}"#).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["a", "b", "c"]);
}

#[test]
fn conversions() {
    assert_eq!(Value::from(f64::NAN), Value::Null);
    assert_eq!(Value::from(None::<&str>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    assert_eq!(Value::from(2u64).as_i64(), Some(2));
    assert_eq!(
        serde_json::Value::from(Value::from(vec![Value::from(true)])),
        json!([true])
    );
}
