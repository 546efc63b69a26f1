//! Extreme depth and circular structures.

use deepjson::{parse_text, safe_serialize, serialize, Error, Indent, Value};
use rstest::rstest;

/// `levels` single-element arrays wrapped around `leaf`.
fn chain(levels: usize, leaf: Value) -> Value {
    let mut value = leaf;
    for _ in 0..levels {
        value = Value::array(vec![value]);
    }
    value
}

#[rstest]
fn ten_thousand_levels_serialize_compact() {
    let doc = chain(10_000, Value::from(7i64));
    let text = serialize(&doc, None).unwrap();
    assert_eq!(text.len(), 20_001);
    assert!(text.starts_with("[[["));
    assert!(text.ends_with("]]]"));
    assert_eq!(text.matches('[').count(), 10_000);
    assert_eq!(text.matches(']').count(), 10_000);
    assert!(text.contains('7'));
}

#[rstest]
fn ten_thousand_levels_serialize_formatted() {
    let doc = chain(10_000, Value::string("leaf"));
    let text = serialize(&doc, Some(Indent::Spaces(1))).unwrap();
    assert_eq!(text.matches('[').count(), 10_000);
    assert_eq!(text.matches(']').count(), 10_000);
    assert!(text.contains("\"leaf\""));
    // No line carries more than one consolidated run.
    for line in text.lines() {
        let trimmed = line.trim();
        let brackets = trimmed.chars().take_while(|c| *c == '[').count();
        assert!(brackets <= 50, "run too long: {trimmed}");
    }
}

#[rstest]
fn ten_thousand_levels_parse_and_drop() {
    let mut text = String::with_capacity(20_001);
    for _ in 0..10_000 {
        text.push('[');
    }
    text.push('1');
    for _ in 0..10_000 {
        text.push(']');
    }
    let doc = parse_text(&text).unwrap();
    assert_eq!(serialize(&doc, None).unwrap(), text);
    // Falls out of scope here: dropping the deep value must not recurse.
}

#[rstest]
fn safe_serialize_falls_back_for_deep_values() {
    let doc = chain(5_000, Value::Bool(true));
    // Too deep for the native serializer; the engine output is
    // newline-formatted with a zero-width indent.
    let text = safe_serialize(&doc, None).unwrap();
    assert!(text.contains('\n'));
    assert!(text.contains("true"));
    assert_eq!(text.matches('[').count(), 5_000);
}

#[rstest]
fn direct_cycle_is_detected() {
    let node = Value::array(vec![Value::Null]);
    if let Value::Array(items) = &node {
        items.borrow_mut().push(node.clone());
    }
    let err = serialize(&node, None).unwrap_err();
    assert!(matches!(err, Error::CircularStructure));
    assert_eq!(err.to_string(), "Converting circular structure to JSON");
    // Break the link so the graph can drop.
    if let Value::Array(items) = &node {
        items.borrow_mut().pop();
    }
}

#[rstest]
fn indirect_cycle_through_object_is_detected() {
    let inner = Value::object([("up", Value::Null)]);
    let outer = Value::object([("down", inner.clone())]);
    if let Value::Object(map) = &inner {
        map.borrow_mut().insert("up".into(), outer.clone());
    }
    let err = serialize(&outer, Some(Indent::Spaces(2))).unwrap_err();
    assert!(matches!(err, Error::CircularStructure));
    if let Some(map) = inner.as_object() {
        map.borrow_mut().insert("up".into(), Value::Null);
    }
}

#[rstest]
fn cycle_through_array_element_is_detected() {
    let root = Value::array(vec![Value::from(1i64), Value::array(vec![])]);
    if let Value::Array(items) = &root {
        let nested = items.borrow()[1].clone();
        if let Value::Array(inner) = &nested {
            inner.borrow_mut().push(root.clone());
        }
    }
    assert!(matches!(
        serialize(&root, None),
        Err(Error::CircularStructure)
    ));
    if let Some(items) = root.as_array() {
        items.borrow_mut().pop();
    }
}

#[rstest]
fn shared_subtrees_are_not_cycles() {
    let shared = Value::object([("n", Value::from(1i64))]);
    let doc = Value::array(vec![shared.clone(), shared.clone(), shared]);
    assert_eq!(
        serialize(&doc, None).unwrap(),
        r#"[{"n":1},{"n":1},{"n":1}]"#
    );
}
