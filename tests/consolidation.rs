//! Bracket consolidation layout.

use deepjson::{parse_text, serialize, Indent, Value};
use rstest::rstest;

fn chain(levels: usize, leaf: Value) -> Value {
    let mut value = leaf;
    for _ in 0..levels {
        value = Value::array(vec![value]);
    }
    value
}

#[rstest]
fn five_hundred_levels_consolidate_into_runs() {
    let doc = chain(500, Value::string("hello world"));
    let text = serialize(&doc, Some(Indent::Spaces(2))).unwrap();

    assert_eq!(text.matches('[').count(), 500);
    assert_eq!(text.matches(']').count(), 500);
    assert!(text.contains("\"hello world\""));

    for line in text.lines() {
        let trimmed = line.trim();
        let opens = trimmed.chars().filter(|c| *c == '[').count();
        let closes = trimmed.chars().filter(|c| *c == ']').count();
        assert!(opens <= 50, "opening run too long: {trimmed}");
        assert!(closes <= 50, "closing run too long: {trimmed}");
        // Runs are homogeneous: a line is brackets or content, not both.
        assert!(opens == 0 || opens == trimmed.len());
        assert!(closes == 0 || closes == trimmed.len());
    }

    // 500 levels in runs of 50: ten opening lines, the leaf, ten closing.
    assert_eq!(text.lines().count(), 21);
}

#[rstest]
fn consolidation_only_moves_whitespace() {
    let doc = chain(500, Value::string("hello world"));
    let compact = serialize(&doc, None).unwrap();
    let formatted = serialize(&doc, Some(Indent::Spaces(2))).unwrap();

    let squashed: String = formatted.lines().map(str::trim).collect();
    assert_eq!(squashed, compact);
}

#[rstest]
fn consolidated_output_parses_back() {
    let doc = chain(120, Value::from(42i64));
    let formatted = serialize(&doc, Some(Indent::Spaces(2))).unwrap();
    let reparsed = parse_text(&formatted).unwrap();
    assert_eq!(
        serialize(&reparsed, None).unwrap(),
        serialize(&doc, None).unwrap()
    );
}

#[rstest]
fn short_chain_keeps_one_run() {
    let doc = chain(3, Value::from(1i64));
    assert_eq!(
        serialize(&doc, Some(Indent::Spaces(2))).unwrap(),
        "[[[\n      1\n]]]"
    );
}

#[rstest]
fn chain_ending_in_multi_element_array_consolidates_the_chain_only() {
    let inner = Value::array(vec![Value::from(1i64), Value::from(2i64)]);
    let doc = Value::array(vec![Value::array(vec![inner])]);
    // Two singleton levels around the two-element array.
    assert_eq!(
        serialize(&doc, Some(Indent::Spaces(2))).unwrap(),
        "[[[\n      1,\n      2\n]]]"
    );
    assert_eq!(serialize(&doc, None).unwrap(), "[[[1,2]]]");
}

#[rstest]
fn consolidation_does_not_apply_to_objects() {
    let doc = Value::array(vec![Value::object([("k", Value::from(1i64))])]);
    assert_eq!(
        serialize(&doc, Some(Indent::Spaces(2))).unwrap(),
        "[\n  {\n    \"k\": 1\n  }\n]"
    );
}
