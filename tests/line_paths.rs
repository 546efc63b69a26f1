//! Line-path indexing over real serializer output.

use deepjson::{index_paths, parse_text, serialize, Indent, PathIndex};
use rstest::rstest;

fn formatted(text: &str) -> String {
    let doc = parse_text(text).unwrap();
    serialize(&doc, Some(Indent::Spaces(2))).unwrap()
}

#[rstest]
fn nested_keys_produce_dotted_paths() {
    let text = formatted(r#"{"a":{"b":1,"c":{"d":true}}}"#);
    let paths = index_paths(&text);
    assert!(paths.contains(&"a.b".to_string()));
    assert!(paths.contains(&"a.c.d".to_string()));
    // The key lines themselves carry their own path.
    let lines: Vec<&str> = text.lines().collect();
    let b_line = lines.iter().position(|l| l.contains("\"b\"")).unwrap();
    assert_eq!(paths[b_line], "a.b");
}

#[rstest]
fn array_element_lines_inherit_the_array_path() {
    let text = formatted(r#"{"items":[10,20,30]}"#);
    let paths = index_paths(&text);
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim().trim_end_matches(',');
        if ["10", "20", "30", "]"].contains(&trimmed) {
            assert_eq!(paths[i], "items", "line {i}: {line}");
        }
    }
}

#[rstest]
fn braces_and_root_lines_map_to_root() {
    let text = formatted(r#"{"a":1}"#);
    let paths = index_paths(&text);
    assert_eq!(paths.first().map(String::as_str), Some("root"));
    assert_eq!(paths.last().map(String::as_str), Some("root"));
}

#[rstest]
fn every_line_gets_a_path() {
    let text = formatted(
        r#"{"users":[{"name":"a","roles":["x"]},{"name":"b"}],"total":2}"#,
    );
    let paths = index_paths(&text);
    assert_eq!(paths.len(), text.lines().count());
    assert!(paths.iter().all(|p| !p.is_empty()));
}

#[rstest]
fn objects_inside_arrays_scope_to_the_array_key() {
    let text = formatted(r#"{"users":[{"name":"a"},{"name":"b"}]}"#);
    let paths = index_paths(&text);
    let lines: Vec<&str> = text.lines().collect();
    let name_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.contains("\"name\""))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(name_lines.len(), 2);
    for i in name_lines {
        assert_eq!(paths[i], "users.name");
    }
}

#[rstest]
fn path_index_caches_by_text() {
    let text = formatted(r#"{"config":{"port":8080}}"#);
    let mut slot: Option<PathIndex> = None;

    let port_line = text
        .lines()
        .position(|l| l.contains("\"port\""))
        .unwrap()
        + 1;
    assert_eq!(
        PathIndex::lookup(&mut slot, &text).line_path(port_line),
        Some("config.port")
    );

    // Unchanged text reuses the cached table.
    let before = PathIndex::lookup(&mut slot, &text).paths().as_ptr();
    let after = PathIndex::lookup(&mut slot, &text).paths().as_ptr();
    assert_eq!(before, after);

    // Different text rebuilds.
    let other = formatted(r#"{"x":1}"#);
    assert_eq!(
        PathIndex::lookup(&mut slot, &other).line_path(2),
        Some("x")
    );
}
