//! Full-document search over parsed values.
//!
//! The walk is iterative and visits nodes in document order, producing
//! dot-notation paths with array indices (`items[2].name`). Keys and
//! primitive values are both searched; containers reached a second time
//! through sharing or a cycle are skipped, so the walk terminates on any
//! value graph.

use std::collections::HashSet;

use serde::Serialize;
use smol_str::SmolStr;

use crate::index::ROOT_PATH;
use crate::serialize::format_primitive;
use crate::value::{Primitive, Value};

/// Matching behavior for [`find_matches`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchOptions {
    /// Compare without lowercasing both sides first.
    pub case_sensitive: bool,
    /// Only match where the term is not embedded in a longer word.
    pub full_word: bool,
}

/// What part of a document a match landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Key,
    Value,
}

/// A single search hit.
#[derive(Clone, Debug, Serialize)]
pub struct SearchMatch {
    /// Dot-notation path of the matched node, `root` for the document root.
    pub path: String,
    /// The matched key (as a string) or the matched primitive value.
    pub value: Primitive,
    pub kind: MatchKind,
    /// JSON type name of `value`.
    pub type_name: &'static str,
}

/// Find every key and primitive value containing `term`, in document
/// order.
///
/// # Examples
/// ```
/// use deepjson::{find_matches, parse_text, MatchKind, SearchOptions};
///
/// let doc = parse_text(r#"{"name":"alice","friend":{"name":"bob"}}"#).unwrap();
/// let hits = find_matches(&doc, "bob", &SearchOptions::default());
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].path, "friend.name");
/// assert_eq!(hits[0].kind, MatchKind::Value);
/// ```
pub fn find_matches(value: &Value, term: &str, options: &SearchOptions) -> Vec<SearchMatch> {
    let mut matches = Vec::new();
    if term.is_empty() {
        return matches;
    }

    let mut seen: HashSet<usize> = HashSet::new();
    let mut stack: Vec<(Value, String, Option<SmolStr>)> =
        vec![(value.clone(), ROOT_PATH.to_string(), None)];

    while let Some((node, path, key)) = stack.pop() {
        if let Some(key) = &key {
            if text_matches(key, term, options) {
                matches.push(SearchMatch {
                    path: path.clone(),
                    value: Primitive::String(key.to_string()),
                    kind: MatchKind::Key,
                    type_name: "string",
                });
            }
        }

        match &node {
            Value::Array(items) => {
                if !seen.insert(node.identity().unwrap_or_default()) {
                    continue;
                }
                let items = items.borrow();
                for (i, child) in items.iter().enumerate().rev() {
                    stack.push((child.clone(), index_path(&path, i), None));
                }
            }
            Value::Object(map) => {
                if !seen.insert(node.identity().unwrap_or_default()) {
                    continue;
                }
                let map = map.borrow();
                for (child_key, child) in map.iter().rev() {
                    stack.push((
                        child.clone(),
                        key_path(&path, child_key),
                        Some(child_key.clone()),
                    ));
                }
            }
            _ => {
                let text = primitive_text(&node);
                if text_matches(&text, term, options) {
                    matches.push(SearchMatch {
                        path,
                        value: node.to_primitive().unwrap_or(Primitive::Null),
                        kind: MatchKind::Value,
                        type_name: node.type_name(),
                    });
                }
            }
        }
    }
    matches
}

fn key_path(parent: &str, key: &str) -> String {
    if parent == ROOT_PATH {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn index_path(parent: &str, index: usize) -> String {
    if parent == ROOT_PATH {
        format!("[{index}]")
    } else {
        format!("{parent}[{index}]")
    }
}

/// Search text of a primitive: string content unquoted, everything else
/// as it would appear in JSON.
fn primitive_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => format_primitive(other),
    }
}

fn text_matches(haystack: &str, term: &str, options: &SearchOptions) -> bool {
    if options.case_sensitive {
        contained(haystack, term, options.full_word)
    } else {
        contained(&haystack.to_lowercase(), &term.to_lowercase(), options.full_word)
    }
}

fn contained(haystack: &str, needle: &str, full_word: bool) -> bool {
    if !full_word {
        return haystack.contains(needle);
    }
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
