//! Document statistics.

use std::collections::HashSet;

use crate::constants::MAX_COUNT_DEPTH;
use crate::value::Value;

/// Count the nodes of a document: every primitive and every container is
/// one node.
///
/// The walk is iterative and bounded: nodes deeper than
/// [`MAX_COUNT_DEPTH`](crate::constants::MAX_COUNT_DEPTH) levels contribute
/// nothing, and a container reached a second time (shared or cyclic)
/// contributes one node without being descended into again, so the count
/// terminates on any value graph.
///
/// # Examples
/// ```
/// use deepjson::{count_nodes, Value};
///
/// let doc = Value::object([("a", Value::array(vec![Value::from(1i64), Value::from(2i64)]))]);
/// // The object, the array, and two numbers.
/// assert_eq!(count_nodes(&doc), 4);
/// ```
pub fn count_nodes(value: &Value) -> u64 {
    let mut seen: HashSet<usize> = HashSet::new();
    let mut stack: Vec<(Value, usize)> = vec![(value.clone(), 0)];
    let mut count = 0u64;

    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_COUNT_DEPTH {
            continue;
        }
        count += 1;
        let identity = match node.identity() {
            Some(identity) => identity,
            None => continue,
        };
        if !seen.insert(identity) {
            // Counted once already; do not descend again.
            continue;
        }
        match &node {
            Value::Array(items) => {
                for child in items.borrow().iter() {
                    stack.push((child.clone(), depth + 1));
                }
            }
            Value::Object(map) => {
                for child in map.borrow().values() {
                    stack.push((child.clone(), depth + 1));
                }
            }
            _ => {}
        }
    }
    count
}
