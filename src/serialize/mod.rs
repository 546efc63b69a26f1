//! Stack-based JSON serialization.
//!
//! The engine replaces call-stack recursion with an explicit work stack, so
//! the depth it can handle is bounded only by heap. Containers are visited
//! twice: the first visit emits the opening punctuation and pushes the
//! children (in reverse, so the stack plays them back in order) together
//! with separator and indentation fragments; the second visit emits the
//! closing punctuation. Cycle detection tracks the identities of the
//! containers on the active ancestor path in a call-local set, so the value
//! graph itself is never marked or mutated.
//!
//! Chains of single-element arrays are consolidated: up to
//! [`MAX_BRACKET_RUN`](crate::constants::MAX_BRACKET_RUN) opening brackets
//! share one line, with the matching closing run on one line as well, so a
//! deep-but-narrow structure costs lines proportional to its branching, not
//! its depth. Consolidation only moves whitespace; bracket counts and the
//! parsed structure are unchanged.

mod output;

pub(crate) use output::format_primitive;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde::Serialize;

use crate::constants::{
    CHAIN_KEEP_FORMAT_DEPTH, CHAIN_PROBE_LIMIT, INDENT_REPEAT_CAP, LARGE_ARRAY_THRESHOLD,
    LARGE_OBJECT_THRESHOLD, MAX_BRACKET_RUN, NATIVE_DEPTH_LIMIT, PROBE_NODE_BUDGET,
};
use crate::error::{Error, Result};
use crate::value::Value;
use output::{write_quoted, Output};

/// The indentation unit for formatted output: a number of spaces, or a tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
    Tab,
}

impl Indent {
    fn unit_string(&self) -> String {
        match self {
            Indent::Spaces(count) => " ".repeat(*count),
            Indent::Tab => "\t".to_string(),
        }
    }
}

enum Task {
    /// Literal punctuation or separator text.
    Lit(&'static str),
    /// Pre-formatted text: a primitive, a quoted key, or indentation.
    Text(String),
    /// First visit of a container.
    Open { node: Value, depth: usize },
    /// Second visit: closing punctuation, then leave the ancestor path.
    Close { node: Value, depth: usize },
    /// Closing half of a consolidated bracket run.
    CloseRun {
        identity: usize,
        brackets: usize,
        depth: usize,
    },
}

/// Serialize a value to JSON text.
///
/// `indent` of `None` produces compact output. Any requested indent may be
/// silently dropped for "large" root structures (arrays of more than 1000
/// elements that are not deep singleton chains, objects of more than 100
/// keys) to keep the output bounded.
///
/// Fails with [`Error::CircularStructure`] when a container contains
/// itself, directly or indirectly, and with [`Error::OutputTooLarge`] when
/// the output would exceed the fragment or byte ceilings. On failure no
/// output is returned at all.
///
/// # Examples
/// ```
/// use deepjson::{serialize, Indent, Value};
///
/// let doc = Value::object([("a", Value::array(vec![Value::from(1i64)]))]);
/// assert_eq!(serialize(&doc, None).unwrap(), r#"{"a":[1]}"#);
/// assert_eq!(
///     serialize(&doc, Some(Indent::Spaces(2))).unwrap(),
///     "{\n  \"a\": [\n    1\n  ]\n}"
/// );
/// ```
pub fn serialize(value: &Value, indent: Option<Indent>) -> Result<String> {
    if !value.is_container() {
        return Ok(format_primitive(value));
    }

    let indent_unit = indent.map(|i| i.unit_string()).unwrap_or_default();
    let use_formatting = indent.is_some() && !downgrade_formatting(value);

    let mut out = Output::new();
    let mut active: HashSet<usize> = HashSet::new();
    let mut stack: Vec<Task> = vec![Task::Open {
        node: value.clone(),
        depth: 0,
    }];

    while let Some(task) = stack.pop() {
        match task {
            Task::Lit(text) => out.push_lit(text)?,
            Task::Text(text) => out.push_owned(text)?,
            Task::Open { node, depth } => open_container(
                &node,
                depth,
                use_formatting,
                &indent_unit,
                &mut active,
                &mut stack,
                &mut out,
            )?,
            Task::Close { node, depth } => {
                let (identity, is_empty, closing) = match &node {
                    Value::Array(items) => (
                        Rc::as_ptr(items) as *const u8 as usize,
                        items.borrow().is_empty(),
                        "]",
                    ),
                    Value::Object(map) => (
                        Rc::as_ptr(map) as *const u8 as usize,
                        map.borrow().is_empty(),
                        "}",
                    ),
                    _ => continue,
                };
                if use_formatting && !is_empty {
                    out.push_owned(closing_indent(&indent_unit, depth))?;
                }
                out.push_lit(closing)?;
                active.remove(&identity);
            }
            Task::CloseRun {
                identity,
                brackets,
                depth,
            } => {
                if use_formatting {
                    out.push_owned(closing_indent(&indent_unit, depth))?;
                }
                out.push_owned("]".repeat(brackets))?;
                active.remove(&identity);
            }
        }
    }

    out.finish()
}

#[allow(clippy::too_many_arguments)]
fn open_container(
    node: &Value,
    depth: usize,
    use_formatting: bool,
    indent_unit: &str,
    active: &mut HashSet<usize>,
    stack: &mut Vec<Task>,
    out: &mut Output,
) -> Result<()> {
    match node {
        Value::Array(items) => {
            let identity = Rc::as_ptr(items) as *const u8 as usize;
            if !active.insert(identity) {
                return Err(Error::CircularStructure);
            }

            if starts_singleton_chain(items) {
                return consolidate_chain(
                    items,
                    identity,
                    depth,
                    use_formatting,
                    indent_unit,
                    stack,
                    out,
                );
            }

            stack.push(Task::Close {
                node: node.clone(),
                depth,
            });
            out.push_lit("[")?;
            let items = items.borrow();
            if items.is_empty() {
                return Ok(());
            }
            if use_formatting {
                out.push_lit("\n")?;
            }
            let last = items.len() - 1;
            for (i, child) in items.iter().enumerate().rev() {
                if i < last {
                    stack.push(Task::Lit(if use_formatting { ",\n" } else { "," }));
                }
                push_child(stack, child, depth + 1);
                if use_formatting && !indent_unit.is_empty() {
                    stack.push(Task::Text(indent_text(indent_unit, depth + 1)));
                }
            }
        }
        Value::Object(map) => {
            let identity = Rc::as_ptr(map) as *const u8 as usize;
            if !active.insert(identity) {
                return Err(Error::CircularStructure);
            }

            stack.push(Task::Close {
                node: node.clone(),
                depth,
            });
            out.push_lit("{")?;
            let map = map.borrow();
            if map.is_empty() {
                return Ok(());
            }
            if use_formatting {
                out.push_lit("\n")?;
            }
            let last = map.len() - 1;
            for (i, (key, child)) in map.iter().enumerate().rev() {
                if i < last {
                    stack.push(Task::Lit(if use_formatting { ",\n" } else { "," }));
                }
                push_child(stack, child, depth + 1);
                stack.push(Task::Lit(if use_formatting { ": " } else { ":" }));
                let mut quoted = String::with_capacity(key.len() + 2);
                write_quoted(&mut quoted, key);
                stack.push(Task::Text(quoted));
                if use_formatting && !indent_unit.is_empty() {
                    stack.push(Task::Text(indent_text(indent_unit, depth + 1)));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Emit a consolidated run of opening brackets and queue up the matching
/// closing run, then queue the innermost array's children.
fn consolidate_chain(
    head: &Rc<RefCell<Vec<Value>>>,
    identity: usize,
    depth: usize,
    use_formatting: bool,
    indent_unit: &str,
    stack: &mut Vec<Task>,
    out: &mut Output,
) -> Result<()> {
    let mut brackets = 1usize;
    let mut current = head.clone();
    while brackets < MAX_BRACKET_RUN {
        let next = singleton_array_child(&current);
        match next {
            Some(inner) => {
                brackets += 1;
                current = inner;
            }
            None => break,
        }
    }

    out.push_owned("[".repeat(brackets))?;
    if use_formatting && brackets > 1 {
        out.push_lit("\n")?;
    }
    stack.push(Task::CloseRun {
        identity,
        brackets,
        depth,
    });

    let items = current.borrow();
    if items.is_empty() {
        return Ok(());
    }
    let child_depth = depth + brackets;
    let last = items.len() - 1;
    for (i, child) in items.iter().enumerate().rev() {
        if i < last {
            stack.push(Task::Lit(if use_formatting { ",\n" } else { "," }));
        }
        push_child(stack, child, child_depth);
        if use_formatting && !indent_unit.is_empty() {
            stack.push(Task::Text(indent_text(indent_unit, child_depth)));
        }
    }
    Ok(())
}

fn push_child(stack: &mut Vec<Task>, child: &Value, depth: usize) {
    if child.is_container() {
        stack.push(Task::Open {
            node: child.clone(),
            depth,
        });
    } else {
        stack.push(Task::Text(format_primitive(child)));
    }
}

fn starts_singleton_chain(items: &Rc<RefCell<Vec<Value>>>) -> bool {
    let items = items.borrow();
    items.len() == 1 && matches!(items[0], Value::Array(_))
}

fn singleton_array_child(array: &Rc<RefCell<Vec<Value>>>) -> Option<Rc<RefCell<Vec<Value>>>> {
    let items = array.borrow();
    if items.len() != 1 {
        return None;
    }
    match &items[0] {
        Value::Array(inner) => Some(inner.clone()),
        _ => None,
    }
}

fn indent_text(unit: &str, depth: usize) -> String {
    unit.repeat(depth.min(INDENT_REPEAT_CAP))
}

fn closing_indent(unit: &str, depth: usize) -> String {
    let mut text = String::with_capacity(1 + unit.len() * depth.min(INDENT_REPEAT_CAP));
    text.push('\n');
    text.push_str(&indent_text(unit, depth));
    text
}

/// Large-structure heuristic: formatting is silently dropped for root
/// arrays above 1000 elements (unless they are a deep singleton chain,
/// which consolidation keeps cheap) and root objects above 100 keys.
fn downgrade_formatting(value: &Value) -> bool {
    match value {
        Value::Array(items) => {
            items.borrow().len() > LARGE_ARRAY_THRESHOLD && !is_deep_singleton_chain(value)
        }
        Value::Object(map) => map.borrow().len() > LARGE_OBJECT_THRESHOLD,
        _ => false,
    }
}

fn is_deep_singleton_chain(value: &Value) -> bool {
    let mut depth = 0;
    let mut current = match value {
        Value::Array(items) => items.clone(),
        _ => return false,
    };
    while depth < CHAIN_PROBE_LIMIT {
        match singleton_array_child(&current) {
            Some(inner) => {
                depth += 1;
                current = inner;
            }
            None => break,
        }
    }
    depth >= CHAIN_KEEP_FORMAT_DEPTH
}

enum ProbeOutcome {
    /// Acyclic, shallow, fully scanned: safe for the native serializer.
    Shallow,
    /// Deep, cyclic, or too large to scan: use the iterative engine.
    Fallback,
}

/// Bounded scan deciding whether the native serializer may be used. The
/// native path recurses, and a stack fault cannot be caught, so anything
/// deep, cyclic, or too large to fully inspect goes to the engine instead.
fn probe(value: &Value) -> ProbeOutcome {
    enum Step {
        Enter(Value, usize),
        Leave(usize),
    }

    let mut active: HashSet<usize> = HashSet::new();
    let mut budget = PROBE_NODE_BUDGET;
    let mut stack = vec![Step::Enter(value.clone(), 0)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Leave(identity) => {
                active.remove(&identity);
            }
            Step::Enter(node, depth) => {
                if depth > NATIVE_DEPTH_LIMIT {
                    return ProbeOutcome::Fallback;
                }
                let identity = match node.identity() {
                    Some(identity) => identity,
                    None => continue,
                };
                if !active.insert(identity) {
                    return ProbeOutcome::Fallback;
                }
                if budget == 0 {
                    return ProbeOutcome::Fallback;
                }
                budget -= 1;
                stack.push(Step::Leave(identity));
                match &node {
                    Value::Array(items) => {
                        for child in items.borrow().iter() {
                            stack.push(Step::Enter(child.clone(), depth + 1));
                        }
                    }
                    Value::Object(map) => {
                        for child in map.borrow().values() {
                            stack.push(Step::Enter(child.clone(), depth + 1));
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    ProbeOutcome::Shallow
}

fn native_serialize(value: &Value, indent: Option<Indent>) -> Result<String> {
    match indent {
        None => Ok(serde_json::to_string(value)?),
        Some(indent) => {
            let unit = indent.unit_string();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(unit.as_bytes());
            let mut buf = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut serializer)?;
            Ok(String::from_utf8(buf).expect("serializer output must be valid UTF-8"))
        }
    }
}

/// Serialize with the native serializer when it is safe, falling back to
/// the iterative engine otherwise.
///
/// The fallback always uses `Indent::Spaces(0)`: newline-formatted but
/// zero-width, which bounds the work on the shapes that forced the
/// fallback in the first place.
///
/// # Examples
/// ```
/// use deepjson::{safe_serialize, Value};
///
/// let doc = Value::array(vec![Value::from(1i64), Value::from(2i64)]);
/// assert_eq!(safe_serialize(&doc, None).unwrap(), "[1,2]");
/// ```
pub fn safe_serialize(value: &Value, indent: Option<Indent>) -> Result<String> {
    if let ProbeOutcome::Shallow = probe(value) {
        if let Ok(text) = native_serialize(value, indent) {
            return Ok(text);
        }
    }
    serialize(value, Some(Indent::Spaces(0)))
}
