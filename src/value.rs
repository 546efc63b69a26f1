use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::de::Deserialize;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use smol_str::SmolStr;

use crate::error::Result;

/// A JSON number, kept in the representation it was parsed with so that
/// integers and floats print exactly the way `serde_json` prints them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    PosInt(u64),
    NegInt(i64),
    Float(f64),
}

impl Number {
    /// Build a float number, rejecting NaN and infinities.
    pub fn from_f64(f: f64) -> Option<Self> {
        if f.is_finite() {
            Some(Number::Float(f))
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::PosInt(u) if *u <= i64::MAX as u64 => Some(*u as i64),
            Number::PosInt(_) => None,
            Number::NegInt(i) => Some(*i),
            Number::Float(f) => {
                let i = *f as i64;
                if i as f64 == *f {
                    Some(i)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::PosInt(u) => Some(*u),
            Number::NegInt(i) => u64::try_from(*i).ok(),
            Number::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::PosInt(u) => Some(*u as f64),
            Number::NegInt(i) => Some(*i as f64),
            Number::Float(f) => Some(*f),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        if n >= 0 {
            Number::PosInt(n as u64)
        } else {
            Number::NegInt(n)
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::from(n as i64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::PosInt(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::PosInt(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Number::PosInt(u) => serializer.serialize_u64(*u),
            Number::NegInt(i) => serializer.serialize_i64(*i),
            Number::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            // Non-finite numbers have no JSON representation and print as null.
            Number::Float(_) => serializer.serialize_unit(),
        }
    }
}

/// An ordered key/value mapping with unique keys.
pub type Object = IndexMap<SmolStr, Value>;

/// The in-memory representation of one parsed JSON document.
///
/// Containers are shared nodes (`Rc<RefCell<...>>`): the same array or
/// object may appear in several places, and a graph with a cycle can be
/// constructed. The serializer detects cycles by node identity; see
/// [`crate::serialize::serialize`].
///
/// # Examples
/// ```
/// use deepjson::Value;
///
/// let doc = Value::object([("name", Value::string("Ada"))]);
/// assert_eq!(doc.type_name(), "object");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<Object>>),
}

impl Value {
    /// Build an array node.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Build an object node, preserving entry order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<SmolStr>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map: Object = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        Value::Object(Rc::new(RefCell::new(map)))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn as_array(&self) -> Option<&Rc<RefCell<Vec<Value>>>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<RefCell<Object>>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub const fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Identity of a container node, used for cycle and sharing detection.
    /// Primitives have no identity.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(Rc::as_ptr(items) as *const u8 as usize),
            Value::Object(map) => Some(Rc::as_ptr(map) as *const u8 as usize),
            _ => None,
        }
    }

    /// The primitive payload of a non-container value, `None` for arrays
    /// and objects.
    pub fn to_primitive(&self) -> Option<Primitive> {
        match self {
            Value::Null => Some(Primitive::Null),
            Value::Bool(b) => Some(Primitive::Bool(*b)),
            Value::Number(n) => Some(Primitive::Number(*n)),
            Value::String(s) => Some(Primitive::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<serde_json::Value> for Value {
    /// Conversion is iterative: source nodes are dismantled onto a work
    /// list as they are consumed, so neither the conversion nor the drop
    /// of the source tree recurses per nesting level.
    fn from(value: serde_json::Value) -> Self {
        enum Dest {
            Root,
            Array(Rc<RefCell<Vec<Value>>>),
            Object(Rc<RefCell<Object>>, SmolStr),
        }

        let mut result = Value::Null;
        let mut work: Vec<(serde_json::Value, Dest)> = vec![(value, Dest::Root)];

        while let Some((node, dest)) = work.pop() {
            let converted = match node {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::Bool(b),
                serde_json::Value::Number(n) => convert_number(&n),
                serde_json::Value::String(s) => Value::String(s),
                serde_json::Value::Array(items) => {
                    let array = Rc::new(RefCell::new(Vec::with_capacity(items.len())));
                    // Reversed so children pop, and append, in order.
                    for child in items.into_iter().rev() {
                        work.push((child, Dest::Array(array.clone())));
                    }
                    Value::Array(array)
                }
                serde_json::Value::Object(map) => {
                    let object = Rc::new(RefCell::new(Object::with_capacity(map.len())));
                    for (key, child) in map.into_iter().rev() {
                        work.push((child, Dest::Object(object.clone(), SmolStr::new(key))));
                    }
                    Value::Object(object)
                }
            };
            match dest {
                Dest::Root => result = converted,
                Dest::Array(parent) => parent.borrow_mut().push(converted),
                Dest::Object(parent, key) => {
                    parent.borrow_mut().insert(key, converted);
                }
            }
        }
        result
    }
}

fn convert_number(n: &serde_json::Number) -> Value {
    if let Some(u) = n.as_u64() {
        Value::Number(Number::PosInt(u))
    } else if let Some(i) = n.as_i64() {
        Value::Number(Number::NegInt(i))
    } else if let Some(f) = n.as_f64() {
        Value::Number(Number::Float(f))
    } else {
        Value::Null
    }
}

impl Drop for Value {
    /// Containers drop iteratively. A naive drop of a deep chain would
    /// recurse per nesting level and abort the process; instead each
    /// uniquely held container is emptied onto a work list first, so every
    /// individual drop is shallow. Containers still shared elsewhere are
    /// left alone.
    fn drop(&mut self) {
        let mut work: Vec<Value> = Vec::new();
        take_children(self, &mut work);
        while let Some(mut node) = work.pop() {
            take_children(&mut node, &mut work);
        }
    }
}

fn take_children(value: &mut Value, work: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            if Rc::strong_count(items) == 1 {
                work.append(&mut items.borrow_mut());
            }
        }
        Value::Object(map) => {
            if Rc::strong_count(map) == 1 {
                work.extend(map.borrow_mut().drain(..).map(|(_, child)| child));
            }
        }
        _ => {}
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let items = items.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let map = map.borrow();
                let mut object = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    object.serialize_entry(key.as_str(), value)?;
                }
                object.end()
            }
        }
    }
}

/// A leaf value carried by search matches and worker responses.
///
/// Unlike [`Value`], this type is `Send` and serde-serializable, so it can
/// cross a worker message boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Primitive {
    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Bool(_) => "boolean",
            Primitive::Number(_) => "number",
            Primitive::String(_) => "string",
        }
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Primitive::Null => serializer.serialize_unit(),
            Primitive::Bool(b) => serializer.serialize_bool(*b),
            Primitive::Number(n) => n.serialize(serializer),
            Primitive::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Parse raw JSON text into a [`Value`].
///
/// This is the crate's single parse path, used by the native-first fallback
/// and the workers. The recursion limit of the native parser is lifted so
/// deep documents parse; the serializer side is fully iterative.
///
/// # Examples
/// ```
/// use deepjson::parse_text;
///
/// let doc = parse_text(r#"{"a": [1, 2]}"#).unwrap();
/// assert_eq!(doc.type_name(), "object");
/// ```
pub fn parse_text(input: &str) -> Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(input);
    deserializer.disable_recursion_limit();
    // Lifting the recursion limit alone would trade the parser's depth
    // error for a stack overflow; the stacker adapter grows the stack on
    // demand instead.
    let json = serde_json::Value::deserialize(serde_stacker::Deserializer::new(
        &mut deserializer,
    ))?;
    // Convert before the trailing-input check: conversion dismantles the
    // parsed tree, which must not drop as-is when the input is deep.
    let value = Value::from(json);
    deserializer.end()?;
    Ok(value)
}
