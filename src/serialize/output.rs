use std::borrow::Cow;

use crate::constants::{
    ASSEMBLY_CHUNK, CHUNKED_ASSEMBLY_THRESHOLD, MAX_FRAGMENTS, MAX_OUTPUT_BYTES, MAX_STRING_BYTES,
};
use crate::error::{Error, Result};
use crate::value::{Number, Value};

/// Accumulates output fragments instead of concatenating strings, and
/// enforces the fragment and byte ceilings as it goes. Assembly happens
/// once, at the end; a call that trips a ceiling produces no output at all.
pub(crate) struct Output {
    fragments: Vec<Cow<'static, str>>,
    estimated_bytes: usize,
}

impl Output {
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
            estimated_bytes: 0,
        }
    }

    pub fn push_lit(&mut self, fragment: &'static str) -> Result<()> {
        self.push(Cow::Borrowed(fragment))
    }

    pub fn push_owned(&mut self, fragment: String) -> Result<()> {
        self.push(Cow::Owned(fragment))
    }

    fn push(&mut self, fragment: Cow<'static, str>) -> Result<()> {
        self.estimated_bytes += fragment.len();
        self.fragments.push(fragment);
        if self.fragments.len() > MAX_FRAGMENTS || self.estimated_bytes > MAX_OUTPUT_BYTES {
            return Err(self.too_large());
        }
        Ok(())
    }

    pub fn finish(self) -> Result<String> {
        if self.fragments.len() <= CHUNKED_ASSEMBLY_THRESHOLD {
            let mut result = String::with_capacity(self.estimated_bytes);
            for fragment in &self.fragments {
                result.push_str(fragment);
            }
            return Ok(result);
        }

        // Chunked appending with a running projected-length check, so a
        // runaway result fails cleanly instead of aborting on allocation.
        let mut result = String::with_capacity(self.estimated_bytes.min(MAX_STRING_BYTES));
        for chunk in self.fragments.chunks(ASSEMBLY_CHUNK) {
            let chunk_len: usize = chunk.iter().map(|fragment| fragment.len()).sum();
            if result.len() + chunk_len > MAX_STRING_BYTES {
                return Err(Error::OutputTooLarge {
                    fragments: self.fragments.len(),
                    estimated_bytes: result.len() + chunk_len,
                });
            }
            for fragment in chunk {
                result.push_str(fragment);
            }
        }
        Ok(result)
    }

    fn too_large(&self) -> Error {
        Error::OutputTooLarge {
            fragments: self.fragments.len(),
            estimated_bytes: self.estimated_bytes,
        }
    }
}

/// Format a primitive value as JSON text. Numbers that are not finite have
/// no JSON representation and print as the null literal.
pub(crate) fn format_primitive(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => {
            let mut out = String::with_capacity(s.len() + 2);
            write_quoted(&mut out, s);
            out
        }
        Value::Array(_) | Value::Object(_) => "null".to_string(),
    }
}

pub(crate) fn number_to_string(n: &Number) -> String {
    let mut out = String::new();
    write_number(&mut out, n);
    out
}

/// Integers go through `itoa`, the formatter `serde_json` uses for them.
/// Finite floats are handed to `serde_json` itself: its float notation has
/// changed across releases (exponents are now written ECMAScript-style,
/// `1e+30`), and delegating is the only way to stay byte-identical with
/// whatever version is resolved.
pub(crate) fn write_number(out: &mut String, n: &Number) {
    match n {
        Number::PosInt(u) => {
            let mut buf = itoa::Buffer::new();
            out.push_str(buf.format(*u));
        }
        Number::NegInt(i) => {
            let mut buf = itoa::Buffer::new();
            out.push_str(buf.format(*i));
        }
        Number::Float(f) if f.is_finite() => match serde_json::to_string(f) {
            Ok(text) => out.push_str(&text),
            Err(_) => out.push_str("null"),
        },
        Number::Float(_) => out.push_str("null"),
    }
}

/// Write a string as a quoted JSON string, escaping exactly as `serde_json`
/// does: short escapes where JSON defines them, lowercase `\u00xx` for the
/// remaining control characters.
pub(crate) fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ch if (ch as u32) < 0x20 => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                let code = ch as u32 as usize;
                out.push_str("\\u00");
                out.push(HEX[(code >> 4) & 0xf] as char);
                out.push(HEX[code & 0xf] as char);
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}
