//! Line-to-path indexing for formatted JSON text.
//!
//! A single forward pass assigns every line of a formatted document a
//! dot-notation path (`config.server.host`). The indexer leans on the
//! layout conventions of the serializer rather than parsing: indentation
//! depth decides when scopes close, a line starting with a quoted key
//! followed by a colon names a scope, and a line ending in an opening
//! bracket or a bare colon opens one. Structural lines (brackets, array
//! elements) inherit the path of their enclosing scope; per-line array
//! indices are deliberately not tracked.

use memchr::memchr;
use smallvec::SmallVec;
use smol_str::SmolStr;

/// Path assigned to lines outside any named scope.
pub const ROOT_PATH: &str = "root";

type ScopeStack = SmallVec<[(SmolStr, usize); 16]>;

/// Compute the path for every line of `text`, in line order.
///
/// # Examples
/// ```
/// use deepjson::index_paths;
///
/// let text = "{\n  \"a\": {\n    \"b\": 1\n  }\n}";
/// let paths = index_paths(text);
/// assert_eq!(paths, vec!["root", "a", "a.b", "a", "root"]);
/// ```
pub fn index_paths(text: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut stack = ScopeStack::new();

    for line in text.lines() {
        let unindented = line.trim_start();
        let indent = line.len() - unindented.len();
        let trimmed = unindented.trim_end();
        let key = match_key(trimmed);

        // A key at some column closes every scope opened at that column or
        // deeper. A structural line (closing bracket, array element) at the
        // scope's own column still belongs to it, so only strictly deeper
        // scopes close.
        while stack.last().is_some_and(|(_, column)| {
            if key.is_some() {
                *column >= indent
            } else {
                *column > indent
            }
        }) {
            stack.pop();
        }
        paths.push(joined_path(&stack, key));

        if opens_scope(trimmed) {
            if let Some(key) = key {
                stack.push((SmolStr::new(key), indent));
            }
            // Anonymous containers add no path segment; their children
            // inherit the enclosing scope.
        }
    }
    paths
}

fn joined_path(stack: &ScopeStack, key: Option<&str>) -> String {
    if stack.is_empty() && key.is_none() {
        return ROOT_PATH.to_string();
    }
    let mut path = String::new();
    for (segment, _) in stack {
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(segment);
    }
    if let Some(key) = key {
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(key);
    }
    path
}

/// Extract the key of a `"key": ...` line, or `None` for structural and
/// element lines. The key is returned as it appears in the text, escapes
/// included.
fn match_key(trimmed: &str) -> Option<&str> {
    let bytes = trimmed.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }
    let mut from = 1;
    while let Some(offset) = memchr(b'"', &bytes[from..]) {
        let quote = from + offset;
        let mut backslashes = 0;
        while quote > backslashes + 1 && bytes[quote - backslashes - 1] == b'\\' {
            backslashes += 1;
        }
        if backslashes % 2 == 1 {
            // Escaped quote, keep scanning.
            from = quote + 1;
            continue;
        }
        if bytes.get(quote + 1) == Some(&b':') {
            return Some(&trimmed[1..quote]);
        }
        return None;
    }
    None
}

/// Whether the line opens a scope that following, deeper-indented lines
/// belong to.
fn opens_scope(trimmed: &str) -> bool {
    matches!(trimmed.as_bytes().last(), Some(b'{') | Some(b'[') | Some(b':'))
}

/// A cached line-path table for one formatted document.
///
/// Rebuilding the table costs a full pass over the text, so callers that
/// look up paths repeatedly hold a `PathIndex` and reuse it as long as the
/// text is unchanged. [`PathIndex::lookup`] manages that caching through an
/// `Option` slot.
#[derive(Debug, Clone)]
pub struct PathIndex {
    text: String,
    table: Vec<String>,
}

impl PathIndex {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            table: index_paths(text),
        }
    }

    /// Return a valid index for `text`, rebuilding the slot only when the
    /// cached text differs.
    pub fn lookup<'a>(slot: &'a mut Option<PathIndex>, text: &str) -> &'a PathIndex {
        if slot.as_ref().map_or(true, |index| index.text != text) {
            *slot = Some(PathIndex::new(text));
        }
        slot.get_or_insert_with(|| PathIndex::new(text))
    }

    /// All line paths, in line order.
    pub fn paths(&self) -> &[String] {
        &self.table
    }

    /// The path of a 1-based line number, or `None` out of range.
    pub fn line_path(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|i| self.table.get(i))
            .map(String::as_str)
    }
}
