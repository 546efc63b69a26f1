//! Stack-safe JSON serialization, line-path indexing, and search for very
//! large or very deep documents.
//!
//! The centerpiece is an iterative serializer that never recurses, so
//! document depth is bounded by memory rather than the call stack. Around
//! it sit the pieces a JSON exploration tool needs:
//!
//! - [`serialize`] / [`safe_serialize`]: compact or indented output with
//!   cycle detection, consolidation of deep singleton-array chains, and
//!   hard ceilings on output size.
//! - [`parse_text`] and the [`Value`] model: shared, mutable containers
//!   (`Rc<RefCell<...>>`) in which aliasing and cycles are representable,
//!   with insertion-ordered object keys.
//! - [`index_paths`] / [`PathIndex`]: a dot-notation path for every line
//!   of a formatted document, from a single forward pass over the text.
//! - [`find_matches`]: full-document key and value search with
//!   index-qualified paths.
//! - [`count_nodes`]: bounded node statistics.
//! - [`Worker`]: a background thread running all of the above on raw text.
//!
//! # Examples
//! ```
//! use deepjson::{parse_text, serialize, Indent};
//!
//! let doc = parse_text(r#"{"name":"deep","tags":["json"]}"#)?;
//! let pretty = serialize(&doc, Some(Indent::Spaces(2)))?;
//! assert_eq!(pretty, "{\n  \"name\": \"deep\",\n  \"tags\": [\n    \"json\"\n  ]\n}");
//! # Ok::<(), deepjson::Error>(())
//! ```

mod constants;
mod error;
mod index;
mod search;
mod serialize;
mod stats;
mod value;
mod worker;

pub use error::{Error, Result};
pub use index::{index_paths, PathIndex, ROOT_PATH};
pub use search::{find_matches, MatchKind, SearchMatch, SearchOptions};
pub use serialize::{safe_serialize, serialize, Indent};
pub use stats::count_nodes;
pub use value::{parse_text, Number, Object, Primitive, Value};
pub use worker::{Request, Response, Worker};
