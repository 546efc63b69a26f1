use thiserror::Error;

/// Errors produced by the serializer engine and the fallback parse path.
///
/// Failures are always all-or-nothing: no partial output is ever returned
/// alongside an error.
#[derive(Debug, Error)]
pub enum Error {
    /// A container was reached while it was already on the active ancestor
    /// path of the traversal.
    #[error("Converting circular structure to JSON")]
    CircularStructure,

    /// The emitted text would exceed the fragment or byte ceiling.
    #[error("JSON output too large - fragments: {fragments}, estimated size: {estimated_bytes} bytes")]
    OutputTooLarge {
        fragments: usize,
        estimated_bytes: usize,
    },

    /// The input text was not valid JSON (fallback parse path only).
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
