/// Longest run of consolidated brackets emitted on a single line.
pub const MAX_BRACKET_RUN: usize = 50;

/// Arrays above this length lose formatting unless they are a deep
/// singleton chain.
pub const LARGE_ARRAY_THRESHOLD: usize = 1000;

/// Objects above this key count lose formatting.
pub const LARGE_OBJECT_THRESHOLD: usize = 100;

/// How many singleton-array levels the downgrade probe unwraps.
pub const CHAIN_PROBE_LIMIT: usize = 10;

/// Minimum chain depth that keeps formatting enabled for a large array.
pub const CHAIN_KEEP_FORMAT_DEPTH: usize = 5;

/// Hard ceiling on accumulated output fragments.
pub const MAX_FRAGMENTS: usize = 1_000_000;

/// Hard ceiling on the running output-size estimate.
pub const MAX_OUTPUT_BYTES: usize = 100 * 1024 * 1024;

/// Absolute ceiling checked during final assembly.
pub const MAX_STRING_BYTES: usize = (1 << 29) - 24;

/// Fragment count above which assembly switches to chunked appending.
pub const CHUNKED_ASSEMBLY_THRESHOLD: usize = 100_000;

/// Fragments appended between projected-length checks.
pub const ASSEMBLY_CHUNK: usize = 10_000;

/// Indentation units are never repeated more than this many times.
pub const INDENT_REPEAT_CAP: usize = 1000;

/// Subtrees entered beyond this depth contribute nothing to node counts.
pub const MAX_COUNT_DEPTH: usize = 50;

/// Deepest value handed to the native serializer by `safe_serialize`.
pub const NATIVE_DEPTH_LIMIT: usize = 128;

/// Containers the `safe_serialize` probe inspects before giving up and
/// using the iterative engine unconditionally.
pub const PROBE_NODE_BUDGET: usize = 250_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_ceilings_are_ordered() {
        assert!(MAX_OUTPUT_BYTES < MAX_STRING_BYTES);
        assert!(ASSEMBLY_CHUNK < CHUNKED_ASSEMBLY_THRESHOLD);
        assert!(CHUNKED_ASSEMBLY_THRESHOLD < MAX_FRAGMENTS);
    }

    #[rstest::rstest]
    fn test_chain_thresholds_fit_probe() {
        assert!(CHAIN_KEEP_FORMAT_DEPTH <= CHAIN_PROBE_LIMIT);
        assert!(MAX_BRACKET_RUN > 1);
    }
}
