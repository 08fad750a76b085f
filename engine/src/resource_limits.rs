/// Resource limits to prevent pathological input from degrading the engine,
/// without affecting any legitimate use.
///
/// These protect against abuse while being generous enough for all
/// legitimate grammars and workloads the engine is designed for.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum size in bytes of a loaded grammar's text.
    /// Real usage: ~2KB, Limit: 256KB (100x+)
    pub max_grammar_bytes: usize,

    /// Maximum size in bytes of a single told/asked sentence.
    /// Real usage: ~100 bytes, Limit: 16KB (150x+)
    pub max_fact_text_bytes: usize,

    /// Maximum recursion depth while visiting a parsed sentence's tree.
    /// Real usage: ~10 levels, Limit: 256 (25x+)
    pub max_path_depth: usize,

    /// Maximum activations processed by one `tell`'s saturation loop before
    /// it is aborted as a runaway. Exceeding this is a resource-limit error,
    /// not a silent truncation.
    /// Real usage: tens to low hundreds, Limit: 100,000
    pub max_activations_per_tell: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_grammar_bytes: 256 * 1024,
            max_fact_text_bytes: 16 * 1024,
            max_path_depth: 256,
            max_activations_per_tell: 100_000,
        }
    }
}

impl ResourceLimits {
    pub fn new() -> Self {
        Self::default()
    }
}
