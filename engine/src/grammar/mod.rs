//! The pluggable text -> parse-tree boundary the engine is generic over.

pub mod runtime;

use crate::error::FactumResult;
use crate::fact::Fact;
use crate::path::Path;
use crate::resource_limits::ResourceLimits;

/// One node of a raw parse tree, before it is flattened into a `Fact`.
#[derive(Debug, Clone)]
pub struct ParseNode {
    pub expr: std::rc::Rc<str>,
    pub text: std::rc::Rc<str>,
    pub start: usize,
    pub end: usize,
    pub children: Vec<ParseNode>,
}

/// The result of parsing one `tell`-able sentence: either a ground fact, or
/// a rule's conditions and consequences (already split on the fact
/// separator and each parsed into its own `Fact`).
#[derive(Debug, Clone)]
pub enum Sentence {
    Fact(Fact),
    Rule {
        conditions: Vec<Fact>,
        consequences: Vec<Fact>,
    },
}

/// Configuration a `Grammar` implementation is built from.
#[derive(Debug, Clone)]
pub struct GrammarOptions {
    /// The grammar production that recognizes a single fact.
    pub fact_rule: String,
    /// Regex over expr names identifying a variable-range (sub-tree
    /// binding) segment.
    pub var_range_expr: String,
    /// PEG expression a leaf must match to be recognized as a variable,
    /// spliced directly into the `__var__` preamble production. The
    /// reference grammar expresses this as the regex literal
    /// `~"_*X[0-9]+"`; pest has no runtime regex embedding, so this is PEG
    /// syntax rather than a regex (the default below is the PEG-syntax
    /// equivalent of that pattern).
    pub var_pat: String,
    /// Separator between conditions, and between consequences, in a rule.
    pub fact_sep: String,
    /// Resource limits to enforce; `None` uses `ResourceLimits::default()`.
    pub limits: Option<ResourceLimits>,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            fact_rule: "fact".to_string(),
            var_range_expr: "^v_".to_string(),
            var_pat: r#""_"* ~ "X" ~ ASCII_DIGIT+"#.to_string(),
            fact_sep: ";".to_string(),
            limits: None,
        }
    }
}

/// The boundary the core (`fact_set`, `cond_set`, `cons_set`, `engine`) is
/// generic over. Any implementation satisfying this contract is acceptable;
/// the core never downcasts to a concrete grammar.
pub trait Grammar {
    /// Parse one `tell`-able line: a rule (`cond ; cond -> cons ; cons`) or
    /// a plain fact. `rm <fact>` removal is recognized by the engine as a
    /// textual prefix before this is ever called, on the remainder.
    fn parse(&self, text: &str) -> FactumResult<Sentence>;

    /// Parse a single fact production in isolation. Used both for querying
    /// and to re-parse a fact after substitution.
    fn parse_fact(&self, text: &str) -> FactumResult<Fact>;

    /// `true` iff `expr` names a variable-range production: an interior
    /// node whose whole sub-tree may be bound to a variable.
    fn is_var_range(&self, expr: &str) -> bool;

    /// Grammar-specific ordering predicate: can a node at `a` follow a node
    /// at `b` in some valid fact? Used by `CondSet::propagate` to prune
    /// branches that could never share a fact. Conservative implementations
    /// may always return `true`.
    fn can_follow(&self, a: &Path, b: &Path) -> bool;
}
