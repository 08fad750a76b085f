//! Fact: a parsed sentence as a flat, ordered tuple of paths.

use crate::grammar::{Grammar, ParseNode};
use crate::matching::Matching;
use crate::path::Path;
use crate::segment::Segment;
use std::rc::Rc;

/// An immutable parsed fact: its full text, and the ordered tuple of paths
/// whose final segment is either a leaf or a variable-range node.
///
/// Invariant: `text` equals the concatenation of the leaf segments' texts in
/// left-to-right order, and `paths` are listed in that same depth-first
/// order.
#[derive(Debug, Clone)]
pub struct Fact {
    pub text: Rc<str>,
    paths: Rc<[Path]>,
}

impl Fact {
    pub fn new(text: impl Into<Rc<str>>, paths: Vec<Path>) -> Self {
        Self {
            text: text.into(),
            paths: paths.into(),
        }
    }

    /// DFS visit of a parse tree, emitting a Path for every node whose final
    /// segment is a leaf or a variable-range node (per the grammar's
    /// `var_range` pattern). Interior nodes that are neither stop the
    /// recursion from emitting a path for themselves but still contribute
    /// their children.
    pub fn from_parse_tree(tree: &ParseNode, grammar: &dyn Grammar) -> Fact {
        let mut paths = Vec::new();
        let mut prefix = Vec::new();
        visit(tree, grammar, &mut prefix, &mut paths);
        Fact::new(tree.text.clone(), paths)
    }

    /// All indexed paths (leaf and variable-range), in depth-first order.
    /// Used when inserting a fact into a discrimination tree, so
    /// variable-range sub-trees are shared across facts with matching
    /// structure.
    pub fn get_all_paths(&self) -> Vec<Path> {
        self.paths.to_vec()
    }

    /// Only the leaf paths, in depth-first order. Used as the query key when
    /// asking a fact set for matches.
    pub fn get_leaf_paths(&self) -> Vec<Path> {
        self.paths.iter().filter(|p| p.is_leaf()).cloned().collect()
    }

    /// Substitute `matching` into this fact's paths, reassemble the leaves'
    /// text, and re-parse to rebuild consistent offsets and expr tags.
    pub fn substitute(&self, matching: &Matching, grammar: &dyn Grammar) -> crate::error::FactumResult<Fact> {
        let new_paths = Path::substitute_paths(&self.paths, matching);
        let text: String = new_paths
            .iter()
            .filter(|p| p.is_leaf())
            .map(|p| p.value().text.as_ref())
            .collect();
        grammar.parse_fact(&text)
    }

    /// Rename every variable to `__X1, __X2, ...` in first-appearance order.
    /// Returns the inverse mapping (canonical -> user) and the normalized
    /// fact.
    pub fn normalize(&self, grammar: &dyn Grammar) -> crate::error::FactumResult<(Matching, Fact)> {
        let mut varmap = Matching::new();
        let mut next = 1usize;
        let mut new_leaf_segs: Vec<Segment> = Vec::new();
        for path in self.get_leaf_paths() {
            let seg = path.value();
            if seg.is_var() {
                let canonical = if let Some(bound) = varmap.getkey(seg) {
                    bound.clone()
                } else {
                    let name = format!("__X{next}");
                    next += 1;
                    let canonical = Segment::make_var(&name, crate::ast::Span::synthetic());
                    varmap = varmap.setitem(canonical.clone(), seg.clone());
                    canonical
                };
                new_leaf_segs.push(canonical);
            } else {
                new_leaf_segs.push(seg.clone());
            }
        }
        let text: String = new_leaf_segs.iter().map(|s| s.text.as_ref()).collect();
        let normalized = grammar.parse_fact(&text)?;
        Ok((varmap, normalized))
    }
}

fn visit(node: &ParseNode, grammar: &dyn Grammar, prefix: &mut Vec<Segment>, out: &mut Vec<Path>) {
    let leaf = node.children.is_empty();
    let segment = Segment::new(
        node.expr.clone(),
        node.text.clone(),
        node.start,
        node.end,
        leaf,
    );
    prefix.push(segment);
    let include = {
        let seg = prefix.last().unwrap();
        seg.leaf || grammar.is_var_range(&seg.expr)
    };
    if include {
        out.push(Path::new(prefix.clone()));
    }
    for child in &node.children {
        visit(child, grammar, prefix, out);
    }
    prefix.pop();
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Fact {}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
