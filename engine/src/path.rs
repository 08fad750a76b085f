//! Paths: routes from a fact's root to one of its segments.

use crate::segment::Segment;
use crate::matching::Matching;
use std::rc::Rc;

/// An immutable, ordered route of `Segment`s from a fact's root to one node.
///
/// The path's *value* is its last segment. Paths are never mutated; every
/// transformation (`substitute`, `change_value`) produces a new `Path`.
#[derive(Debug, Clone)]
pub struct Path {
    segments: Rc<[Segment]>,
}

impl Path {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The last segment, i.e. the node this path points to.
    pub fn value(&self) -> &Segment {
        self.segments.last().expect("path is never empty")
    }

    pub fn is_leaf(&self) -> bool {
        self.value().leaf
    }

    pub fn is_var(&self) -> bool {
        self.value().is_var()
    }

    pub fn can_be_var(&self, grammar: &dyn crate::grammar::Grammar) -> bool {
        self.value().can_be_var(grammar)
    }

    /// Identity for exact-match indexing: the sequence of expr names plus
    /// the final segment's text.
    fn identity_tuple(&self) -> (Vec<&str>, &str) {
        let exprs: Vec<&str> = self.segments.iter().map(|s| &*s.expr).collect();
        (exprs, &self.value().text)
    }

    /// Identity used only to test subpath/prefix relations: the sequence of
    /// expr names, ignoring text.
    fn deep_identity_tuple(&self) -> Vec<&str> {
        self.segments.iter().map(|s| &*s.expr).collect()
    }

    /// `true` iff `other`'s expr sequence is a (non-strict) prefix of
    /// `self`'s, i.e. `self` is `other` or one of its descendants.
    pub fn starts_with(&self, other: &Path) -> bool {
        let mine = self.deep_identity_tuple();
        let theirs = other.deep_identity_tuple();
        mine.len() >= theirs.len() && mine[..theirs.len()] == theirs[..]
    }

    /// Returns the subset of `paths` that lie strictly after the first path
    /// equal to (or prefixed by) `self` — `self`'s own entry in the list.
    /// Used both to recurse into a variable-range sub-tree's own descendants
    /// once the range node itself has been indexed, and to skip past a
    /// whole already-handled sub-tree when walking sibling paths.
    pub fn paths_after(&self, paths: &[Path]) -> Vec<Path> {
        match paths.iter().position(|p| p.starts_with(self)) {
            Some(idx) => paths[idx + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    /// Substitute the first segment bound in `matching`, splicing the new
    /// text into every ancestor segment's text so the invariant "text equals
    /// the concatenation of leaf texts" keeps holding.
    ///
    /// Returns the rewritten path, and `Some(ancestor)` describing the
    /// rewritten ancestor text when a substitution actually occurred.
    pub fn substitute(&self, matching: &Matching) -> (Path, Option<Path>) {
        let segs = self.segments.to_vec();
        let mut replace_at = None;
        for (i, seg) in segs.iter().enumerate() {
            if let Some(bound) = matching.get(seg) {
                replace_at = Some((i, bound.clone()));
                break;
            }
        }
        let Some((idx, new_value)) = replace_at else {
            return (self.clone(), None);
        };

        let delta = new_value.text.len() as isize - segs[idx].text.len() as isize;
        let mut new_segs = segs.clone();
        new_segs[idx] = new_value;

        // Splice the replacement into every ancestor's text and shift
        // offsets of everything after the replaced segment.
        for i in (0..idx).rev() {
            let ancestor = &segs[i];
            let rel_start = (new_segs[idx].start as isize - ancestor.start as isize).max(0) as usize;
            let rel_end = (rel_start as isize + new_segs[idx].text.len() as isize).max(0) as usize;
            let mut new_text = String::with_capacity(ancestor.text.len());
            if rel_start <= ancestor.text.len() {
                new_text.push_str(&ancestor.text[..rel_start.min(ancestor.text.len())]);
            }
            new_text.push_str(&new_segs[idx].text);
            let old_end = (rel_start as isize + segs[idx].text.len() as isize).max(0) as usize;
            if old_end < ancestor.text.len() {
                new_text.push_str(&ancestor.text[old_end..]);
            }
            let new_end = (ancestor.end as isize + delta).max(0) as usize;
            new_segs[i] = ancestor.with_text(new_text, ancestor.start, new_end);
            let _ = rel_end;
        }
        for seg in new_segs.iter_mut().skip(idx + 1) {
            seg.start = (seg.start as isize + delta).max(0) as usize;
            seg.end = (seg.end as isize + delta).max(0) as usize;
        }

        let changed_ancestor = if idx > 0 {
            Some(Path::new(new_segs[..idx].to_vec()))
        } else {
            None
        };
        (Path::new(new_segs), changed_ancestor)
    }

    /// Shorthand for substituting just the last segment with `value`.
    pub fn change_value(&self, value: Segment) -> Path {
        let mut segs = self.segments.to_vec();
        *segs.last_mut().expect("path is never empty") = value;
        Path::new(segs)
    }

    /// Apply `substitute` across `paths`, skipping any path whose ancestor
    /// region was already rewritten by an earlier entry, so each changed
    /// region of the fact's text is spliced exactly once.
    pub fn substitute_paths(paths: &[Path], matching: &Matching) -> Vec<Path> {
        let mut out = Vec::with_capacity(paths.len());
        let mut rewritten_prefix: Option<Path> = None;
        for p in paths {
            if let Some(prefix) = &rewritten_prefix {
                if p.starts_with(prefix) {
                    continue;
                }
            }
            let (new_path, changed_ancestor) = p.substitute(matching);
            if let Some(ancestor) = changed_ancestor {
                rewritten_prefix = Some(ancestor);
            }
            out.push(new_path);
        }
        out
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.identity_tuple() == other.identity_tuple()
    }
}

impl Eq for Path {}

impl std::hash::Hash for Path {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let (exprs, text) = self.identity_tuple();
        exprs.hash(state);
        text.hash(state);
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value().text)
    }
}
