//! Unit tests for the value-type algebra: Segment, Path, Matching, Fact.

use crate::ast::Span;
use crate::grammar::Grammar;
use crate::matching::Matching;
use crate::path::Path;
use crate::segment::Segment;

/// A minimal `Grammar` for unit tests that never parses text, only answers
/// the two structural questions `Path::can_be_var` needs.
struct StubGrammar;

impl Grammar for StubGrammar {
    fn parse(&self, _text: &str) -> crate::error::FactumResult<crate::grammar::Sentence> {
        unimplemented!("StubGrammar is for Path/Segment unit tests only")
    }

    fn parse_fact(&self, _text: &str) -> crate::error::FactumResult<crate::fact::Fact> {
        unimplemented!("StubGrammar is for Path/Segment unit tests only")
    }

    fn is_var_range(&self, expr: &str) -> bool {
        expr.starts_with("v_")
    }

    fn can_follow(&self, _a: &Path, _b: &Path) -> bool {
        true
    }
}

fn seg(expr: &str, text: &str, start: usize, leaf: bool) -> Segment {
    Segment::new(expr, text, start, start + text.len(), leaf)
}

#[test]
fn segment_identity_ignores_offsets() {
    let a = seg("ident", "socrates", 0, true);
    let b = seg("ident", "socrates", 40, true);
    assert_eq!(a, b);
    let c = seg("ident", "plato", 0, true);
    assert_ne!(a, c);
}

#[test]
fn path_can_be_var_covers_leaf_and_range() {
    let grammar = StubGrammar;
    let leaf_var = Path::new(vec![Segment::make_var("X1", Span::synthetic())]);
    assert!(leaf_var.can_be_var(&grammar));

    let range = Path::new(vec![seg("v_subject", "socrates is mortal", 0, false)]);
    assert!(range.can_be_var(&grammar));

    let plain = Path::new(vec![seg("ident", "socrates", 0, true)]);
    assert!(!plain.can_be_var(&grammar));
}

#[test]
fn path_starts_with_and_paths_after() {
    let root = seg("fact", "a is b", 0, false);
    let subject = seg("ident", "a", 0, true);
    let copula = seg("copula", " is ", 1, false);
    let object = seg("ident", "b", 5, true);

    let p_subject = Path::new(vec![root.clone(), subject]);
    let p_copula = Path::new(vec![root.clone(), copula.clone()]);
    let p_object_of_copula = Path::new(vec![root.clone(), copula, object]);

    // The descendant (longer path) starts with its ancestor, not the other
    // way around — `self` is the receiver, `other` the candidate prefix.
    assert!(p_object_of_copula.starts_with(&p_copula));
    assert!(!p_copula.starts_with(&p_object_of_copula));

    let all = vec![p_subject.clone(), p_copula.clone(), p_object_of_copula.clone()];
    let after = p_copula.paths_after(&all);
    assert_eq!(after.len(), 1);
    assert_eq!(after[0], p_object_of_copula);
}

#[test]
fn path_substitute_splices_ancestor_text() {
    let root = seg("fact", "X1 is mortal", 0, false);
    let var_seg = Segment::make_var("X1", Span { start: 0, end: 2, line: 1, col: 1 });
    let path = Path::new(vec![root, var_seg.clone()]);

    let replacement = seg("ident", "socrates", 0, true);
    let matching = Matching::new().setitem(var_seg, replacement.clone());

    let (new_path, changed_ancestor) = path.substitute(&matching);
    assert_eq!(new_path.value().text.as_ref(), "socrates");
    let ancestor = changed_ancestor.expect("root should have been rewritten");
    assert_eq!(ancestor.value().text.as_ref(), "socrates is mortal");
}

#[test]
fn matching_merge_detects_conflicts() {
    let x = Segment::new("var", "X1", 0, 2, true);
    let a = Segment::new("ident", "a", 0, 1, true);
    let b = Segment::new("ident", "b", 0, 1, true);

    let m1 = Matching::new().setitem(x.clone(), a.clone());
    let m2 = Matching::new().setitem(x.clone(), a.clone());
    assert!(m1.merge(&m2).is_ok());

    let m3 = Matching::new().setitem(x, b);
    assert!(m1.merge(&m3).is_err());
}

#[test]
fn matching_invert_and_real_matching_roundtrip() {
    let canonical = Segment::new("var", "__X1", 0, 4, true);
    let user = Segment::new("var", "X1", 0, 2, true);
    let value = Segment::new("ident", "socrates", 0, 8, true);

    // varmap: canonical -> user (as produced by Fact::normalize's inverse).
    let varmap = Matching::new().setitem(canonical.clone(), user.clone());
    let bound = Matching::new().setitem(canonical, value.clone());

    let real = bound.get_real_matching(&varmap);
    assert_eq!(real.get(&user), Some(&value));
}
