//! Matching: an ordered, immutable key -> value map over Segments.

use crate::fact::Fact;
use crate::segment::Segment;
use std::rc::Rc;

/// Raised by `Matching::merge` when the same key is bound to two different
/// values in the matchings being combined. Private to this module: callers
/// that can encounter it (`Engine::goal`) catch it and discard the
/// combination rather than letting it surface as a `FactumError`.
#[derive(Debug, Clone)]
pub struct MergeConflict;

impl std::fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conflicting bindings for the same key")
    }
}

/// An ordered association list from Segment to Segment, plus the Fact (if
/// any) the matching originated from. Insertion order is preserved; keys
/// are unique within a single Matching.
#[derive(Debug, Clone, Default)]
pub struct Matching {
    mapping: Rc<Vec<(Segment, Segment)>>,
    pub origin: Option<Rc<Fact>>,
}

impl Matching {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(origin: Rc<Fact>) -> Self {
        Self {
            mapping: Rc::new(Vec::new()),
            origin: Some(origin),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn entries(&self) -> &[(Segment, Segment)] {
        &self.mapping
    }

    pub fn contains(&self, key: &Segment) -> bool {
        self.mapping.iter().any(|(k, _)| k == key)
    }

    /// Forward lookup: the value bound to `key`, if any.
    pub fn get(&self, key: &Segment) -> Option<&Segment> {
        self.mapping.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Reverse lookup: the key bound to `value`, if any. Used by query
    /// matching to detect "this concrete value is already the binding of
    /// some variable", so a repeated variable rewrites to an already-bound
    /// branch instead of introducing a fresh one.
    pub fn getkey(&self, value: &Segment) -> Option<&Segment> {
        self.mapping.iter().find(|(_, v)| v == value).map(|(k, _)| k)
    }

    /// Returns a new Matching with `key -> value` appended. Does not check
    /// for a pre-existing binding of `key`; callers that care use `get`
    /// first (mirrors the reference system, which treats `setitem` as an
    /// append reserved for fresh keys).
    pub fn setitem(&self, key: Segment, value: Segment) -> Matching {
        let mut mapping = (*self.mapping).clone();
        mapping.push((key, value));
        Matching {
            mapping: Rc::new(mapping),
            origin: self.origin.clone(),
        }
    }

    /// Swap keys and values.
    pub fn invert(&self) -> Matching {
        let mapping = self.mapping.iter().map(|(k, v)| (v.clone(), k.clone())).collect();
        Matching {
            mapping: Rc::new(mapping),
            origin: self.origin.clone(),
        }
    }

    /// Combine `self` and `other`, keeping `self`'s order first. Fails if
    /// the two matchings disagree on the value bound to some key.
    pub fn merge(&self, other: &Matching) -> Result<Matching, MergeConflict> {
        let mut mapping = (*self.mapping).clone();
        for (k, v) in other.entries() {
            match self.get(k) {
                Some(existing) if existing != v => return Err(MergeConflict),
                Some(_) => continue,
                None => mapping.push((k.clone(), v.clone())),
            }
        }
        Ok(Matching {
            mapping: Rc::new(mapping),
            origin: self.origin.clone().or_else(|| other.origin.clone()),
        })
    }

    /// Rewrite this matching's keys through `varmap` (typically the inverse
    /// of a rule's normalization mapping), producing a matching expressed in
    /// the caller's original variable names rather than the `__Xn` canonical
    /// ones.
    pub fn get_real_matching(&self, varmap: &Matching) -> Matching {
        let mapping = self
            .mapping
            .iter()
            .map(|(k, v)| {
                let real_key = varmap.get(k).cloned().unwrap_or_else(|| k.clone());
                (real_key, v.clone())
            })
            .collect();
        Matching {
            mapping: Rc::new(mapping),
            origin: self.origin.clone(),
        }
    }
}

impl PartialEq for Matching {
    fn eq(&self, other: &Self) -> bool {
        self.mapping.len() == other.mapping.len()
            && self.mapping.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl std::fmt::Display for Matching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.mapping.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k.text, v.text)?;
        }
        write!(f, "}}")
    }
}
