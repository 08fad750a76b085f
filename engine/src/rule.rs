//! Rules, and the activations they and facts produce as pending engine work.

use crate::error::FactumResult;
use crate::fact::Fact;
use crate::matching::Matching;
use std::fmt;
use std::rc::Rc;

/// An opaque, pluggable predicate attached to a rule condition, standing in
/// for an embedded evaluator (e.g. `<python> expr` in the reference system).
/// The core never interprets the guard body; it just asks whether the
/// current matching passes, is refined, or fails.
pub trait Guard {
    fn check(&self, matching: &Matching) -> FactumResult<Option<Matching>>;
}

/// A production rule: a set of conditions which, once all satisfied, fire a
/// set of consequences.
#[derive(Clone)]
pub struct Rule {
    pub conditions: Vec<Fact>,
    pub consequences: Vec<Fact>,
    pub guard: Option<Rc<dyn Guard>>,
}

impl Rule {
    pub fn new(conditions: Vec<Fact>, consequences: Vec<Fact>) -> Self {
        Self {
            conditions,
            consequences,
            guard: None,
        }
    }

    pub fn with_guard(mut self, guard: Rc<dyn Guard>) -> Self {
        self.guard = Some(guard);
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conds: Vec<&str> = self.conditions.iter().map(|c| c.text.as_ref()).collect();
        let conss: Vec<&str> = self.consequences.iter().map(|c| c.text.as_ref()).collect();
        write!(f, "{} -> {}", conds.join(" ; "), conss.join(" ; "))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("conditions", &self.conditions)
            .field("consequences", &self.consequences)
            .finish()
    }
}

/// What an `Activation` was raised from: a ground fact, a rule, or a
/// removal request.
#[derive(Clone)]
pub enum Precedent {
    Fact(Fact),
    Rule(Rc<Rule>),
}

impl fmt::Display for Precedent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precedent::Fact(fact) => write!(f, "{fact}"),
            Precedent::Rule(rule) => write!(f, "{rule}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    Fact,
    Rule,
    Rm,
}

/// A unit of pending work in the engine's FIFO activation queue.
#[derive(Clone)]
pub struct Activation {
    pub kind: ActivationKind,
    pub precedent: Precedent,
    pub matching: Matching,
    /// Which rule condition was just satisfied, for `Rule` activations.
    pub condition: Option<Fact>,
    /// Whether a newly added/specialized rule should also be matched
    /// against every already-known fact (backfill).
    pub query_rules: bool,
}

impl Activation {
    pub fn for_fact(fact: Fact) -> Self {
        Self {
            kind: ActivationKind::Fact,
            precedent: Precedent::Fact(fact),
            matching: Matching::new(),
            condition: None,
            query_rules: false,
        }
    }

    pub fn for_rule(rule: Rc<Rule>, matching: Matching, condition: Option<Fact>, query_rules: bool) -> Self {
        Self {
            kind: ActivationKind::Rule,
            precedent: Precedent::Rule(rule),
            matching,
            condition,
            query_rules,
        }
    }

    pub fn for_removal(fact: Fact) -> Self {
        Self {
            kind: ActivationKind::Rm,
            precedent: Precedent::Fact(fact),
            matching: Matching::new(),
            condition: None,
            query_rules: false,
        }
    }

    /// Dedup key used by `seen_rules`: identifies a (rule, matching,
    /// condition) triple so backfill never re-creates the activation that
    /// spawned the rule it is backfilling.
    pub fn dedup_key(rule: &Rule, matching: &Matching, condition: &Fact) -> String {
        format!("{rule}{matching}{condition}")
    }
}
