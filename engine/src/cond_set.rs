//! CondSet: a discrimination tree of rule conditions, producing activations
//! when a newly asserted fact's paths satisfy one.

use crate::error::FactumResult;
use crate::fact::Fact;
use crate::grammar::Grammar;
use crate::matching::Matching;
use crate::rule::Rule;
use crate::rule_index::RuleIndex;
use std::rc::Rc;

/// One matched condition: the normalized condition itself, the mapping back
/// to the rule's original variable names, and the rule it belongs to.
#[derive(Clone)]
struct CondEntry {
    condition: Fact,
    invert_varmap: Matching,
    rule: Rc<Rule>,
}

pub struct CondSet {
    index: RuleIndex<CondEntry>,
}

impl Default for CondSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CondSet {
    pub fn new() -> Self {
        Self { index: RuleIndex::new() }
    }

    /// Normalize every condition of `rule` and insert it, so a later
    /// `propagate` can recognize a fact that satisfies it.
    pub fn add_rule(&self, rule: &Rc<Rule>, grammar: &dyn Grammar) -> FactumResult<()> {
        tracing::debug!(rule = %rule, "adding rule to condition set");
        for condition in &rule.conditions {
            let (invert_varmap, normalized) = condition.normalize(grammar)?;
            let paths = normalized.get_leaf_paths();
            self.index.insert(
                &paths,
                CondEntry {
                    condition: condition.clone(),
                    invert_varmap,
                    rule: rule.clone(),
                },
            );
        }
        Ok(())
    }

    /// Match a newly asserted fact's leaf paths against every indexed
    /// condition, returning one `(rule, condition, matching)` triple per
    /// satisfied condition, with the matching rewritten into the rule's
    /// original variable names.
    pub fn propagate(&self, paths: &[crate::path::Path], grammar: &dyn Grammar) -> Vec<(Rc<Rule>, Fact, Matching)> {
        self.index
            .propagate(paths, Matching::new(), grammar)
            .into_iter()
            .map(|(entry, matching)| {
                let real = matching.get_real_matching(&entry.invert_varmap);
                (entry.rule, entry.condition, real)
            })
            .collect()
    }
}
