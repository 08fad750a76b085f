//! ConsSet: a discrimination tree over rule consequences, used only by
//! `Engine::goal` to find rules that could derive a goal fact.

use crate::error::FactumResult;
use crate::grammar::Grammar;
use crate::matching::Matching;
use crate::path::Path;
use crate::rule::Rule;
use crate::rule_index::RuleIndex;
use std::rc::Rc;

#[derive(Clone)]
struct ConsEntry {
    invert_varmap: Matching,
    rule: Rc<Rule>,
}

pub struct ConsSet {
    index: RuleIndex<ConsEntry>,
}

impl Default for ConsSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsSet {
    pub fn new() -> Self {
        Self { index: RuleIndex::new() }
    }

    pub fn add_rule(&self, rule: &Rc<Rule>, grammar: &dyn Grammar) -> FactumResult<()> {
        for consequence in &rule.consequences {
            let (invert_varmap, normalized) = consequence.normalize(grammar)?;
            let paths = normalized.get_leaf_paths();
            self.index.insert(
                &paths,
                ConsEntry {
                    invert_varmap,
                    rule: rule.clone(),
                },
            );
        }
        Ok(())
    }

    /// Match a goal fact's leaf paths against every indexed consequence,
    /// returning one `(rule, matching)` backtrack record per rule whose
    /// consequence could produce the goal.
    pub fn propagate(&self, paths: &[Path], grammar: &dyn Grammar) -> Vec<(Rc<Rule>, Matching)> {
        self.index
            .propagate(paths, Matching::new(), grammar)
            .into_iter()
            .map(|(entry, matching)| (entry.rule, matching.get_real_matching(&entry.invert_varmap)))
            .collect()
    }
}
