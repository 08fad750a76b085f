//! Engine: the activation queue and saturation loop tying every index
//! together, plus the `tell`/`query`/`ask`/`goal` public surface.

use crate::cond_set::CondSet;
use crate::cons_set::ConsSet;
use crate::error::{FactumError, FactumResult};
use crate::fact::Fact;
use crate::fact_set::FactSet;
use crate::grammar::runtime::RuntimeGrammar;
use crate::grammar::{Grammar, GrammarOptions, Sentence};
use crate::matching::Matching;
use crate::resource_limits::ResourceLimits;
use crate::rule::{Activation, ActivationKind, Precedent, Rule};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

/// The outcome of `query`: present with no variables, absent, or a list of
/// unifying matchings.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    True,
    False,
    Matchings(Vec<Matching>),
}

/// A forward-chaining production-rule engine over a discrimination-tree
/// index of facts, rule conditions and rule consequences.
pub struct Engine {
    grammar: Box<dyn Grammar>,
    fact_set: FactSet,
    cond_set: CondSet,
    cons_set: ConsSet,
    activations: VecDeque<Activation>,
    processing: bool,
    counter: u64,
    seen_rules: HashSet<String>,
    limits: ResourceLimits,
}

impl Engine {
    /// Load a grammar, prefixed internally with the built-in preamble, and
    /// build an otherwise-empty engine.
    pub fn new(grammar_text: &str, options: GrammarOptions) -> FactumResult<Self> {
        let limits = options.limits.clone().unwrap_or_default();
        let grammar = RuntimeGrammar::new(grammar_text, options)?;
        Ok(Self::with_grammar(Box::new(grammar), limits))
    }

    /// Build an engine from an already-constructed `Grammar`, bypassing the
    /// runtime PEG backend (e.g. for a hand-written `Grammar` implementation
    /// in tests, or a host embedding its own parser).
    pub fn with_grammar(grammar: Box<dyn Grammar>, limits: ResourceLimits) -> Self {
        Self {
            grammar,
            fact_set: FactSet::new(),
            cond_set: CondSet::new(),
            cons_set: ConsSet::new(),
            activations: VecDeque::new(),
            processing: false,
            counter: 0,
            seen_rules: HashSet::new(),
            limits,
        }
    }

    /// Activations processed over the engine's whole lifetime, for
    /// benchmarking.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Assert a fact, a rule (`cond ; cond -> cons ; cons`), or `rm <fact>`.
    pub fn tell(&mut self, text: &str) -> FactumResult<()> {
        let trimmed = text.trim();
        if let Some(rest) = trimmed.strip_prefix("rm ") {
            let fact = self.grammar.parse_fact(rest.trim())?;
            self.activations.push_back(Activation::for_removal(fact));
        } else {
            match self.grammar.parse(trimmed)? {
                Sentence::Fact(fact) => {
                    self.activations.push_back(Activation::for_fact(fact));
                }
                Sentence::Rule { conditions, consequences } => {
                    let rule = Rc::new(Rule::new(conditions, consequences));
                    self.activations
                        .push_back(Activation::for_rule(rule, Matching::new(), None, true));
                }
            }
        }
        self.process()
    }

    /// Raw unification query: the list of matchings for every way `fact`
    /// (which may contain variables) unifies with a known fact.
    pub fn ask(&self, fact: &Fact) -> Vec<Matching> {
        self.fact_set.ask_fact(fact, self.grammar.as_ref())
    }

    /// Parse `text` as a fact and run `ask`, collapsing the result the way
    /// a user expects from a yes/no/bindings query.
    pub fn query(&self, text: &str) -> FactumResult<QueryOutcome> {
        let fact = self.grammar.parse_fact(text.trim())?;
        Ok(collapse(self.ask(&fact)))
    }

    /// Backward-chaining goal query: for the fact named by `text`, return
    /// every set of facts that, if told, would let some rule derive it.
    pub fn goal(&self, text: &str) -> FactumResult<Vec<Vec<Fact>>> {
        let goal_fact = self.grammar.parse_fact(text.trim())?;
        let backtracks = self
            .cons_set
            .propagate(&goal_fact.get_leaf_paths(), self.grammar.as_ref());

        let mut fulfillments = Vec::new();
        for (rule, rule_matching) in backtracks {
            let mut known: Vec<Vec<Matching>> = Vec::new();
            let mut needed: Vec<Fact> = Vec::new();
            for condition in &rule.conditions {
                let substituted = condition.substitute(&rule_matching, self.grammar.as_ref())?;
                let answers = self.ask(&substituted);
                if answers.is_empty() {
                    needed.push(substituted);
                } else {
                    known.push(answers);
                }
            }
            for combo in cartesian(&known) {
                let mut merged = rule_matching.clone();
                let mut ok = true;
                for m in &combo {
                    match merged.merge(m) {
                        Ok(next) => merged = next,
                        Err(_) => {
                            ok = false;
                            break;
                        }
                    }
                }
                if !ok {
                    continue;
                }
                let mut resolved = Vec::with_capacity(needed.len());
                for n in &needed {
                    resolved.push(n.substitute(&merged, self.grammar.as_ref())?);
                }
                fulfillments.push(resolved);
            }
        }
        Ok(fulfillments)
    }

    fn process(&mut self) -> FactumResult<()> {
        if self.processing {
            return Ok(());
        }
        self.processing = true;
        self.seen_rules.clear();

        let result = self.drain();
        self.processing = false;
        result
    }

    fn drain(&mut self) -> FactumResult<()> {
        let mut this_tell = 0u64;
        while let Some(activation) = self.activations.pop_front() {
            self.counter += 1;
            this_tell += 1;
            if this_tell > self.limits.max_activations_per_tell {
                return Err(FactumError::resource_limit(format!(
                    "saturation loop exceeded {} activations",
                    self.limits.max_activations_per_tell
                )));
            }
            match activation.kind {
                ActivationKind::Fact => self.process_fact(activation)?,
                ActivationKind::Rule => self.process_rule(activation)?,
                ActivationKind::Rm => self.process_removal(activation),
            }
        }
        Ok(())
    }

    fn process_fact(&mut self, activation: Activation) -> FactumResult<()> {
        let Precedent::Fact(fact) = activation.precedent else {
            unreachable!("fact activation always carries a Fact precedent")
        };
        if !matches!(collapse(self.ask(&fact)), QueryOutcome::True) {
            let new_activations: Vec<Activation> = self
                .cond_set
                .propagate(&fact.get_leaf_paths(), self.grammar.as_ref())
                .into_iter()
                .map(|(rule, condition, matching)| Activation::for_rule(rule, matching, Some(condition), false))
                .collect();
            self.activations.extend(new_activations);
            self.fact_set.add_fact(&fact, self.grammar.as_ref());
        }
        Ok(())
    }

    fn process_rule(&mut self, activation: Activation) -> FactumResult<()> {
        let query_rules = activation.query_rules;
        let matching = activation.matching.clone();
        let condition = activation.condition.clone();
        let Precedent::Rule(rule) = activation.precedent else {
            unreachable!("rule activation always carries a Rule precedent")
        };

        if rule.conditions.len() > 1 || condition.is_none() {
            let specialized = Rc::new(specialize(&rule, &condition, &matching, self.grammar.as_ref())?);
            self.cond_set.add_rule(&specialized, self.grammar.as_ref())?;
            self.cons_set.add_rule(&specialized, self.grammar.as_ref())?;
            if query_rules {
                self.backfill(&specialized);
            }
        } else {
            for consequence in &rule.consequences {
                let fact = consequence.substitute(&matching, self.grammar.as_ref())?;
                self.activations.push_back(Activation::for_fact(fact));
            }
            if query_rules {
                self.backfill(&rule);
            }
        }
        Ok(())
    }

    fn process_removal(&mut self, activation: Activation) {
        let Precedent::Fact(fact) = activation.precedent else {
            unreachable!("rm activation always carries a Fact precedent")
        };
        self.fact_set.remove_fact(&fact, self.grammar.as_ref());
    }

    /// Match `rule`'s conditions against every already-known fact, so a
    /// freshly specialized or added rule participates in facts asserted
    /// before it existed.
    fn backfill(&mut self, rule: &Rc<Rule>) {
        for condition in &rule.conditions {
            for matching in self.ask(condition) {
                let key = Activation::dedup_key(rule, &matching, condition);
                if self.seen_rules.insert(key) {
                    self.activations.push_back(Activation::for_rule(
                        rule.clone(),
                        matching,
                        Some(condition.clone()),
                        true,
                    ));
                }
            }
        }
    }
}

/// Produce a specialized rule: the conditions of `rule` other than
/// `satisfied`, substituted through `matching`, and the consequences
/// likewise substituted. Only called when more than one condition remains
/// unsatisfied; a single-condition rule's consequences become fact
/// activations directly instead.
fn specialize(
    rule: &Rule,
    satisfied: &Option<Fact>,
    matching: &Matching,
    grammar: &dyn Grammar,
) -> FactumResult<Rule> {
    let mut conditions = Vec::new();
    for condition in &rule.conditions {
        if let Some(done) = satisfied {
            if condition == done {
                continue;
            }
        }
        conditions.push(condition.substitute(matching, grammar)?);
    }
    let mut consequences = Vec::new();
    for consequence in &rule.consequences {
        consequences.push(consequence.substitute(matching, grammar)?);
    }
    Ok(Rule::new(conditions, consequences))
}

fn collapse(matchings: Vec<Matching>) -> QueryOutcome {
    if matchings.is_empty() {
        QueryOutcome::False
    } else if matchings.len() == 1 && matchings[0].is_empty() {
        QueryOutcome::True
    } else {
        QueryOutcome::Matchings(matchings)
    }
}

/// Cartesian product over a list of matching-lists, one choice per list.
fn cartesian(lists: &[Vec<Matching>]) -> Vec<Vec<Matching>> {
    let mut combos: Vec<Vec<Matching>> = vec![Vec::new()];
    for list in lists {
        let mut next = Vec::with_capacity(combos.len() * list.len().max(1));
        for combo in &combos {
            for m in list {
                let mut extended = combo.clone();
                extended.push(m.clone());
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}
