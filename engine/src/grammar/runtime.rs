//! Concrete `Grammar` backed by a user-supplied PEG grammar, compiled at
//! construction time with a PEG virtual machine rather than a compile-time
//! derive macro, since the grammar text is only known at runtime.

use super::{Grammar, GrammarOptions, ParseNode, Sentence};
use crate::error::FactumError;
use crate::fact::Fact;
use crate::path::Path;
use crate::resource_limits::ResourceLimits;
use pest::iterators::Pair;
use pest_meta::optimizer::OptimizedRule;
use regex::Regex;

const SENTENCE_RULE: &str = "__sentence__";
const FACT_ONLY_RULE: &str = "__fact_only__";
const RULE_RULE: &str = "__rule__";
const CONDS_RULE: &str = "__conds__";
const CONSS_RULE: &str = "__conss__";

/// A `Grammar` whose productions come from PEG source text supplied at
/// `Engine::new` time. Prefixed with a built-in preamble defining
/// `__sentence__`, `__rule__`, `__conds__`, `__conss__`, `__arrow__`,
/// `__var__`, `__ws__` and `__sc__`, so the user's grammar only has to
/// define the shape of a single fact (named by `fact_rule`) and reference
/// `__var__` wherever a variable may appear.
pub struct RuntimeGrammar {
    rules: Vec<OptimizedRule>,
    options: GrammarOptions,
    var_range: Regex,
    limits: ResourceLimits,
}

impl RuntimeGrammar {
    pub fn new(grammar_text: &str, options: GrammarOptions) -> Result<Self, FactumError> {
        let limits = options.limits.clone().unwrap_or_default();
        if grammar_text.len() > limits.max_grammar_bytes {
            return Err(FactumError::resource_limit(format!(
                "grammar text is {} bytes, exceeding the {}-byte limit",
                grammar_text.len(),
                limits.max_grammar_bytes
            )));
        }

        let var_range = Regex::new(&options.var_range_expr)
            .map_err(|e| FactumError::grammar_misconfig(format!("invalid var_range_expr: {e}")))?;

        let full_text = format!("{}\n{}", preamble(&options), grammar_text);
        let (_, rules) = pest_meta::parse_and_optimize(&full_text)
            .map_err(|errs| {
                let joined = errs.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
                FactumError::grammar_misconfig(format!("grammar failed to compile: {joined}"))
            })?;

        Ok(Self {
            rules,
            options,
            var_range,
            limits,
        })
    }

    fn vm(&self) -> pest_vm::Vm {
        pest_vm::Vm::new(self.rules.clone())
    }

    fn to_node(&self, pair: Pair<'_, &str>, depth: usize) -> Result<ParseNode, FactumError> {
        if depth > self.limits.max_path_depth {
            return Err(FactumError::resource_limit(format!(
                "parse tree depth exceeded the {}-node limit",
                self.limits.max_path_depth
            )));
        }
        let expr = pair.as_rule().to_string();
        let span = pair.as_span();
        let text = pair.as_str().to_string();
        let start = span.start();
        let end = span.end();
        let mut children = Vec::new();
        for inner in pair.into_inner() {
            children.push(self.to_node(inner, depth + 1)?);
        }
        Ok(ParseNode {
            expr: expr.into(),
            text: text.into(),
            start,
            end,
            children,
        })
    }

    fn split_fact_list(&self, node: &ParseNode) -> Result<Vec<Fact>, FactumError> {
        node.children
            .iter()
            .filter(|c| &*c.expr == self.options.fact_rule)
            .map(|c| Ok(Fact::from_parse_tree(c, self)))
            .collect()
    }
}

impl Grammar for RuntimeGrammar {
    fn parse(&self, text: &str) -> Result<Sentence, FactumError> {
        if text.len() > self.limits.max_fact_text_bytes {
            return Err(FactumError::resource_limit(format!(
                "sentence is {} bytes, exceeding the {}-byte limit",
                text.len(),
                self.limits.max_fact_text_bytes
            )));
        }
        let mut pairs = self.vm().parse(SENTENCE_RULE, text).map_err(|e| {
            let span = crate::ast::Span::from_pest_error(&e);
            FactumError::parse(e.to_string(), span, text)
        })?;
        let top = pairs.next().ok_or_else(|| {
            FactumError::parse("empty parse result", crate::ast::Span::from_offsets(0, text.len(), text), text)
        })?;
        let top_span = top.as_span();
        let inner = top.into_inner().next().ok_or_else(|| {
            FactumError::parse(
                "sentence produced no inner node",
                crate::ast::Span::from_pest_span(top_span),
                text,
            )
        })?;
        let node = self.to_node(inner, 0)?;

        if &*node.expr == RULE_RULE {
            let conds_node = node.children.iter().find(|c| &*c.expr == CONDS_RULE).ok_or_else(|| {
                FactumError::parse(
                    "rule is missing conditions",
                    crate::ast::Span::from_offsets(node.start, node.end, text),
                    text,
                )
            })?;
            let conss_node = node.children.iter().find(|c| &*c.expr == CONSS_RULE).ok_or_else(|| {
                FactumError::parse(
                    "rule is missing consequences",
                    crate::ast::Span::from_offsets(node.start, node.end, text),
                    text,
                )
            })?;
            Ok(Sentence::Rule {
                conditions: self.split_fact_list(conds_node)?,
                consequences: self.split_fact_list(conss_node)?,
            })
        } else {
            Ok(Sentence::Fact(Fact::from_parse_tree(&node, self)))
        }
    }

    fn parse_fact(&self, text: &str) -> Result<Fact, FactumError> {
        if text.len() > self.limits.max_fact_text_bytes {
            return Err(FactumError::resource_limit(format!(
                "fact is {} bytes, exceeding the {}-byte limit",
                text.len(),
                self.limits.max_fact_text_bytes
            )));
        }
        let mut pairs = self.vm().parse(FACT_ONLY_RULE, text).map_err(|e| {
            let span = crate::ast::Span::from_pest_error(&e);
            FactumError::parse(e.to_string(), span, text)
        })?;
        let wrapper = pairs.next().ok_or_else(|| {
            FactumError::parse("empty parse result", crate::ast::Span::from_offsets(0, text.len(), text), text)
        })?;
        let wrapper_span = wrapper.as_span();
        let top = wrapper.into_inner().next().ok_or_else(|| {
            FactumError::parse(
                "fact produced no inner node",
                crate::ast::Span::from_pest_span(wrapper_span),
                text,
            )
        })?;
        let node = self.to_node(top, 0)?;
        Ok(Fact::from_parse_tree(&node, self))
    }

    fn is_var_range(&self, expr: &str) -> bool {
        self.var_range.is_match(expr)
    }

    /// The reference implementation's own grammars rely on this always
    /// returning `true`, leaving pruning to the structural children lookups
    /// in `CondSet::propagate`.
    fn can_follow(&self, _a: &Path, _b: &Path) -> bool {
        true
    }
}

fn preamble(options: &GrammarOptions) -> String {
    format!(
        r#"__ws__ = _{{ (" " | "\t" | "\r" | "\n")* }}
__sc__ = _{{ "{sep}" }}
__arrow__ = _{{ "->" }}
__var__ = @{{ {var_pat} }}
__conds__ = {{ {fact} ~ (__ws__ ~ __sc__ ~ __ws__ ~ {fact})* }}
__conss__ = {{ {fact} ~ (__ws__ ~ __sc__ ~ __ws__ ~ {fact})* }}
__rule__ = {{ __conds__ ~ __ws__ ~ __arrow__ ~ __ws__ ~ __conss__ }}
__sentence__ = {{ (__rule__ | {fact}) ~ __ws__ ~ EOI }}
__fact_only__ = {{ {fact} ~ __ws__ ~ EOI }}
"#,
        sep = options.fact_sep,
        fact = options.fact_rule,
        var_pat = options.var_pat,
    )
}
