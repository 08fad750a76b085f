//! # Factum
//!
//! A forward-chaining production-rule engine over a discrimination-tree
//! index of structured facts.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use factum::{Engine, GrammarOptions, FactumResult};
//!
//! fn main() -> FactumResult<()> {
//!     let grammar = r#"
//!         fact = { ident ~ " is " ~ ident }
//!         ident = @{ ASCII_ALPHA+ }
//!     "#;
//!     let mut engine = Engine::new(grammar, GrammarOptions::default())?;
//!     engine.tell("socrates is mortal")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Core concepts
//!
//! ### Facts
//! A fact is a parsed sentence, decomposed into an ordered tuple of
//! [`Path`]s through its grammar's parse tree.
//!
//! ### Rules
//! A rule is a set of conditions which, once all satisfied, fire a set of
//! consequences. Asserting a fact runs it against every indexed condition;
//! satisfying all of a rule's conditions asserts its consequences in turn.
//!
//! ### Grammars
//! The engine is generic over the [`Grammar`] trait. [`grammar::runtime`]
//! provides a concrete implementation that compiles user-supplied PEG
//! grammar text at [`Engine::new`] time.

pub mod ast;
pub mod cond_set;
pub mod cons_set;
pub mod engine;
pub mod error;
pub mod fact;
pub mod fact_set;
pub mod grammar;
pub mod matching;
pub mod path;
pub mod resource_limits;
pub mod rule;
pub mod rule_index;
pub mod segment;

pub use ast::Span;
pub use engine::{Engine, QueryOutcome};
pub use error::{ErrorDetails, FactumError, FactumResult};
pub use fact::Fact;
pub use grammar::{Grammar, GrammarOptions, ParseNode, Sentence};
pub use matching::Matching;
pub use path::Path;
pub use resource_limits::ResourceLimits;
pub use rule::{Activation, ActivationKind, Guard, Precedent, Rule};
pub use segment::Segment;

#[cfg(test)]
mod tests;
