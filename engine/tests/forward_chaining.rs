//! End-to-end scenarios exercising the saturation loop, removal, backward
//! chaining, and resource limits through a small runtime PEG grammar.

use factum::error::FactumError;
use factum::{Engine, GrammarOptions, QueryOutcome, ResourceLimits};

/// `subject is object`, where either side may be a bound variable (`var`)
/// or a plain identifier.
const IS_A_GRAMMAR: &str = r#"
fact = { (var | ident) ~ " is " ~ (var | ident) }
var = @{ __var__ }
ident = @{ ASCII_ALPHA+ }
"#;

fn engine() -> Engine {
    Engine::new(IS_A_GRAMMAR, GrammarOptions::default()).expect("grammar should compile")
}

/// Bold (`((...))`) and italic (`''...''`) facts wrapping either a bound
/// variable or an opaque run of text. The variable alternative sits
/// alongside `v_content` rather than inside it, so a query built only of
/// `var` segments binds straight to the stored `v_content` sub-tree.
const BOLD_ITALIC_GRAMMAR: &str = r#"
fact = { bold | italic }
bold = { "((" ~ (var | v_content) ~ "))" }
italic = { "''" ~ (var | v_content) ~ "''" }
var = @{ __var__ }
v_content = @{ (!("))" | "''") ~ ANY)+ }
"#;

fn bold_italic_engine() -> Engine {
    Engine::new(BOLD_ITALIC_GRAMMAR, GrammarOptions::default()).expect("grammar should compile")
}

#[test]
fn var_range_fact_round_trips_and_binds_to_whole_segment() {
    let mut e = bold_italic_engine();
    e.tell("((ho ho))").unwrap();

    assert!(matches!(e.query("((ho ho))").unwrap(), QueryOutcome::True));
    assert!(matches!(e.query("((hi hi))").unwrap(), QueryOutcome::False));
    // Parses fine (italic is a sibling fact shape) but was never told.
    assert!(matches!(e.query("''ho ho''").unwrap(), QueryOutcome::False));

    match e.query("((X1))").unwrap() {
        QueryOutcome::Matchings(matchings) => {
            assert_eq!(matchings.len(), 1);
            assert_eq!(matchings[0].entries().len(), 1);
            let (key, value) = &matchings[0].entries()[0];
            assert_eq!(key.text.as_ref(), "X1");
            assert_eq!(value.text.as_ref(), "ho ho");
        }
        other => panic!("expected a single binding, got {other:?}"),
    }
}

/// A two-field fact, each field either a bound variable or an opaque
/// parenthesized pair, so each field's whole sub-tree is a shareable
/// variable-range node — the case `follow_paths`/`create_paths` must walk
/// past an indexed node's own entry to reach its sibling field.
const TRANSLATION_GRAMMAR: &str = r#"
fact = { "(es : " ~ (var | v_pair) ~ ", en : " ~ (var | v_pair) ~ ")" }
v_pair = @{ "(" ~ (!")" ~ ANY)+ ~ ")" }
var = @{ __var__ }
"#;

fn translation_engine() -> Engine {
    Engine::new(TRANSLATION_GRAMMAR, GrammarOptions::default()).expect("grammar should compile")
}

#[test]
fn nested_pair_fact_unifies_each_field_independently() {
    let mut e = translation_engine();
    e.tell("(es : (hola : adios), en : (hello : bye))").unwrap();

    assert!(matches!(
        e.query("(es : (hola : adios), en : (hello : bye))").unwrap(),
        QueryOutcome::True
    ));
    assert!(matches!(
        e.query("(es : (hola : diferente), en : (hello : bye))").unwrap(),
        QueryOutcome::False
    ));

    match e.query("(es : X1, en : X2)").unwrap() {
        QueryOutcome::Matchings(matchings) => {
            assert_eq!(matchings.len(), 1);
            let m = &matchings[0];
            assert_eq!(m.entries().len(), 2);
            let get = |name: &str| m.entries().iter().find(|(k, _)| k.text.as_ref() == name).map(|(_, v)| v.text.to_string());
            assert_eq!(get("X1"), Some("(hola : adios)".to_string()));
            assert_eq!(get("X2"), Some("(hello : bye)".to_string()));
        }
        other => panic!("expected a single binding, got {other:?}"),
    }

    // One field ground, the other a variable: the ground field is matched
    // by its own stored sub-tree, and the sibling field is still reachable
    // afterwards.
    match e.query("(es : (hola : adios), en : X2)").unwrap() {
        QueryOutcome::Matchings(matchings) => {
            assert_eq!(matchings.len(), 1);
            assert_eq!(matchings[0].entries()[0].1.text.as_ref(), "(hello : bye)");
        }
        other => panic!("expected a single binding, got {other:?}"),
    }
}

#[test]
fn rule_with_variable_consequence_derives_the_italic_form() {
    let mut e = bold_italic_engine();
    e.tell("((X1)) -> ''X1''").unwrap();
    e.tell("((ho ho))").unwrap();

    assert!(matches!(e.query("''ho ho''").unwrap(), QueryOutcome::True));
}

#[test]
fn two_condition_rule_fires_regardless_of_assertion_order() {
    let mut e = bold_italic_engine();
    e.tell("((X1)) ; ''X2'' -> ''X1'' ; ((X2))").unwrap();
    e.tell("((ho ho))").unwrap();
    e.tell("''hi hi''").unwrap();

    assert!(matches!(e.query("((hi hi))").unwrap(), QueryOutcome::True));
    assert!(matches!(e.query("''ho ho''").unwrap(), QueryOutcome::True));

    let mut e2 = bold_italic_engine();
    e2.tell("((X1)) ; ''X2'' -> ''X1'' ; ((X2))").unwrap();
    e2.tell("''hi hi''").unwrap();
    e2.tell("((ho ho))").unwrap();

    assert!(matches!(e2.query("((hi hi))").unwrap(), QueryOutcome::True));
    assert!(matches!(e2.query("''ho ho''").unwrap(), QueryOutcome::True));
}

#[test]
fn chained_rules_derive_transitively() {
    let mut e = engine();
    e.tell("X1 is X2 ; X2 is mortal -> X1 is mortal").unwrap();
    e.tell("socrates is human").unwrap();
    e.tell("human is mortal").unwrap();

    assert!(matches!(e.query("socrates is mortal").unwrap(), QueryOutcome::True));
    assert!(matches!(e.query("plato is mortal").unwrap(), QueryOutcome::False));
}

#[test]
fn retelling_a_fact_is_idempotent() {
    let mut e = engine();
    e.tell("socrates is human").unwrap();
    let before = e.counter();
    e.tell("socrates is human").unwrap();
    // No new condition propagation should have been queued for a fact
    // already present in the fact set.
    assert_eq!(e.counter(), before + 1);
}

#[test]
fn rm_removes_fact_without_retracting_derived_facts() {
    let mut e = engine();
    e.tell("X1 is X2 ; X2 is mortal -> X1 is mortal").unwrap();
    e.tell("human is mortal").unwrap();
    e.tell("socrates is human").unwrap();
    assert!(matches!(e.query("socrates is mortal").unwrap(), QueryOutcome::True));

    e.tell("rm socrates is human").unwrap();
    assert!(matches!(e.query("socrates is human").unwrap(), QueryOutcome::False));
    // The derived fact stands: no truth maintenance.
    assert!(matches!(e.query("socrates is mortal").unwrap(), QueryOutcome::True));
}

#[test]
fn goal_reports_missing_facts_needed_to_derive_it() {
    let mut e = engine();
    e.tell("X1 is X2 ; X2 is mortal -> X1 is mortal").unwrap();
    e.tell("human is mortal").unwrap();

    let fulfillments = e.goal("socrates is mortal").unwrap();
    assert!(!fulfillments.is_empty());
    let texts: Vec<String> = fulfillments[0].iter().map(|f| f.text.to_string()).collect();
    assert_eq!(texts, vec!["socrates is human".to_string()]);
}

#[test]
fn oversized_sentence_is_rejected() {
    let limits = ResourceLimits {
        max_fact_text_bytes: 8,
        ..ResourceLimits::default()
    };
    let options = GrammarOptions {
        limits: Some(limits),
        ..GrammarOptions::default()
    };
    let mut e = Engine::new(IS_A_GRAMMAR, options).unwrap();
    let err = e.tell("aristotle is philosopher").unwrap_err();
    assert!(matches!(err, FactumError::ResourceLimitExceeded(_)));
}

/// The fact index only unifies a query variable against other
/// variable-bearing entries, never against plain ground facts (that
/// broader unification lives in `CondSet`/`ConsSet`, which carry a
/// dedicated `var_child` slot). Querying "who is human" this way is not a
/// supported `ask`; `goal` is the operation for that.
#[test]
fn ask_with_a_free_variable_does_not_unify_against_ground_facts() {
    let mut e = engine();
    e.tell("socrates is human").unwrap();
    e.tell("plato is human").unwrap();

    assert!(matches!(e.query("X1 is human").unwrap(), QueryOutcome::False));
}
