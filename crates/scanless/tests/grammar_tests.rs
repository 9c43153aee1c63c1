//! Build-time behavior: assembly, analysis, and configuration errors.

use scanless::grammar::{
    any_of, lit, one_or_more, pattern, possibly, rule, seq, uncached, zero_or_more,
    GrammarBuilder, GrammarError, Production,
};

#[test]
fn test_build_and_introspect() {
    let grammar = GrammarBuilder::new()
        .entry_point("greeting")
        .rule("greeting", seq([lit("hello "), rule("name")]))
        .rule("name", pattern("[A-Z][a-z]*"))
        .build()
        .unwrap();

    assert_eq!(grammar.entry_point(), "greeting");
    assert_eq!(
        grammar.rule_names().collect::<Vec<_>>(),
        ["greeting", "name"]
    );
    assert!(grammar.unreachable_rules().is_empty());
}

#[test]
fn test_missing_start_production_message() {
    let err = GrammarBuilder::new()
        .entry_point("nope")
        .rule("x", lit("a"))
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "couldn't find start production 'nope'");
}

#[test]
fn test_left_recursion_message() {
    let err = GrammarBuilder::new()
        .entry_point("x")
        .rule("x", seq([rule("x"), lit("a")]))
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "detected left recursion for nonterminal 'x'"
    );
}

#[test]
fn test_right_recursive_grammar_builds() {
    let grammar = GrammarBuilder::new()
        .entry_point("x")
        .rule("x", seq([lit("a"), possibly(rule("x"))]))
        .build()
        .unwrap();
    assert!(grammar.parse("aaa").is_ok());
}

#[test]
fn test_mixed_capture_groups_rejected() {
    let err = GrammarBuilder::new()
        .entry_point("x")
        .rule("x", pattern("(?<name>[a-z]+)=([0-9]+)"))
        .build()
        .unwrap_err();
    assert!(matches!(err, GrammarError::Pattern(_)));
    assert!(err.to_string().contains("mixes named and unnamed"));
}

#[test]
fn test_empty_choice_rejected() {
    let err = GrammarBuilder::new()
        .entry_point("x")
        .rule("x", any_of(Vec::<Production>::new()))
        .build()
        .unwrap_err();
    assert!(matches!(err, GrammarError::EmptyChoice));
}

#[test]
fn test_optional_reference_twins() {
    // `possibly(rule(..))` must not make the required reference optional.
    let grammar = GrammarBuilder::new()
        .entry_point("x")
        .rule("x", seq([rule("word"), possibly(rule("word")), lit("!")]))
        .rule("word", pattern("[a-z]+ "))
        .build()
        .unwrap();

    assert!(grammar.parse("one two !").is_ok());
    assert!(grammar.parse("one !").is_ok());
    assert!(grammar.parse("!").is_err());
}

#[test]
fn test_unreachable_rules_reported_in_order() {
    let grammar = GrammarBuilder::new()
        .entry_point("x")
        .rule("x", one_or_more(lit("a")))
        .rule("stray", lit("b"))
        .rule("also_stray", zero_or_more(lit("c")))
        .build()
        .unwrap();
    assert_eq!(grammar.unreachable_rules(), ["stray", "also_stray"]);
}

#[test]
fn test_rule_referenced_only_optionally_is_reachable() {
    let grammar = GrammarBuilder::new()
        .entry_point("x")
        .rule("x", seq([lit("a"), possibly(rule("suffix"))]))
        .rule("suffix", lit("!"))
        .build()
        .unwrap();
    assert!(grammar.unreachable_rules().is_empty());
}

#[test]
fn test_rule_referenced_only_through_cache_override_is_reachable() {
    let grammar = GrammarBuilder::new()
        .entry_point("x")
        .rule("x", seq([uncached(rule("word")), lit("!")]))
        .rule("word", pattern("[a-z]+"))
        .build()
        .unwrap();
    assert!(grammar.parse("hey!").is_ok());
    assert!(grammar.unreachable_rules().is_empty());
}
