//! # Parser Engine
//!
//! The recursive-descent interpreter. One [`Parser`] borrows a prepared
//! grammar; each `parse` call owns its packrat cache and failure record, so
//! the grammar can back concurrent parses. Dispatch is a single exhaustive
//! match over the six node variants.
//!
//! Memoization is per node: a node whose cache flag resolves to true (its
//! own flag, or the engine default when unset) consults the per-offset
//! cache before interpreting and records both successes and failures.
//! Caching is observationally neutral; it only bounds re-interpretation
//! under backtracking.

use smallvec::{smallvec, SmallVec};

use crate::error::{Expectation, ParseError};
use crate::grammar::{Grammar, GrammarNode, NodeId};
use crate::parser::state::{FailureTracker, PackratCache, ParseMetrics, ParseOutcome};
use crate::pattern::TokenPattern;
use crate::syntax::ParseNode;

/// Engine-level configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Memoize nodes whose cache flag is unset. Off out of the box; flip it
    /// to make the whole grammar packrat and mark hot spots `uncached`.
    pub cache_by_default: bool,
}

/// A successful parse: the children of the start production's node, plus
/// counters describing the run.
#[derive(Debug, Clone)]
pub struct ParseOutput<'i> {
    pub nodes: Vec<ParseNode<'i>>,
    pub metrics: ParseMetrics,
}

/// Recursive-descent parser over a prepared [`Grammar`].
#[derive(Debug, Clone, Copy)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
    config: EngineConfig,
}

impl<'g> Parser<'g> {
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, EngineConfig::default())
    }

    #[must_use]
    pub const fn with_config(grammar: &'g Grammar, config: EngineConfig) -> Self {
        Self { grammar, config }
    }

    /// Parse `input` completely.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedInput`] with the furthest terminal
    /// failure, or [`ParseError::IncompleteInput`] when the grammar matched
    /// a prefix without any terminal mismatch to report.
    pub fn parse<'i>(&self, input: &'i str) -> Result<ParseOutput<'i>, ParseError> {
        let started = std::time::Instant::now();
        let mut ctx = ParseContext {
            grammar: self.grammar,
            input,
            cache: PackratCache::new(input.len()),
            failure: FailureTracker::default(),
            cache_by_default: self.config.cache_by_default,
            metrics: ParseMetrics::default(),
        };

        let outcome = ctx.try_parse(self.grammar.entry_id(), 0);
        let ParseContext {
            failure,
            mut metrics,
            ..
        } = ctx;
        metrics.parse_time = started.elapsed();

        match outcome {
            Some(outcome) if outcome.end == input.len() => {
                // The start production always emits exactly one wrapper
                // node; consumers get its children.
                let nodes = outcome
                    .nodes
                    .and_then(|mut nodes| nodes.pop())
                    .map(|root| root.children)
                    .unwrap_or_default();
                Ok(ParseOutput { nodes, metrics })
            }
            outcome => {
                let parsed_len = outcome.map_or(0, |o| o.end);
                Err(match failure.into_best() {
                    Some((offset, expected)) => ParseError::UnexpectedInput { offset, expected },
                    None => ParseError::IncompleteInput {
                        parsed_len,
                        input_len: input.len(),
                    },
                })
            }
        }
    }
}

struct ParseContext<'g, 'i> {
    grammar: &'g Grammar,
    input: &'i str,
    cache: PackratCache<'i>,
    failure: FailureTracker,
    cache_by_default: bool,
    metrics: ParseMetrics,
}

impl<'g, 'i> ParseContext<'g, 'i> {
    /// Match one node at `offset`, consulting the packrat cache when the
    /// node's cache flag resolves to true.
    fn try_parse(&mut self, id: NodeId, offset: usize) -> Option<ParseOutcome<'i>> {
        let node = self.grammar.node(id);
        if !node.header().cache.unwrap_or(self.cache_by_default) {
            return self.interpret(node, offset);
        }

        if let Some(memoized) = self.cache.get(offset, id).cloned() {
            self.metrics.cache_hits += 1;
            return memoized;
        }
        let outcome = self.interpret(node, offset);
        self.metrics.cache_misses += 1;
        self.cache.insert(offset, id, outcome.clone());
        outcome
    }

    fn interpret(&mut self, node: &'g GrammarNode, offset: usize) -> Option<ParseOutcome<'i>> {
        match node {
            GrammarNode::Literal { text, .. } => {
                let end = offset + text.len();
                if self.input.as_bytes().get(offset..end) == Some(text.as_bytes()) {
                    Some(ParseOutcome { end, nodes: None })
                } else {
                    self.failure
                        .record(offset, Expectation::Literal(text.clone()));
                    None
                }
            }

            GrammarNode::Pattern { name, pattern, .. } => {
                let Some(matched) = pattern.match_at(self.input, offset) else {
                    self.failure.record(offset, pattern_expectation(name, pattern));
                    return None;
                };
                if pattern.group_count() == 0 {
                    return Some(ParseOutcome {
                        end: matched.end,
                        nodes: None,
                    });
                }
                let children = matched
                    .captures
                    .into_iter()
                    .map(|capture| {
                        self.metrics.nodes_created += 1;
                        ParseNode::new(capture.name, capture.start, capture.end, self.input, Vec::new())
                    })
                    .collect();
                self.metrics.nodes_created += 1;
                let tree_node =
                    ParseNode::new(name.clone(), matched.start, matched.end, self.input, children);
                Some(ParseOutcome {
                    end: matched.end,
                    nodes: Some(smallvec![tree_node]),
                })
            }

            GrammarNode::Rule { name, body, .. } => {
                let sub = self.try_parse(*body, offset)?;
                self.metrics.nodes_created += 1;
                let children = sub.nodes.map(SmallVec::into_vec).unwrap_or_default();
                let tree_node = ParseNode::new(name.clone(), offset, sub.end, self.input, children);
                Some(ParseOutcome {
                    end: sub.end,
                    nodes: Some(smallvec![tree_node]),
                })
            }

            GrammarNode::Seq { members, .. } => {
                let mut cursor = offset;
                let mut collected: Option<SmallVec<[ParseNode<'i>; 1]>> = None;
                for &member in members {
                    match self.try_parse(member, cursor) {
                        Some(outcome) => {
                            cursor = outcome.end;
                            if let Some(nodes) = outcome.nodes {
                                collected.get_or_insert_with(SmallVec::new).extend(nodes);
                            }
                        }
                        // An optional member may be skipped; anything else
                        // fails the whole sequence.
                        None if self.grammar.node(member).header().optional => {}
                        None => return None,
                    }
                }
                Some(ParseOutcome {
                    end: cursor,
                    nodes: collected,
                })
            }

            GrammarNode::Repeat { body, .. } => {
                let mut cursor = offset;
                let mut collected: Option<SmallVec<[ParseNode<'i>; 1]>> = None;
                loop {
                    match self.try_parse(*body, cursor) {
                        Some(outcome) if outcome.end > cursor => {
                            cursor = outcome.end;
                            if let Some(nodes) = outcome.nodes {
                                collected.get_or_insert_with(SmallVec::new).extend(nodes);
                            }
                        }
                        // A zero-width success cannot make progress; bail
                        // out instead of looping forever.
                        _ => break,
                    }
                }
                if cursor > offset {
                    Some(ParseOutcome {
                        end: cursor,
                        nodes: collected,
                    })
                } else {
                    None
                }
            }

            GrammarNode::Choice {
                members,
                exhaustive: false,
                ..
            } => members
                .iter()
                .find_map(|&member| self.try_parse(member, offset)),

            GrammarNode::Choice { members, .. } => {
                // Exhaustive choice: evaluate everything, keep the longest
                // match; a strict comparison keeps the earliest on ties.
                let mut best: Option<ParseOutcome<'i>> = None;
                for &member in members {
                    if let Some(outcome) = self.try_parse(member, offset) {
                        if best.as_ref().map_or(true, |b| outcome.end > b.end) {
                            best = Some(outcome);
                        }
                    }
                }
                best
            }
        }
    }
}

fn pattern_expectation(name: &str, pattern: &TokenPattern) -> Expectation {
    if name.is_empty() {
        Expectation::Pattern(compact_str::format_compact!("/{}/", pattern.source()))
    } else {
        Expectation::Pattern(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{
        best_of, cached, lit, one_or_more, pattern, possibly, rule, seq, uncached, zero_or_more,
        GrammarBuilder,
    };

    fn digits_grammar() -> Grammar {
        GrammarBuilder::new()
            .entry_point("number")
            .rule("number", pattern("(?<digits>[0-9]+)"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_literal_and_pattern() {
        let grammar = GrammarBuilder::new()
            .entry_point("kv")
            .rule("kv", seq([lit("n="), rule("number")]))
            .rule("number", pattern("(?<digits>[0-9]+)"))
            .build()
            .unwrap();

        let nodes = grammar.parse("n=42").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "number");
        assert_eq!(nodes[0].descendant("digits").unwrap().text, "42");
    }

    #[test]
    fn test_captureless_pattern_emits_no_node() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", seq([pattern("[0-9]+"), lit("!")]))
            .build()
            .unwrap();
        assert!(grammar.parse("42!").unwrap().is_empty());
    }

    #[test]
    fn test_sequence_skips_failing_optional_member() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", seq([lit("a"), possibly(lit("-")), lit("b")]))
            .build()
            .unwrap();
        assert!(grammar.parse("ab").is_ok());
        assert!(grammar.parse("a-b").is_ok());
        assert!(grammar.parse("a+b").is_err());
    }

    #[test]
    fn test_repetition_is_greedy() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", one_or_more(rule("item")))
            .rule("item", pattern("(?<c>[ab])"))
            .build()
            .unwrap();
        let nodes = grammar.parse("abba").unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[3].descendant("c").unwrap().text, "a");
    }

    #[test]
    fn test_zero_width_repetition_terminates() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", seq([zero_or_more(pattern("[0-9]*")), lit("end")]))
            .build()
            .unwrap();
        // The repetition body matches empty at every offset; the parse must
        // still finish.
        assert!(grammar.parse("end").is_ok());
        assert!(grammar.parse("123end").is_ok());
    }

    #[test]
    fn test_best_of_tie_keeps_first() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", best_of([rule("first"), rule("second")]))
            .rule("first", lit("ab"))
            .rule("second", lit("ab"))
            .build()
            .unwrap();
        let nodes = grammar.parse("ab").unwrap();
        assert_eq!(nodes[0].name, "first");
    }

    #[test]
    fn test_cache_hits_are_counted() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule(
                "x",
                best_of([
                    seq([rule("letters"), lit("!")]),
                    seq([rule("letters"), lit("?")]),
                ]),
            )
            // Both branches re-match the same body at offset 0; caching it
            // makes the second branch a memo hit.
            .rule("letters", cached(pattern("[a-z]+")))
            .build()
            .unwrap();

        let output = Parser::new(&grammar).parse("abc?").unwrap();
        assert!(output.metrics.cache_hits >= 1);
    }

    #[test]
    fn test_cache_default_flips_unset_nodes() {
        let grammar = digits_grammar();
        let config = EngineConfig {
            cache_by_default: true,
        };
        let cached_run = Parser::with_config(&grammar, config).parse("12").unwrap();
        let plain_run = Parser::new(&grammar).parse("12").unwrap();
        assert_eq!(cached_run.nodes, plain_run.nodes);
        assert!(cached_run.metrics.cache_misses > 0);
        assert_eq!(plain_run.metrics.cache_misses, 0);
    }

    #[test]
    fn test_uncached_override_under_default_caching() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", uncached(pattern("(?<d>[0-9]+)")))
            .build()
            .unwrap();
        let config = EngineConfig {
            cache_by_default: true,
        };
        let output = Parser::with_config(&grammar, config).parse("7").unwrap();
        // Only the rule wrapper is memoized; the body opted out.
        assert_eq!(output.metrics.cache_misses, 1);
        assert_eq!(output.nodes[0].descendant("d").unwrap().text, "7");
    }

    #[test]
    fn test_incomplete_input_error() {
        // The pattern matches a prefix and nothing ever fails, so the
        // length-mismatch diagnostic is the only thing left to report.
        let grammar = digits_grammar();
        let err = grammar.parse("12x").unwrap_err();
        assert_eq!(
            err,
            ParseError::IncompleteInput {
                parsed_len: 2,
                input_len: 3,
            }
        );
    }

    #[test]
    fn test_unexpected_input_error() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", seq([lit("a"), lit("b")]))
            .build()
            .unwrap();
        let err = grammar.parse("ac").unwrap_err();
        match err {
            ParseError::UnexpectedInput { offset, expected } => {
                assert_eq!(offset, 1);
                assert!(expected.contains_label("b"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
