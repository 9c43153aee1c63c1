//! Optionality analysis.
//!
//! Labels every node in the arena with whether it can succeed consuming
//! zero characters. The parser relies on the flag in two places: a sequence
//! may skip a failing member only when that member is optional, and a
//! repetition over an optional body must stop on zero forward progress.
//!
//! The grammar graph is cyclic, so plain recursion cannot settle every
//! node. The computation runs in three stages:
//!
//! 1. A depth-first pass resolves every node whose verdict does not depend
//!    on a back-edge.
//! 2. Nodes blocked on back-edges are kept in a pending list with their
//!    unknown dependencies, and an elimination loop re-checks those
//!    dependencies until a round makes no progress: a dependency resolved
//!    non-optional settles the node non-optional; a dependency resolved
//!    optional is dropped; an emptied dependency list settles the node
//!    optional.
//! 3. Whatever survives belongs to mutually cyclic clusters whose acyclic
//!    dependencies all turned out optional, so the residue is optional.
//!
//! Verdicts are monotone (a settled node never flips), so the loop
//! terminates after at most one round per pending node.

use crate::grammar::node::{GrammarNode, NodeId};

/// Compute and store the `optional` flag for every node.
pub(crate) fn compute_optionality(nodes: &mut [GrammarNode]) {
    let len = nodes.len();
    let verdicts = {
        let mut pass = Pass {
            nodes,
            verdict: vec![None; len],
            pending_deps: vec![None; len],
            on_path: vec![false; len],
        };
        for index in 0..len {
            pass.visit(NodeId(index as u32));
        }
        pass.eliminate();
        pass.verdict
    };

    for (node, verdict) in nodes.iter_mut().zip(verdicts) {
        // Residual cyclic clusters resolve optional.
        node.header_mut().optional = verdict.unwrap_or(true);
    }
}

struct Pass<'a> {
    nodes: &'a [GrammarNode],
    verdict: Vec<Option<bool>>,
    /// Unknown dependencies per pending node.
    pending_deps: Vec<Option<Vec<NodeId>>>,
    on_path: Vec<bool>,
}

impl Pass<'_> {
    /// Resolve `id` where possible; `None` means blocked on a back-edge.
    fn visit(&mut self, id: NodeId) -> Option<bool> {
        let index = id.index();
        if let Some(known) = self.verdict[index] {
            return Some(known);
        }
        if self.on_path[index] || self.pending_deps[index].is_some() {
            return None;
        }

        self.on_path[index] = true;
        let result = self.visit_inner(id);
        self.on_path[index] = false;

        if let Some(known) = result {
            self.verdict[index] = Some(known);
        }
        result
    }

    fn visit_inner(&mut self, id: NodeId) -> Option<bool> {
        let index = id.index();
        let nodes = self.nodes;
        match &nodes[index] {
            GrammarNode::Literal { header, .. } => Some(header.optional),
            // Pattern nullability was folded into the header seed at build.
            GrammarNode::Pattern { header, .. } => Some(header.optional),
            GrammarNode::Rule { header, body, .. } | GrammarNode::Repeat { header, body } => {
                if header.optional {
                    return Some(true);
                }
                match self.visit(*body) {
                    Some(known) => Some(known),
                    None => {
                        self.pending_deps[index] = Some(vec![*body]);
                        None
                    }
                }
            }
            // A choice is treated exactly like a sequence here: optional iff
            // every member is optional.
            GrammarNode::Seq { header, members } | GrammarNode::Choice { header, members, .. } => {
                if header.optional {
                    return Some(true);
                }
                let mut unknown = Vec::new();
                for &member in members {
                    match self.visit(member) {
                        Some(true) => {}
                        Some(false) => return Some(false),
                        None => unknown.push(member),
                    }
                }
                if unknown.is_empty() {
                    Some(true)
                } else {
                    self.pending_deps[index] = Some(unknown);
                    None
                }
            }
        }
    }

    fn eliminate(&mut self) {
        loop {
            let mut progress = false;
            for index in 0..self.pending_deps.len() {
                let Some(mut deps) = self.pending_deps[index].take() else {
                    continue;
                };

                let mut blocked = false;
                deps.retain(|dep| match self.verdict[dep.index()] {
                    Some(true) => false,
                    Some(false) => {
                        blocked = true;
                        false
                    }
                    None => true,
                });

                if blocked {
                    self.verdict[index] = Some(false);
                    progress = true;
                } else if deps.is_empty() {
                    self.verdict[index] = Some(true);
                    progress = true;
                } else {
                    self.pending_deps[index] = Some(deps);
                }
            }
            if !progress {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{
        any_of, lit, one_or_more, pattern, possibly, rule, seq, zero_or_more, GrammarBuilder,
    };

    fn optional_of(grammar: &crate::grammar::Grammar, name: &str) -> bool {
        let mut found = None;
        for index in 0..grammar.node_count() {
            let node = grammar.node(crate::grammar::NodeId(index as u32));
            if let crate::grammar::GrammarNode::Rule { header, name: n, .. } = node {
                if n.as_str() == name {
                    if !header.optional {
                        return false;
                    }
                    found = Some(header.optional);
                }
            }
        }
        found.expect("rule exists")
    }

    #[test]
    fn test_terminals() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", seq([lit("a"), pattern("[0-9]*"), pattern("[0-9]+")]))
            .build()
            .unwrap();
        // The rule requires 'a', so it is not optional even though one
        // member pattern is nullable.
        assert!(!optional_of(&grammar, "x"));
    }

    #[test]
    fn test_nullable_pattern_rule_is_optional() {
        let grammar = GrammarBuilder::new()
            .entry_point("ws")
            .rule("ws", pattern(r"\s*"))
            .build()
            .unwrap();
        assert!(optional_of(&grammar, "ws"));
    }

    #[test]
    fn test_sequence_of_optionals_is_optional() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", seq([possibly(lit("a")), zero_or_more(lit("b"))]))
            .build()
            .unwrap();
        assert!(optional_of(&grammar, "x"));
    }

    #[test]
    fn test_one_or_more_follows_body() {
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", one_or_more(lit("a")))
            .build()
            .unwrap();
        assert!(!optional_of(&grammar, "x"));

        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", one_or_more(pattern("[0-9]*")))
            .build()
            .unwrap();
        assert!(optional_of(&grammar, "x"));
    }

    #[test]
    fn test_choice_uses_all_members_rule() {
        // One non-optional branch keeps the whole choice non-optional, even
        // though the other branch can match empty.
        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", any_of([possibly(lit("a")), lit("b")]))
            .build()
            .unwrap();
        assert!(!optional_of(&grammar, "x"));

        let grammar = GrammarBuilder::new()
            .entry_point("x")
            .rule("x", any_of([possibly(lit("a")), possibly(lit("b"))]))
            .build()
            .unwrap();
        assert!(optional_of(&grammar, "x"));
    }

    #[test]
    fn test_cyclic_grammar_settles() {
        // value is mutually recursive with list through a guarded cycle;
        // the required literal makes both non-optional.
        let grammar = GrammarBuilder::new()
            .entry_point("value")
            .rule("value", any_of([lit("x"), rule("list")]))
            .rule("list", seq([lit("("), possibly(rule("value")), lit(")")]))
            .build()
            .unwrap();
        assert!(!optional_of(&grammar, "value"));
        assert!(!optional_of(&grammar, "list"));
    }
}
