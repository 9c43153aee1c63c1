//! Left-recursion detection.
//!
//! Runs after optionality analysis: the optional flags decide how far a
//! sequence can be entered without consuming input. The walk follows
//! leftmost-reachable edges carrying the set of nodes on the current
//! descent path; re-entering a node on the path means the parser could
//! recurse at the same offset forever, which is rejected at build time.

use crate::grammar::builder::GrammarError;
use crate::grammar::node::{GrammarNode, NodeId};

/// Reject any cycle reachable through leftmost edges.
///
/// `roots` are the required rule twins; every reachable node is validated
/// once (leftmost reachability does not depend on how a node was entered).
pub(crate) fn check_left_recursion(
    nodes: &[GrammarNode],
    roots: impl Iterator<Item = NodeId>,
) -> Result<(), GrammarError> {
    let mut walk = Walk {
        nodes,
        on_path: vec![false; nodes.len()],
        validated: vec![false; nodes.len()],
        rule_stack: Vec::new(),
    };
    for root in roots {
        walk.descend(root)?;
    }
    Ok(())
}

struct Walk<'a> {
    nodes: &'a [GrammarNode],
    on_path: Vec<bool>,
    validated: Vec<bool>,
    /// Rule names on the current path, innermost last, for diagnostics.
    rule_stack: Vec<&'a str>,
}

impl<'a> Walk<'a> {
    fn descend(&mut self, id: NodeId) -> Result<(), GrammarError> {
        let index = id.index();
        if self.validated[index] {
            return Ok(());
        }
        let nodes = self.nodes;
        let node = &nodes[index];

        if self.on_path[index] {
            let name = match node {
                GrammarNode::Rule { name, .. } => name.as_str(),
                _ => self.rule_stack.last().copied().unwrap_or(""),
            };
            return Err(GrammarError::LeftRecursion(name.into()));
        }

        self.on_path[index] = true;
        let pushed_rule = if let GrammarNode::Rule { name, .. } = node {
            self.rule_stack.push(name.as_str());
            true
        } else {
            false
        };

        let result = match node {
            GrammarNode::Literal { .. } | GrammarNode::Pattern { .. } => Ok(()),
            GrammarNode::Rule { body, .. } | GrammarNode::Repeat { body, .. } => {
                self.descend(*body)
            }
            GrammarNode::Seq { members, .. } => {
                // Members past the first non-optional one can only be
                // entered after consuming input.
                let mut result = Ok(());
                for &member in members {
                    result = self.descend(member);
                    if result.is_err() || !nodes[member.index()].header().optional {
                        break;
                    }
                }
                result
            }
            GrammarNode::Choice { members, .. } => {
                // Every branch may be tried at the same offset.
                members.iter().try_for_each(|&member| self.descend(member))
            }
        };

        if pushed_rule {
            self.rule_stack.pop();
        }
        self.on_path[index] = false;
        if result.is_ok() {
            self.validated[index] = true;
        }
        result
    }
}
