//! Grammar assembly.
//!
//! [`GrammarBuilder`] collects named productions and an entry point, then
//! `build` lowers every production into the node arena, resolves rule
//! references against required/optional twin nodes, compiles pattern
//! terminals, and runs the static analyses. The resulting [`Grammar`] is
//! immutable; parsing never mutates it, so a shared reference can back any
//! number of concurrent parses.

use compact_str::CompactString;
use hashbrown::HashMap;
use thiserror::Error;

use crate::error::ParseError;
use crate::grammar::node::{GrammarNode, NodeHeader, NodeId};
use crate::grammar::production::{Production, ProductionKind};
use crate::grammar::{analysis, validate};
use crate::pattern::{PatternError, TokenPattern};
use crate::syntax::ParseNode;

/// Unresolved body id; every occurrence is patched before analysis runs.
const PENDING: NodeId = NodeId(u32::MAX);

/// Required and optional twin `Rule` nodes for one production key.
///
/// The twins share the same body id, so analysis results stay in sync;
/// `possibly(rule("x"))` resolves to the optional twin.
#[derive(Debug, Clone, Copy)]
struct RuleTwins {
    required: NodeId,
    optional: NodeId,
}

/// A prepared, immutable grammar.
#[derive(Debug)]
pub struct Grammar {
    nodes: Vec<GrammarNode>,
    rules: HashMap<CompactString, RuleTwins, ahash::RandomState>,
    /// Per-site rule clones created for cache overrides, by rule key. A
    /// reference like `cached(rule("y"))` is wired through a clone node
    /// rather than a twin, so reachability must consult these too.
    rule_clones: HashMap<CompactString, Vec<NodeId>, ahash::RandomState>,
    rule_order: Vec<CompactString>,
    entry: NodeId,
}

impl Grammar {
    /// Parse `input` with the default engine configuration, returning the
    /// children of the start production's node.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the grammar does not match the entire
    /// input.
    pub fn parse<'i>(&self, input: &'i str) -> Result<Vec<ParseNode<'i>>, ParseError> {
        crate::parser::Parser::new(self)
            .parse(input)
            .map(|output| output.nodes)
    }

    /// Name of the start production.
    #[must_use]
    pub fn entry_point(&self) -> &str {
        match self.node(self.entry) {
            GrammarNode::Rule { name, .. } => name,
            _ => unreachable!("entry is always a rule node"),
        }
    }

    /// Total number of nodes in the arena; ids are contiguous below this.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Production keys in registration order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rule_order.iter().map(CompactString::as_str)
    }

    /// Production keys not reachable from the entry point, in registration
    /// order.
    #[must_use]
    pub fn unreachable_rules(&self) -> Vec<&str> {
        let mut visited = vec![false; self.nodes.len()];
        let mut worklist = vec![self.entry];
        while let Some(id) = worklist.pop() {
            if std::mem::replace(&mut visited[id.index()], true) {
                continue;
            }
            worklist.extend_from_slice(self.node(id).children());
        }

        self.rule_order
            .iter()
            .filter(|name| {
                let twins = &self.rules[name.as_str()];
                let through_clone = self
                    .rule_clones
                    .get(name.as_str())
                    .is_some_and(|clones| clones.iter().any(|id| visited[id.index()]));
                !visited[twins.required.index()]
                    && !visited[twins.optional.index()]
                    && !through_clone
            })
            .map(CompactString::as_str)
            .collect()
    }

    pub(crate) fn node(&self, id: NodeId) -> &GrammarNode {
        &self.nodes[id.index()]
    }

    pub(crate) const fn entry_id(&self) -> NodeId {
        self.entry
    }
}

/// Errors raised while assembling a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("no start production was configured")]
    MissingEntryPoint,

    #[error("couldn't find start production '{0}'")]
    MissingStartProduction(CompactString),

    #[error("duplicate production '{0}'")]
    DuplicateRule(CompactString),

    #[error("couldn't resolve reference to production '{0}'")]
    UndefinedRule(CompactString),

    #[error("string terminal must not be empty")]
    EmptyLiteral,

    #[error("choice must have at least one member")]
    EmptyChoice,

    #[error("detected left recursion for nonterminal '{0}'")]
    LeftRecursion(CompactString),

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Builder for constructing grammars from named productions.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: Vec<(CompactString, Production)>,
    entry_point: Option<CompactString>,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the start production by key.
    #[must_use]
    pub fn entry_point(mut self, name: impl AsRef<str>) -> Self {
        self.entry_point = Some(name.as_ref().into());
        self
    }

    /// Register a production under `name`. Other productions refer to it
    /// with [`rule(name)`](crate::grammar::rule).
    #[must_use]
    pub fn rule(mut self, name: impl AsRef<str>, body: impl Into<Production>) -> Self {
        self.rules.push((name.as_ref().into(), body.into()));
        self
    }

    /// Lower, resolve, and analyze the registered productions.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for a missing or unknown entry point,
    /// duplicate or unresolvable rules, empty literals or choices, invalid
    /// patterns, or left recursion.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let entry_name = self.entry_point.ok_or(GrammarError::MissingEntryPoint)?;

        let mut lowering = Lowering::default();

        // Register twin rule nodes up front so references, including forward
        // and cyclic ones, resolve against a complete table.
        let mut rule_order = Vec::with_capacity(self.rules.len());
        for (name, _) in &self.rules {
            if lowering.rules.contains_key(name.as_str()) {
                return Err(GrammarError::DuplicateRule(name.clone()));
            }
            let required = lowering.alloc_rule(name.clone(), false);
            let optional = lowering.alloc_rule(name.clone(), true);
            lowering.rules.insert(name.clone(), RuleTwins { required, optional });
            rule_order.push(name.clone());
        }

        if !lowering.rules.contains_key(entry_name.as_str()) {
            return Err(GrammarError::MissingStartProduction(entry_name));
        }

        // Lower each body, then patch it into both twins (and any per-site
        // rule clones created for cache overrides).
        for (name, production) in &self.rules {
            let body = lowering.lower(production, Some(name))?;
            let twins = lowering.rules[name.as_str()];
            lowering.set_body(twins.required, body);
            lowering.set_body(twins.optional, body);
        }
        let mut rule_clones: HashMap<CompactString, Vec<NodeId>, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        for (name, clone_id) in std::mem::take(&mut lowering.pending_clones) {
            let twins = lowering.rules[name.as_str()];
            let body = match lowering.nodes[twins.required.index()] {
                GrammarNode::Rule { body, .. } => body,
                _ => unreachable!("twin ids always point at rule nodes"),
            };
            lowering.set_body(clone_id, body);
            rule_clones.entry(name).or_default().push(clone_id);
        }

        let Lowering { mut nodes, rules, .. } = lowering;

        analysis::compute_optionality(&mut nodes);
        validate::check_left_recursion(&nodes, rules.values().map(|t| t.required))?;

        let entry = rules[entry_name.as_str()].required;
        Ok(Grammar {
            nodes,
            rules,
            rule_clones,
            rule_order,
            entry,
        })
    }
}

#[derive(Debug, Default)]
struct Lowering {
    nodes: Vec<GrammarNode>,
    rules: HashMap<CompactString, RuleTwins, ahash::RandomState>,
    /// Rule clones whose body must be patched after all rules are lowered.
    pending_clones: Vec<(CompactString, NodeId)>,
}

impl Lowering {
    fn next_header(&self, optional: bool, cache: Option<bool>) -> NodeHeader {
        NodeHeader {
            id: NodeId(u32::try_from(self.nodes.len()).expect("node count fits in u32")),
            optional,
            cache,
        }
    }

    fn push(&mut self, node: GrammarNode) -> NodeId {
        let id = node.header().id;
        self.nodes.push(node);
        id
    }

    fn alloc_rule(&mut self, name: CompactString, optional: bool) -> NodeId {
        let header = self.next_header(optional, None);
        self.push(GrammarNode::Rule {
            header,
            name,
            body: PENDING,
        })
    }

    fn set_body(&mut self, id: NodeId, new_body: NodeId) {
        match &mut self.nodes[id.index()] {
            GrammarNode::Rule { body, .. } => *body = new_body,
            _ => unreachable!("only rule nodes carry a pending body"),
        }
    }

    /// Lower one production into the arena and return its node id.
    ///
    /// `rule_name` is the owning key when the production is an entire rule
    /// body; a pattern in that position takes the key as its name.
    fn lower(
        &mut self,
        production: &Production,
        rule_name: Option<&str>,
    ) -> Result<NodeId, GrammarError> {
        match &production.kind {
            ProductionKind::Literal(text) => {
                if text.is_empty() {
                    return Err(GrammarError::EmptyLiteral);
                }
                let header = self.next_header(production.optional, production.cache);
                Ok(self.push(GrammarNode::Literal {
                    header,
                    text: text.clone(),
                }))
            }
            ProductionKind::Pattern(source) => {
                // Compiled per usage site so every occurrence gets its own
                // identity and cache slot.
                let pattern = TokenPattern::compile(source)?;
                let header = self.next_header(
                    production.optional || pattern.is_nullable(),
                    production.cache,
                );
                Ok(self.push(GrammarNode::Pattern {
                    header,
                    name: rule_name.unwrap_or("").into(),
                    pattern,
                }))
            }
            ProductionKind::Sequence(members) => {
                let lowered = members
                    .iter()
                    .map(|m| self.lower(m, None))
                    .collect::<Result<Vec<_>, _>>()?;
                let header = self.next_header(production.optional, production.cache);
                Ok(self.push(GrammarNode::Seq {
                    header,
                    members: lowered,
                }))
            }
            ProductionKind::Choice { members, exhaustive } => {
                if members.is_empty() {
                    return Err(GrammarError::EmptyChoice);
                }
                let lowered = members
                    .iter()
                    .map(|m| self.lower(m, None))
                    .collect::<Result<Vec<_>, _>>()?;
                let header = self.next_header(production.optional, production.cache);
                Ok(self.push(GrammarNode::Choice {
                    header,
                    members: lowered,
                    exhaustive: *exhaustive,
                }))
            }
            ProductionKind::Repeat(body) => {
                let body = self.lower(body, None)?;
                let header = self.next_header(production.optional, production.cache);
                Ok(self.push(GrammarNode::Repeat { header, body }))
            }
            ProductionKind::Reference(name) => {
                let twins = *self
                    .rules
                    .get(name.as_str())
                    .ok_or_else(|| GrammarError::UndefinedRule(name.clone()))?;
                let target = if production.optional {
                    twins.optional
                } else {
                    twins.required
                };
                if production.cache.is_none() {
                    return Ok(target);
                }
                // A cache override on a reference gets its own rule clone so
                // the flag does not leak to other reference sites.
                let header = self.next_header(production.optional, production.cache);
                let clone_id = self.push(GrammarNode::Rule {
                    header,
                    name: name.clone(),
                    body: PENDING,
                });
                self.pending_clones.push((name.clone(), clone_id));
                Ok(clone_id)
            }
        }
    }
}
