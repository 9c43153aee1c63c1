//! Grammar node arena model.
//!
//! The grammar graph is cyclic, so nodes live in a flat arena owned by the
//! [`Grammar`](crate::grammar::Grammar) and refer to each other through
//! [`NodeId`] handles. IDs are assigned contiguously during lowering, which
//! lets analyses and the parse cache use plain index-addressed tables.

use compact_str::CompactString;

use crate::pattern::TokenPattern;

/// Stable handle to a node in the grammar arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[must_use]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Metadata shared by every grammar node variant.
#[derive(Debug, Clone)]
pub struct NodeHeader {
    pub id: NodeId,
    /// Whether the node can succeed consuming zero characters. Seeded by
    /// `possibly`/`zero_or_more`, finalized by the optionality analysis.
    pub optional: bool,
    /// Three-valued memoization flag: `None` follows the engine default,
    /// `Some(true)` memoizes, `Some(false)` is explicitly uncached.
    pub cache: Option<bool>,
}

/// A node of the prepared grammar graph.
///
/// References between productions are resolved during lowering, so the
/// arena holds only these six concrete variants.
#[derive(Debug, Clone)]
pub enum GrammarNode {
    /// Verbatim string terminal; the text is never empty.
    Literal {
        header: NodeHeader,
        text: CompactString,
    },
    /// Regex terminal. `name` is the owning rule's key when the pattern is
    /// the entire rule body, empty otherwise.
    Pattern {
        header: NodeHeader,
        name: CompactString,
        pattern: TokenPattern,
    },
    /// Named wrapper around a sub-graph; emits a parse tree node.
    Rule {
        header: NodeHeader,
        name: CompactString,
        body: NodeId,
    },
    Seq {
        header: NodeHeader,
        members: Vec<NodeId>,
    },
    /// Greedy repetition. `zero_or_more` seeds `header.optional`;
    /// `one_or_more` leaves it to the analysis.
    Repeat {
        header: NodeHeader,
        body: NodeId,
    },
    /// Ordered choice. `exhaustive` selects longest-match over first-match.
    Choice {
        header: NodeHeader,
        members: Vec<NodeId>,
        exhaustive: bool,
    },
}

impl GrammarNode {
    #[must_use]
    pub fn header(&self) -> &NodeHeader {
        match self {
            Self::Literal { header, .. }
            | Self::Pattern { header, .. }
            | Self::Rule { header, .. }
            | Self::Seq { header, .. }
            | Self::Repeat { header, .. }
            | Self::Choice { header, .. } => header,
        }
    }

    pub(crate) fn header_mut(&mut self) -> &mut NodeHeader {
        match self {
            Self::Literal { header, .. }
            | Self::Pattern { header, .. }
            | Self::Rule { header, .. }
            | Self::Seq { header, .. }
            | Self::Repeat { header, .. }
            | Self::Choice { header, .. } => header,
        }
    }

    /// Whether the node consumes characters directly.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Literal { .. } | Self::Pattern { .. })
    }

    /// Child node ids, in evaluation order.
    pub(crate) fn children(&self) -> &[NodeId] {
        match self {
            Self::Literal { .. } | Self::Pattern { .. } => &[],
            Self::Rule { body, .. } | Self::Repeat { body, .. } => std::slice::from_ref(body),
            Self::Seq { members, .. } | Self::Choice { members, .. } => members,
        }
    }
}
