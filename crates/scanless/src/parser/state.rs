//! Per-run parser state.
//!
//! Everything here is created at the start of a parse invocation and
//! discarded on return; the grammar itself is never mutated, so concurrent
//! parses over a shared grammar each simply own their own state.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::{Expectation, ExpectedTerminals};
use crate::grammar::NodeId;
use crate::syntax::ParseNode;

/// Result of matching one grammar node at one offset.
///
/// `nodes` is `None` when the match contributed nothing to the parse tree
/// (bare literals, patterns without captures, sequences of such).
#[derive(Debug, Clone)]
pub(crate) struct ParseOutcome<'i> {
    pub end: usize,
    pub nodes: Option<SmallVec<[ParseNode<'i>; 1]>>,
}

/// Packrat memoization table: one lazily-created slot per input offset,
/// each mapping node id to the memoized outcome. Failures are cached too.
#[derive(Debug)]
pub(crate) struct PackratCache<'i> {
    slots: Vec<Option<Slot<'i>>>,
}

type Slot<'i> = HashMap<u32, Option<ParseOutcome<'i>>, ahash::RandomState>;

impl<'i> PackratCache<'i> {
    pub fn new(input_len: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(input_len + 1, || None);
        Self { slots }
    }

    pub fn get(&self, offset: usize, id: NodeId) -> Option<&Option<ParseOutcome<'i>>> {
        self.slots[offset].as_ref()?.get(&id.0)
    }

    pub fn insert(&mut self, offset: usize, id: NodeId, outcome: Option<ParseOutcome<'i>>) {
        self.slots[offset]
            .get_or_insert_with(|| HashMap::with_hasher(ahash::RandomState::new()))
            .insert(id.0, outcome);
    }
}

/// Best-failed-match record.
///
/// Only terminals report here. The offset is monotone: a failure further
/// into the input replaces the record, a failure at the same offset appends
/// its terminal, and earlier failures are ignored.
#[derive(Debug, Default)]
pub(crate) struct FailureTracker {
    offset: Option<usize>,
    expected: ExpectedTerminals,
}

impl FailureTracker {
    pub fn record(&mut self, offset: usize, expectation: Expectation) {
        match self.offset {
            Some(best) if offset < best => {}
            Some(best) if offset == best => self.expected.push(expectation),
            _ => {
                self.offset = Some(offset);
                self.expected.clear();
                self.expected.push(expectation);
            }
        }
    }

    pub fn into_best(self) -> Option<(usize, ExpectedTerminals)> {
        self.offset.map(|offset| (offset, self.expected))
    }
}

/// Counters describing one parse invocation.
#[derive(Debug, Default, Clone)]
pub struct ParseMetrics {
    /// Memoized results served from the packrat cache.
    pub cache_hits: usize,
    /// Cacheable results computed and recorded.
    pub cache_misses: usize,
    /// Parse tree nodes created.
    pub nodes_created: usize,
    pub parse_time: std::time::Duration,
}
