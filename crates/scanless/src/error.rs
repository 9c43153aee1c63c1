//! Parse-time error types and diagnostics.
//!
//! A parse either succeeds consuming the whole input or fails with a single
//! [`ParseError`]. The interesting variant carries the best-failed-match
//! record: the furthest offset at which any terminal failed and the set of
//! terminals that failed there, which is the usual PEG-style diagnostic.

use std::fmt;

use compact_str::CompactString;
use smallvec::SmallVec;
use thiserror::Error;

/// One terminal the parser expected at the failure offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// A string terminal, rendered quoted: `'{'`.
    Literal(CompactString),
    /// A pattern terminal, rendered by name (or `/source/` when unnamed).
    Pattern(CompactString),
}

impl Expectation {
    /// The display label without surrounding context.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Pattern(text) => text,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "'{text}'"),
            Self::Pattern(name) => write!(f, "{name}"),
        }
    }
}

/// Ordered, deduplicated set of terminals that failed at the same offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedTerminals(SmallVec<[Expectation; 4]>);

impl ExpectedTerminals {
    pub(crate) fn push(&mut self, expectation: Expectation) {
        if !self.0.contains(&expectation) {
            self.0.push(expectation);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Expectations in first-failure order.
    pub fn iter(&self) -> impl Iterator<Item = &Expectation> {
        self.0.iter()
    }

    /// Whether any expectation renders with the given label.
    #[must_use]
    pub fn contains_label(&self, label: &str) -> bool {
        self.0.iter().any(|e| e.label() == label)
    }
}

impl fmt::Display for ExpectedTerminals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > 1 {
            f.write_str("any of ")?;
        }
        for (i, expectation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{expectation}")?;
        }
        Ok(())
    }
}

/// Failure of a [`Parser::parse`](crate::parser::Parser::parse) invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A terminal mismatch was recorded; `offset` is the furthest input
    /// position any terminal failed at.
    #[error("Failed parsing the input text. Expected {expected} at position {offset}.")]
    UnexpectedInput {
        offset: usize,
        expected: ExpectedTerminals,
    },

    /// The grammar matched a prefix but never reached the end of the input,
    /// without any terminal mismatch to report.
    #[error("Failed parsing the input text. Parsed length was {parsed_len}. Input length was {input_len}.")]
    IncompleteInput { parsed_len: usize, input_len: usize },
}

impl ParseError {
    /// The input offset the diagnostic points at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::UnexpectedInput { offset, .. } => *offset,
            Self::IncompleteInput { parsed_len, .. } => *parsed_len,
        }
    }
}
