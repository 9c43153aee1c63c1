//! # Grammar Module
//!
//! Grammar definition, preparation, and static analysis.
//!
//! ## Overview
//!
//! A grammar is described as a set of named productions composed from the
//! operator functions in [`production`], assembled by [`GrammarBuilder`]
//! into an immutable node arena, and checked before any parsing happens:
//!
//! - **Production operators**: [`lit`], [`pattern`], [`rule`], [`seq`],
//!   [`any_of`], [`best_of`], [`zero_or_more`], [`one_or_more`],
//!   [`possibly`], [`cached`], [`uncached`]
//! - **Assembly**: reference resolution against required/optional rule
//!   twins, contiguous node id assignment, per-site pattern compilation
//! - **Analysis**: optionality fixed point and left-recursion rejection
//!
//! ## Usage
//!
//! ```rust
//! use scanless::grammar::{lit, one_or_more, pattern, rule, seq, GrammarBuilder};
//!
//! let grammar = GrammarBuilder::new()
//!     .entry_point("list")
//!     .rule("list", seq([lit("("), one_or_more(rule("word")), lit(")")]))
//!     .rule("word", pattern(r"[a-z]+\s*"))
//!     .build()?;
//!
//! assert_eq!(grammar.entry_point(), "list");
//! # Ok::<(), scanless::grammar::GrammarError>(())
//! ```

pub mod analysis;
pub mod builder;
pub mod node;
pub mod production;
pub mod validate;

pub use builder::{Grammar, GrammarBuilder, GrammarError};
pub use node::{GrammarNode, NodeHeader, NodeId};
pub use production::{
    any_of, best_of, cached, lit, one_or_more, pattern, possibly, rule, seq, uncached,
    zero_or_more, Production,
};
