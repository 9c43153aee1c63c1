//! # Scanless
//!
//! A scannerless parsing library: context-free grammars are defined
//! programmatically and parsed directly against character input. Regex
//! terminals consume raw characters, so there is no separate tokenization
//! phase and different productions can tokenize the same position
//! differently.
//!
//! ## Overview
//!
//! - **Grammar definition**: named productions composed from a small
//!   operator set ([`grammar::seq`], [`grammar::any_of`],
//!   [`grammar::best_of`], [`grammar::zero_or_more`], …), with string and
//!   regex terminals
//! - **Static analysis**: every node is labeled with whether it can match
//!   the empty string, and left-recursive grammars are rejected at build
//!   time
//! - **Parsing**: a recursive-descent interpreter with opt-in packrat
//!   memoization, producing a concrete parse tree or a furthest-failure
//!   diagnostic
//!
//! ## Quick Start
//!
//! ```rust
//! use scanless::grammar::{lit, pattern, possibly, rule, seq, zero_or_more, GrammarBuilder};
//!
//! let grammar = GrammarBuilder::new()
//!     .entry_point("call")
//!     .rule(
//!         "call",
//!         seq([rule("ident"), lit("("), possibly(rule("args")), lit(")")]),
//!     )
//!     .rule(
//!         "args",
//!         seq([rule("ident"), zero_or_more(seq([lit(","), rule("ident")]))]),
//!     )
//!     .rule("ident", pattern(r"(?<name>[A-Za-z_][A-Za-z0-9_]*)"))
//!     .build()?;
//!
//! let nodes = grammar.parse("print(a,b)")?;
//! assert_eq!(nodes[0].name, "ident");
//! assert_eq!(nodes[0].descendant("name").unwrap().text, "print");
//!
//! let err = grammar.parse("print(a,").unwrap_err();
//! assert_eq!(err.offset(), 8);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] - Production operators, grammar assembly, static analysis
//! - [`parser`] - The parse engine, configuration, and metrics
//! - [`pattern`] - Offset-anchored regex terminal handles
//! - [`syntax`] - Parse tree nodes
//! - [`error`] - Parse-time diagnostics

pub mod error;
pub mod grammar;
pub mod parser;
pub mod pattern;
pub mod syntax;

// Re-export commonly used types
pub use error::{Expectation, ExpectedTerminals, ParseError};
pub use grammar::{Grammar, GrammarBuilder, GrammarError};
pub use parser::{EngineConfig, ParseMetrics, ParseOutput, Parser};
pub use pattern::{PatternError, TokenPattern};
pub use syntax::ParseNode;
