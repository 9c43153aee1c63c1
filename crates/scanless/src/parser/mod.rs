//! Parsing: the recursive-descent engine and its per-run state.

pub mod engine;
pub mod state;

pub use engine::{EngineConfig, ParseOutput, Parser};
pub use state::ParseMetrics;
