//! Match Analysis Engine: one model call per (document, job) pair, cached as a
//! versioned dual-audience report until the pair is marked stale.

pub mod engine;
pub mod handlers;
pub mod normalize;
pub mod prompts;
pub mod schema;
pub mod weights;

pub use engine::MatchAnalysisEngine;
