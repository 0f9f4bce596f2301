//! Self-healing selector resolution
//!
//! This crate implements the selector healing core for UI test suites:
//! - Strategy orchestration with first-success-wins fallthrough
//! - Fuzzy test-id recovery via normalized Levenshtein similarity
//! - Cache of previously healed selectors with usage accounting
//! - Per-selector flakiness tracking and aggregate statistics
//! - Auto-healing page facade over a pluggable automation driver

pub mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod page;
pub mod similarity;
pub mod strategies;
pub mod tracker;
pub mod types;

pub use cache::*;
pub use config::*;
pub use engine::*;
pub use errors::*;
pub use page::*;
pub use similarity::*;
pub use strategies::*;
pub use tracker::*;
pub use types::*;
