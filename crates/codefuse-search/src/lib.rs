#![forbid(unsafe_code)]
//! codefuse-search library.
//!
//! Fuses ripgrep line matches with candidates from an external semantic
//! index into one ranked list of code locations.
//!
//! # Conventions
//!
//! - **Errors**: typed [`SearchError`] at the search boundary, `anyhow::Result`
//!   for configuration loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod config;
pub mod context;
pub mod error;
pub mod fusion;
pub mod lexical;
pub mod semantic;

pub use context::SearchContext;
pub use error::{ErrorCode, SearchError};
pub use fusion::{FusedResult, FusionConfig, HybridResponse, HybridSearch, Source};
pub use lexical::{LineMatch, LineMatchProvider, RipgrepBackend, Transport};
pub use semantic::{SemanticError, SemanticHit, SemanticOutcome, SemanticSearcher, SnippetFn};
