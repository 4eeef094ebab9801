//! Fusion of lexical and semantic hits into one ranked list.
//!
//! Hits from both sources are keyed by exact location `(path, start, end)`.
//! Each contribution adds `weight × score` to its location, so a location
//! found by both sources outranks one found by either alone. Scores are an
//! unbounded weighted sum, comparable only within one weight configuration.

pub mod hybrid;
pub mod scoring;

pub use hybrid::{HybridResponse, HybridSearch};
pub use scoring::{FusedResult, FusionConfig, Source, identity_key};
