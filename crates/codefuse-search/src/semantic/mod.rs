//! Boundary of the external semantic (embedding) search capability.
//!
//! Embedding generation and vector indexing live outside this crate. The
//! fusion engine only needs "given a query and a limit, produce scored
//! passages, or report that the index is unavailable", expressed by the
//! [`SemanticSearcher`] trait.

pub mod snippet;

use std::sync::Arc;

use serde::Serialize;

use crate::context::SearchContext;

pub use snippet::FileSnippets;

/// Materializes the text of `path` between two 1-based inclusive lines.
pub type SnippetFn = Arc<dyn Fn(&str, usize, usize) -> String + Send + Sync>;

/// A single passage returned by the semantic capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticHit {
    /// Repository-relative path.
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub snippet: String,
    /// Relevance in the capability's own scale (typically `[0, 1]`).
    pub score: f64,
}

/// Result of one semantic call.
///
/// `available == false` means the index could not serve this call (not built
/// yet, model missing). That is a state, not an error: the caller falls back
/// to lexical-only results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SemanticOutcome {
    pub hits: Vec<SemanticHit>,
    pub available: bool,
}

impl SemanticOutcome {
    #[must_use]
    pub const fn hits(hits: Vec<SemanticHit>) -> Self {
        Self {
            hits,
            available: true,
        }
    }

    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            hits: Vec::new(),
            available: false,
        }
    }
}

/// Errors a semantic capability may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error("search cancelled")]
    Cancelled,

    #[error("search deadline exceeded")]
    DeadlineExceeded,

    /// Any other failure inside the capability.
    #[error("{0}")]
    Backend(String),
}

/// Vector-similarity search over precomputed embeddings.
///
/// Implementations must honor the [`SearchContext`]: once it is cancelled or
/// past its deadline, return promptly with [`SemanticError::Cancelled`] /
/// [`SemanticError::DeadlineExceeded`] or an unavailable outcome.
pub trait SemanticSearcher {
    /// Whether the capability can currently serve queries.
    fn available(&self) -> bool;

    /// Search using only the snippets stored alongside the embeddings.
    ///
    /// # Errors
    ///
    /// Returns a [`SemanticError`] when the search fails or is cancelled.
    fn search_with_context(
        &self,
        ctx: &SearchContext,
        query: &str,
        limit: usize,
    ) -> Result<SemanticOutcome, SemanticError>;

    /// Search, fetching each candidate's snippet through `snippet`.
    ///
    /// # Errors
    ///
    /// Returns a [`SemanticError`] when the search fails or is cancelled.
    fn search_with_snippets(
        &self,
        ctx: &SearchContext,
        query: &str,
        limit: usize,
        snippet: &SnippetFn,
    ) -> Result<SemanticOutcome, SemanticError>;
}
