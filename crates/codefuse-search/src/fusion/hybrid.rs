//! Hybrid search orchestration across the lexical and semantic layers.
//!
//! - lexical search always runs, is not cancellable, and any error aborts
//! - semantic search runs only when a capability is configured and reports
//!   itself available; it receives the caller's [`SearchContext`]
//! - a semantic capability that reports "unavailable" degrades the call to
//!   lexical-only results, while a semantic *error* aborts it

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::context::SearchContext;
use crate::error::SearchError;
use crate::fusion::scoring::{FusedResult, Fusion, FusionConfig};
use crate::lexical::LineMatchProvider;
use crate::semantic::SemanticSearcher;

/// Fused results plus provenance counts for one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridResponse {
    pub results: Vec<FusedResult>,
    /// Lexical matches produced, before dedup and truncation.
    pub keyword_count: usize,
    /// Semantic hits produced, before dedup and truncation.
    pub semantic_count: usize,
    pub semantic_enabled: bool,
}

/// Fusion engine over a lexical provider and an optional semantic capability.
pub struct HybridSearch<'a> {
    lexical: &'a dyn LineMatchProvider,
    semantic: Option<&'a dyn SemanticSearcher>,
}

impl<'a> HybridSearch<'a> {
    /// Engine with only a lexical source.
    #[must_use]
    pub fn new(lexical: &'a dyn LineMatchProvider) -> Self {
        Self {
            lexical,
            semantic: None,
        }
    }

    #[must_use]
    pub fn with_semantic(mut self, semantic: &'a dyn SemanticSearcher) -> Self {
        self.semantic = Some(semantic);
        self
    }

    /// Run lexical then semantic search for `query` under `directory` and
    /// fuse the hits.
    ///
    /// # Errors
    ///
    /// Returns the lexical backend's error unchanged, or
    /// [`SearchError::SemanticFailure`] when the semantic capability fails or
    /// `ctx` is already cancelled before it is called. No partial result is
    /// returned on error.
    #[instrument(skip(self, ctx, config))]
    pub fn search(
        &self,
        query: &str,
        directory: &Path,
        ctx: &SearchContext,
        config: &FusionConfig,
    ) -> Result<HybridResponse, SearchError> {
        let config = config.normalized();
        let mut fusion = Fusion::default();

        let lexical_hits = self
            .lexical
            .search(query, directory, config.keyword_limit)?;
        let keyword_count = lexical_hits.len();
        for hit in &lexical_hits {
            fusion.add_lexical(hit, config.keyword_weight);
        }

        let mut semantic_count = 0;
        let mut semantic_enabled = false;
        match self.semantic {
            Some(semantic) if semantic.available() => {
                ctx.check()?;
                let outcome = match &config.snippet {
                    Some(snippet) => {
                        semantic.search_with_snippets(ctx, query, config.semantic_limit, snippet)?
                    }
                    None => semantic.search_with_context(ctx, query, config.semantic_limit)?,
                };

                if outcome.available {
                    semantic_enabled = true;
                    semantic_count = outcome.hits.len();
                    for hit in &outcome.hits {
                        fusion.add_semantic(hit, config.semantic_weight);
                    }
                } else {
                    warn!("semantic index unavailable for this query; returning lexical results only");
                }
            }
            Some(_) => {
                warn!("semantic search unavailable; returning lexical results only");
            }
            None => {}
        }

        let results = fusion.into_ranked(config.result_cap());
        debug!(
            keyword_count,
            semantic_count,
            returned = results.len(),
            "hybrid search fused"
        );

        Ok(HybridResponse {
            results,
            keyword_count,
            semantic_count,
            semantic_enabled,
        })
    }
}
