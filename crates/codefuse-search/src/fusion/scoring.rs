//! Weighted additive score fusion keyed by exact location.
//!
//! # Algorithm
//!
//! ```text
//! score(location) = Σ keyword_weight                 per lexical hit
//!                 + Σ semantic_weight × hit.score    per semantic hit
//! ```
//!
//! - A location is `(path, start_line, end_line)`; overlapping ranges that
//!   differ in either bound are separate findings.
//! - The [`Source`] tag becomes [`Source::Both`] on the second contribution
//!   to a location.
//! - Results sort by score descending, ties broken by path, start line, then
//!   end line so equal scores always come out in the same order.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lexical::LineMatch;
use crate::semantic::{SemanticHit, SnippetFn};

pub const DEFAULT_KEYWORD_LIMIT: usize = 20;
pub const DEFAULT_SEMANTIC_LIMIT: usize = 10;
pub const DEFAULT_KEYWORD_WEIGHT: f64 = 0.6;
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.4;

/// Which retrieval method(s) produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Keyword,
    Semantic,
    Both,
}

impl Source {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Semantic => "semantic",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked code location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedResult {
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub snippet: String,
    /// Weighted sum of contributions; not a probability.
    pub score: f64,
    pub source: Source,
    /// Exact matching line, known only for lexical hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_line: Option<usize>,
    /// Reserved; never populated by this crate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_column: Option<usize>,
}

/// Limits, weights and snippet source for one fused search.
///
/// Non-positive limits and weights are replaced by their defaults when the
/// search runs (see [`FusionConfig::normalized`]).
#[derive(Clone)]
pub struct FusionConfig {
    pub keyword_limit: usize,
    pub semantic_limit: usize,
    pub keyword_weight: f64,
    pub semantic_weight: f64,
    /// When set, semantic candidates fetch their snippet text through it.
    pub snippet: Option<SnippetFn>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
            semantic_limit: DEFAULT_SEMANTIC_LIMIT,
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            snippet: None,
        }
    }
}

impl fmt::Debug for FusionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FusionConfig")
            .field("keyword_limit", &self.keyword_limit)
            .field("semantic_limit", &self.semantic_limit)
            .field("keyword_weight", &self.keyword_weight)
            .field("semantic_weight", &self.semantic_weight)
            .field("snippet", &self.snippet.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl FusionConfig {
    /// Copy of this config with every non-positive field set to its default.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            keyword_limit: or_default_limit(self.keyword_limit, DEFAULT_KEYWORD_LIMIT),
            semantic_limit: or_default_limit(self.semantic_limit, DEFAULT_SEMANTIC_LIMIT),
            keyword_weight: or_default_weight(self.keyword_weight, DEFAULT_KEYWORD_WEIGHT),
            semantic_weight: or_default_weight(self.semantic_weight, DEFAULT_SEMANTIC_WEIGHT),
            snippet: self.snippet.clone(),
        }
    }

    /// Upper bound on the number of fused results.
    #[must_use]
    pub const fn result_cap(&self) -> usize {
        self.keyword_limit.saturating_add(self.semantic_limit)
    }
}

const fn or_default_limit(value: usize, default: usize) -> usize {
    if value == 0 { default } else { value }
}

fn or_default_weight(value: f64, default: f64) -> f64 {
    // Also catches NaN.
    if value > 0.0 { value } else { default }
}

/// Dedup key for a location.
#[must_use]
pub fn identity_key(path: &str, start_line: usize, end_line: usize) -> String {
    format!("{path}:{start_line}:{end_line}")
}

/// Call-local accumulator of fused results.
#[derive(Debug, Default)]
pub(crate) struct Fusion {
    entries: HashMap<String, FusedResult>,
}

impl Fusion {
    pub(crate) fn add_lexical(&mut self, hit: &LineMatch, weight: f64) {
        let key = identity_key(&hit.path, hit.line_start, hit.line_end);
        self.entries
            .entry(key)
            .and_modify(|existing| {
                existing.source = Source::Both;
                existing.score += weight;
            })
            .or_insert_with(|| FusedResult {
                path: hit.path.clone(),
                start_line: hit.line_start,
                end_line: hit.line_end,
                snippet: hit.snippet.clone(),
                score: weight,
                source: Source::Keyword,
                match_line: Some(hit.line_start),
                match_column: None,
            });
    }

    /// Hits with a non-finite score are dropped; they would poison the sort.
    pub(crate) fn add_semantic(&mut self, hit: &SemanticHit, weight: f64) {
        if !hit.score.is_finite() {
            debug!(path = %hit.path, score = hit.score, "skipping non-finite semantic score");
            return;
        }
        let contribution = weight * hit.score;
        let key = identity_key(&hit.path, hit.start_line, hit.end_line);
        self.entries
            .entry(key)
            .and_modify(|existing| {
                existing.source = Source::Both;
                existing.score += contribution;
                if existing.snippet.is_empty() {
                    existing.snippet.clone_from(&hit.snippet);
                }
            })
            .or_insert_with(|| FusedResult {
                path: hit.path.clone(),
                start_line: hit.start_line,
                end_line: hit.end_line,
                snippet: hit.snippet.clone(),
                score: contribution,
                source: Source::Semantic,
                match_line: None,
                match_column: None,
            });
    }

    /// Flatten, sort by score descending and keep at most `cap` results.
    pub(crate) fn into_ranked(self, cap: usize) -> Vec<FusedResult> {
        let mut results: Vec<FusedResult> = self.entries.into_values().collect();
        sort_results(&mut results);
        results.truncate(cap);
        results
    }
}

/// Score descending, then path, start line and end line ascending.
pub fn sort_results(results: &mut [FusedResult]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.start_line.cmp(&b.start_line))
            .then_with(|| a.end_line.cmp(&b.end_line))
    });
}
