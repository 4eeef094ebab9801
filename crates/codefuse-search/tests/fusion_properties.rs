//! Fusion engine properties, exercised through in-memory providers.
//!
//! # Properties covered
//!
//! 1. **End-to-end example**: two lexical hits, one overlapping semantic hit.
//! 2. **Dedup additivity**: identical locations sum both contributions.
//! 3. **No-overlap preservation**: single-source hits keep their own weight.
//! 4. **Ordering**: output is sorted by score descending.
//! 5. **Truncation**: output never exceeds `keyword_limit + semantic_limit`
//!    while counts report the raw backend totals.

use std::path::Path;

use codefuse_search::{
    FusionConfig, HybridSearch, LineMatch, LineMatchProvider, SearchContext, SearchError,
    SemanticError, SemanticHit, SemanticOutcome, SemanticSearcher, SnippetFn, Source,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// In-memory providers
// ---------------------------------------------------------------------------

/// Returns its matches verbatim (after the limit), ignoring query and root.
struct MemoryLexical(Vec<LineMatch>);

impl MemoryLexical {
    fn lines(hits: &[(&str, usize)]) -> Self {
        Self(
            hits.iter()
                .zip(0_i64..)
                .map(|((path, line), idx)| LineMatch {
                    path: (*path).to_string(),
                    line_start: *line,
                    line_end: *line,
                    snippet: format!("match at {path}:{line}"),
                    rank: 100 - idx,
                })
                .collect(),
        )
    }
}

impl LineMatchProvider for MemoryLexical {
    fn search(
        &self,
        _query: &str,
        _root: &Path,
        limit: usize,
    ) -> Result<Vec<LineMatch>, SearchError> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

struct MemorySemantic(Vec<SemanticHit>);

impl SemanticSearcher for MemorySemantic {
    fn available(&self) -> bool {
        true
    }

    fn search_with_context(
        &self,
        _ctx: &SearchContext,
        _query: &str,
        limit: usize,
    ) -> Result<SemanticOutcome, SemanticError> {
        Ok(SemanticOutcome::hits(
            self.0.iter().take(limit).cloned().collect(),
        ))
    }

    fn search_with_snippets(
        &self,
        ctx: &SearchContext,
        query: &str,
        limit: usize,
        _snippet: &SnippetFn,
    ) -> Result<SemanticOutcome, SemanticError> {
        self.search_with_context(ctx, query, limit)
    }
}

fn semantic_hit(path: &str, start: usize, end: usize, score: f64) -> SemanticHit {
    SemanticHit {
        path: path.to_string(),
        start_line: start,
        end_line: end,
        snippet: format!("passage {path}:{start}-{end}"),
        score,
    }
}

fn config(keyword_limit: usize, semantic_limit: usize) -> FusionConfig {
    FusionConfig {
        keyword_limit,
        semantic_limit,
        keyword_weight: 0.6,
        semantic_weight: 0.4,
        snippet: None,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ---------------------------------------------------------------------------
// Fixed scenarios
// ---------------------------------------------------------------------------

#[test]
fn end_to_end_example() {
    let lexical = MemoryLexical::lines(&[("a.go", 10), ("b.go", 5)]);
    let semantic = MemorySemantic(vec![semantic_hit("a.go", 10, 10, 0.9)]);
    let engine = HybridSearch::new(&lexical).with_semantic(&semantic);

    let out = engine
        .search("foo", Path::new("."), &SearchContext::new(), &config(2, 1))
        .expect("search succeeds");

    assert_eq!(out.keyword_count, 2);
    assert_eq!(out.semantic_count, 1);
    assert!(out.semantic_enabled);
    assert_eq!(out.results.len(), 2);

    let first = &out.results[0];
    assert_eq!((first.path.as_str(), first.start_line), ("a.go", 10));
    assert!(close(first.score, 0.96), "got {}", first.score);
    assert_eq!(first.source, Source::Both);
    assert_eq!(first.match_line, Some(10));

    let second = &out.results[1];
    assert_eq!((second.path.as_str(), second.start_line), ("b.go", 5));
    assert!(close(second.score, 0.6));
    assert_eq!(second.source, Source::Keyword);
}

#[test]
fn semantic_only_hit_scores_weighted_candidate() {
    let lexical = MemoryLexical::lines(&[("a.go", 10)]);
    let semantic = MemorySemantic(vec![semantic_hit("c.go", 1, 20, 0.5)]);
    let engine = HybridSearch::new(&lexical).with_semantic(&semantic);

    let out = engine
        .search("foo", Path::new("."), &SearchContext::new(), &config(5, 5))
        .expect("search succeeds");

    let sem = out
        .results
        .iter()
        .find(|r| r.path == "c.go")
        .expect("semantic result present");
    assert_eq!(sem.source, Source::Semantic);
    assert!(close(sem.score, 0.2));
    assert_eq!(sem.match_line, None);
    assert_eq!(sem.match_column, None);
    assert_eq!(sem.snippet, "passage c.go:1-20");
}

#[test]
fn non_positive_config_uses_defaults() {
    let lexical = MemoryLexical::lines(&[("a.go", 1)]);
    let engine = HybridSearch::new(&lexical);
    let cfg = FusionConfig {
        keyword_limit: 0,
        semantic_limit: 0,
        keyword_weight: 0.0,
        semantic_weight: -3.0,
        snippet: None,
    };

    let out = engine
        .search("foo", Path::new("."), &SearchContext::new(), &cfg)
        .expect("search succeeds");

    assert!(close(out.results[0].score, 0.6));
}

#[test]
fn response_serializes_public_shape() {
    let lexical = MemoryLexical::lines(&[("a.go", 10)]);
    let engine = HybridSearch::new(&lexical);
    let out = engine
        .search("foo", Path::new("."), &SearchContext::new(), &config(1, 1))
        .expect("search succeeds");

    let json = serde_json::to_value(&out).expect("serialize");
    assert_eq!(json["keyword_count"], 1);
    assert_eq!(json["semantic_count"], 0);
    assert_eq!(json["semantic_enabled"], false);
    let row = &json["results"][0];
    assert_eq!(row["path"], "a.go");
    assert_eq!(row["start_line"], 10);
    assert_eq!(row["end_line"], 10);
    assert_eq!(row["source"], "keyword");
    assert_eq!(row["match_line"], 10);
    assert!(row.get("match_column").is_none());
}

// ---------------------------------------------------------------------------
// Generated scenarios
// ---------------------------------------------------------------------------

fn arb_lines() -> impl Strategy<Value = Vec<(String, usize)>> {
    prop::collection::vec(("[a-d]\\.go", 1_usize..6), 0..25)
}

fn arb_semantic() -> impl Strategy<Value = Vec<(String, usize, usize, f64)>> {
    prop::collection::vec(("[a-d]\\.go", 1_usize..6, 0_usize..3, 0.0_f64..1.0), 0..15)
}

proptest! {
    #[test]
    fn output_is_sorted_and_capped(
        lines in arb_lines(),
        sem in arb_semantic(),
        keyword_limit in 1_usize..10,
        semantic_limit in 1_usize..10,
    ) {
        let lexical = MemoryLexical(
            lines.iter().map(|(p, l)| LineMatch {
                path: p.clone(),
                line_start: *l,
                line_end: *l,
                snippet: String::new(),
                rank: 0,
            }).collect(),
        );
        let semantic = MemorySemantic(
            sem.iter().map(|(p, s, span, score)| semantic_hit(p, *s, s + span, *score)).collect(),
        );
        let engine = HybridSearch::new(&lexical).with_semantic(&semantic);

        let out = engine
            .search("q", Path::new("."), &SearchContext::new(), &config(keyword_limit, semantic_limit))
            .unwrap();

        prop_assert!(out.results.len() <= keyword_limit + semantic_limit);
        prop_assert_eq!(out.keyword_count, lines.len().min(keyword_limit));
        prop_assert_eq!(out.semantic_count, sem.len().min(semantic_limit));
        for pair in out.results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn shared_location_scores_are_additive(score in 0.0_f64..1.0, line in 1_usize..500) {
        let lexical = MemoryLexical::lines(&[("x.rs", line)]);
        let semantic = MemorySemantic(vec![semantic_hit("x.rs", line, line, score)]);
        let engine = HybridSearch::new(&lexical).with_semantic(&semantic);

        let out = engine
            .search("q", Path::new("."), &SearchContext::new(), &config(5, 5))
            .unwrap();

        prop_assert_eq!(out.results.len(), 1);
        prop_assert_eq!(out.results[0].source, Source::Both);
        prop_assert!(close(out.results[0].score, 0.6 + 0.4 * score));
    }
}
