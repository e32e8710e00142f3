//! `ResponseBuilder` (spec.md §4.9): shapes ranked hits into the
//! summary/full/adaptive response data the request surface serializes,
//! computing hotspots and extension/directory distributions and honoring
//! the caller's token budget.

use codesearch_domain::constants::{CHARS_PER_TOKEN, TOKEN_BUDGET_MARGIN};
use codesearch_domain::value_objects::{Hit, Query, ResponseMode};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// A file with an unusually high match count within one response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Path relative to the workspace root.
    pub relative_path: String,
    /// Number of hits contributed by this file.
    pub match_count: usize,
}

/// Shaped, ready-to-serialize search results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponseData {
    /// The hits actually included in this response.
    pub hits: Vec<Hit>,
    /// Total matches before any per-file/total caps were applied.
    pub total_matches: usize,
    /// Whether `hits` is a subset of all matches.
    pub truncated: bool,
    /// The files contributing the most hits, most first.
    pub hotspots: Vec<Hotspot>,
    /// Hit count grouped by file extension.
    pub extension_distribution: HashMap<String, usize>,
    /// Hit count grouped by containing directory.
    pub directory_distribution: HashMap<String, usize>,
    /// Rough token count of the serialized response.
    pub estimated_tokens: usize,
    /// The response mode actually used, after adaptive downgrading.
    pub response_mode_used: ResponseMode,
}

/// Builds [`SearchResponseData`] from raw search hits.
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Shape `hits` according to `query`'s response mode and token budget.
    #[must_use]
    pub fn build(query: &Query, hits: Vec<Hit>, total_matches: usize) -> SearchResponseData {
        let hotspots = compute_hotspots(&hits);
        let extension_distribution = compute_extension_distribution(&hits);
        let directory_distribution = compute_directory_distribution(&hits);

        let (final_hits, mode_used) = match query.response_mode {
            ResponseMode::Summary => (strip_context(&hits), ResponseMode::Summary),
            ResponseMode::Full => (hits.clone(), ResponseMode::Full),
            ResponseMode::Adaptive => match query.max_tokens {
                Some(budget) if estimate_tokens(&hits) > budget_with_margin(budget) => {
                    (strip_context(&hits), ResponseMode::Summary)
                }
                _ => (hits.clone(), ResponseMode::Full),
            },
        };
        let estimated_tokens = estimate_tokens(&final_hits);

        SearchResponseData {
            truncated: final_hits.len() < total_matches,
            hits: final_hits,
            total_matches,
            hotspots,
            extension_distribution,
            directory_distribution,
            estimated_tokens,
            response_mode_used: mode_used,
        }
    }
}

fn budget_with_margin(budget: usize) -> usize {
    (budget as f64 * (1.0 + TOKEN_BUDGET_MARGIN)) as usize
}

fn strip_context(hits: &[Hit]) -> Vec<Hit> {
    hits.iter().map(|hit| Hit { context: Vec::new(), ..hit.clone() }).collect()
}

fn estimate_tokens(hits: &[Hit]) -> usize {
    let serialized = serde_json::to_string(hits).unwrap_or_default();
    serialized.len() / CHARS_PER_TOKEN
}

fn compute_hotspots(hits: &[Hit]) -> Vec<Hotspot> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for hit in hits {
        *counts.entry(hit.relative_path.clone()).or_insert(0) += 1;
    }
    let mut hotspots: Vec<Hotspot> =
        counts.into_iter().map(|(relative_path, match_count)| Hotspot { relative_path, match_count }).collect();
    hotspots.sort_by(|a, b| b.match_count.cmp(&a.match_count).then_with(|| a.relative_path.cmp(&b.relative_path)));
    hotspots.truncate(10);
    hotspots
}

fn compute_extension_distribution(hits: &[Hit]) -> HashMap<String, usize> {
    let mut distribution = HashMap::new();
    for hit in hits {
        let extension = Path::new(&hit.relative_path).extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
        *distribution.entry(extension).or_insert(0) += 1;
    }
    distribution
}

fn compute_directory_distribution(hits: &[Hit]) -> HashMap<String, usize> {
    let mut distribution = HashMap::new();
    for hit in hits {
        let directory =
            Path::new(&hit.relative_path).parent().map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
        *distribution.entry(directory).or_insert(0) += 1;
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_domain::value_objects::{ContextLine, SearchMode};

    fn hit(relative_path: &str) -> Hit {
        Hit {
            document_id: relative_path.to_owned(),
            relative_path: relative_path.to_owned(),
            score: 1.0,
            matched_terms: Vec::new(),
            context: vec![ContextLine { line_number: 1, text: "match".to_owned(), is_match: true }],
        }
    }

    #[test]
    fn hotspots_rank_by_match_count() {
        let hits = vec![hit("a.rs"), hit("a.rs"), hit("b.rs")];
        let query = Query::new("x", SearchMode::Standard);
        let data = ResponseBuilder::build(&query, hits, 3);
        assert_eq!(data.hotspots[0].relative_path, "a.rs");
        assert_eq!(data.hotspots[0].match_count, 2);
    }

    #[test]
    fn summary_mode_strips_context() {
        let mut query = Query::new("x", SearchMode::Standard);
        query.response_mode = ResponseMode::Summary;
        let data = ResponseBuilder::build(&query, vec![hit("a.rs")], 1);
        assert!(data.hits[0].context.is_empty());
    }

    #[test]
    fn adaptive_mode_downgrades_when_over_budget() {
        let mut query = Query::new("x", SearchMode::Standard);
        query.response_mode = ResponseMode::Adaptive;
        query.max_tokens = Some(1);
        let data = ResponseBuilder::build(&query, vec![hit("a.rs")], 1);
        assert_eq!(data.response_mode_used, ResponseMode::Summary);
    }

    #[test]
    fn truncated_reflects_cap_vs_total() {
        let query = Query::new("x", SearchMode::Standard);
        let data = ResponseBuilder::build(&query, vec![hit("a.rs")], 5);
        assert!(data.truncated);
    }
}
