//! `similarFiles` (spec.md §6): ranks other indexed files by how much
//! their code-identifier vocabulary overlaps with one reference file,
//! using a plain Jaccard index over `content_code` tokens rather than a
//! stubbed or random score.

use super::Engine;
use codesearch_domain::error::{Error, Result};
use codesearch_domain::value_objects::{Query, SearchMode};
use codesearch_infrastructure::analyzer;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// One candidate's similarity to the reference file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarFile {
    /// Path relative to the workspace root.
    pub relative_path: String,
    /// Jaccard index over code-identifier vocabularies, in `[0, 1]`.
    pub similarity: f32,
}

impl Engine {
    /// Rank the `limit` most similar indexed files to `reference_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `reference_path` is not indexed, or
    /// propagates index-service failures.
    pub async fn similar_files(&self, workspace_path: &str, reference_path: &str, limit: usize) -> Result<Vec<SimilarFile>> {
        let handle = self.index_service.acquire(Path::new(workspace_path)).await?;

        let reference_content = self
            .index_service
            .get_content(&handle, reference_path)
            .await?
            .ok_or_else(|| Error::NotFound { resource: reference_path.to_owned() })?;
        let reference_terms = code_term_set(&reference_content);
        if reference_terms.is_empty() {
            return Ok(Vec::new());
        }

        // Use the reference file's own most distinctive identifiers as a
        // candidate-retrieval query, oversampling well past `limit` since
        // ranking happens on the Jaccard score, not Tantivy's BM25 score.
        let candidate_query_text = reference_terms.iter().take(16).cloned().collect::<Vec<_>>().join(" ");
        let mut query = Query::new(candidate_query_text, SearchMode::Code);
        query.limit = (limit * 10).max(50);
        query.response_mode = codesearch_domain::value_objects::ResponseMode::Summary;

        let outcome = self.index_service.search(&handle, &query).await?;

        let mut scored = Vec::new();
        for hit in outcome.hits {
            if hit.relative_path == reference_path || hit.document_id == reference_path {
                continue;
            }
            let Some(candidate_content) = self.index_service.get_content(&handle, &hit.document_id).await? else {
                continue;
            };
            let candidate_terms = code_term_set(&candidate_content);
            let similarity = jaccard(&reference_terms, &candidate_terms);
            if similarity > 0.0 {
                scored.push(SimilarFile { relative_path: hit.relative_path, similarity });
            }
        }

        scored.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}

fn code_term_set(content: &str) -> HashSet<String> {
    let (_, whole) = analyzer::code_tokens(content);
    whole.into_iter().collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_of_identical_sets_is_one() {
        let a: HashSet<String> = ["get", "user", "name"].iter().map(|s| s.to_string()).collect();
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn jaccard_of_disjoint_sets_is_zero() {
        let a: HashSet<String> = ["get"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["set"].iter().map(|s| s.to_string()).collect();
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_of_partial_overlap_is_between() {
        let a: HashSet<String> = ["get", "user", "name"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["get", "user", "id"].iter().map(|s| s.to_string()).collect();
        let score = jaccard(&a, &b);
        assert!(score > 0.0 && score < 1.0);
    }
}
