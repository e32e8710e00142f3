//! `QueryPlanner` (spec.md §4.8): translates a domain [`Query`] into a
//! concrete Tantivy query against the multi-field schema, dispatching on
//! [`SearchMode`].

use codesearch_domain::error::{Error, Result};
use codesearch_domain::value_objects::{Query, SearchMode};
use tantivy::query::{AllQuery, BooleanQuery, FuzzyTermQuery, Occur, PhraseQuery, Query as TantivyQuery, RegexQuery, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::Term;

use crate::analyzer;
use crate::index::SchemaFields;

/// A concrete Tantivy query plus the terms a caller should highlight.
pub struct PlannedQuery {
    /// The query to execute against the current reader's searcher.
    pub query: Box<dyn TantivyQuery>,
    /// Terms worth highlighting in matched documents.
    pub matched_terms: Vec<String>,
}

/// Build a [`PlannedQuery`] for `query` against `fields`.
///
/// # Errors
///
/// Returns [`Error::InvalidPattern`] if a regex query fails to compile, or
/// [`Error::QueryTooComplex`] if the query text is empty after mode
/// resolution.
pub fn plan(fields: &SchemaFields, query: &Query) -> Result<PlannedQuery> {
    if query.text.trim() == "*" {
        return Ok(PlannedQuery { query: Box::new(AllQuery), matched_terms: Vec::new() });
    }

    let mode = match query.mode {
        SearchMode::Auto => resolve_auto_mode(&query.text),
        other => other,
    };

    match mode {
        SearchMode::Auto => unreachable!("resolve_auto_mode never returns Auto"),
        SearchMode::Standard => plan_standard(fields, &query.text),
        SearchMode::Code => plan_code(fields, &query.text),
        SearchMode::Symbol => plan_symbol(fields, &query.text),
        SearchMode::Literal => plan_literal(fields, &query.text),
        SearchMode::Fuzzy => plan_fuzzy(fields, &query.text),
        SearchMode::Regex => plan_regex(fields, &query.text),
    }
}

/// Heuristic mode resolution for [`SearchMode::Auto`]: regex metacharacters
/// win first, then identifier casing/underscores route to code search,
/// otherwise fall back to standard prose search.
fn resolve_auto_mode(text: &str) -> SearchMode {
    const REGEX_METACHARS: [char; 10] = ['(', ')', '[', ']', '{', '}', '^', '$', '|', '\\'];
    if text.chars().any(|c| REGEX_METACHARS.contains(&c)) || text.contains(".*") {
        return SearchMode::Regex;
    }
    if text.contains('_') || (text.chars().any(char::is_uppercase) && text.chars().any(char::is_lowercase)) {
        return SearchMode::Code;
    }
    SearchMode::Standard
}

fn require_non_empty(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::QueryTooComplex { message: "query text is empty".to_owned() });
    }
    Ok(())
}

fn plan_standard(fields: &SchemaFields, text: &str) -> Result<PlannedQuery> {
    require_non_empty(text)?;
    let terms = analyzer::standard_tokens(text);
    boolean_term_query(fields.content, &terms, Occur::Must)
}

fn plan_code(fields: &SchemaFields, text: &str) -> Result<PlannedQuery> {
    require_non_empty(text)?;
    let (split, whole) = analyzer::code_tokens(text);
    let mut terms = split;
    terms.extend(whole);
    terms.sort();
    terms.dedup();
    boolean_term_query(fields.content_code, &terms, Occur::Must)
}

fn plan_symbol(fields: &SchemaFields, text: &str) -> Result<PlannedQuery> {
    require_non_empty(text)?;
    let terms = analyzer::standard_tokens(text);
    boolean_term_query(fields.content_symbols, &terms, Occur::Must)
}

fn plan_literal(fields: &SchemaFields, text: &str) -> Result<PlannedQuery> {
    require_non_empty(text)?;
    let terms: Vec<Term> = text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| !s.is_empty())
        .map(|s| Term::from_field_text(fields.content_literal, s))
        .collect();
    if terms.is_empty() {
        return Err(Error::QueryTooComplex { message: "literal query has no indexable terms".to_owned() });
    }
    let matched_terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if terms.len() == 1 {
        return Ok(PlannedQuery {
            query: Box::new(TermQuery::new(terms[0].clone(), IndexRecordOption::WithFreqsAndPositions)),
            matched_terms,
        });
    }
    Ok(PlannedQuery { query: Box::new(PhraseQuery::new(terms)), matched_terms })
}

fn plan_fuzzy(fields: &SchemaFields, text: &str) -> Result<PlannedQuery> {
    require_non_empty(text)?;
    let terms = analyzer::standard_tokens(text);
    if terms.is_empty() {
        return Err(Error::QueryTooComplex { message: "fuzzy query has no indexable terms".to_owned() });
    }
    let clauses: Vec<(Occur, Box<dyn TantivyQuery>)> = terms
        .iter()
        .map(|term| {
            let tantivy_term = Term::from_field_text(fields.content, term);
            let fuzzy: Box<dyn TantivyQuery> = Box::new(FuzzyTermQuery::new(tantivy_term, 2, true));
            (Occur::Should, fuzzy)
        })
        .collect();
    Ok(PlannedQuery { query: Box::new(BooleanQuery::new(clauses)), matched_terms: terms })
}

/// Regex mode runs against `content_symbols`: Tantivy's [`RegexQuery`]
/// matches whole terms in a field's dictionary, and whole (unsplit)
/// identifiers are the only field where a pattern like `get.*Name` can
/// match a single term rather than being defeated by code-aware splitting.
fn plan_regex(fields: &SchemaFields, pattern: &str) -> Result<PlannedQuery> {
    require_non_empty(pattern)?;
    let query = RegexQuery::from_pattern(pattern, fields.content_symbols)
        .map_err(|e| Error::InvalidPattern { pattern: pattern.to_owned(), message: e.to_string() })?;
    Ok(PlannedQuery { query: Box::new(query), matched_terms: vec![pattern.to_owned()] })
}

fn boolean_term_query(field: tantivy::schema::Field, terms: &[String], occur: Occur) -> Result<PlannedQuery> {
    if terms.is_empty() {
        return Err(Error::QueryTooComplex { message: "query has no indexable terms".to_owned() });
    }
    let clauses: Vec<(Occur, Box<dyn TantivyQuery>)> = terms
        .iter()
        .map(|term| {
            let tantivy_term = Term::from_field_text(field, term);
            let query: Box<dyn TantivyQuery> = Box::new(TermQuery::new(tantivy_term, IndexRecordOption::WithFreqsAndPositions));
            (occur, query)
        })
        .collect();
    Ok(PlannedQuery { query: Box::new(BooleanQuery::new(clauses)), matched_terms: terms.to_vec() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_mode_routes_camel_case_to_code() {
        assert_eq!(resolve_auto_mode("getUserName"), SearchMode::Code);
    }

    #[test]
    fn auto_mode_routes_metacharacters_to_regex() {
        assert_eq!(resolve_auto_mode("get.*Name"), SearchMode::Regex);
    }

    #[test]
    fn auto_mode_defaults_to_standard() {
        assert_eq!(resolve_auto_mode("hello world"), SearchMode::Standard);
    }

    #[test]
    fn empty_text_is_rejected() {
        let (_, fields) = crate::index::build_schema();
        assert!(plan_standard(&fields, "   ").is_err());
    }
}
