//! The code-aware analyzer (spec.md §4.4): derives the four searchable
//! token streams — `content` (prose words), `content_code` (split
//! identifiers), `content_symbols` (whole identifiers), and
//! `content_literal`/`content_patterns` (raw, untokenized text) — from a
//! single source file's contents.
//!
//! Grounded on the teacher's own camelCase/snake_case splitting used for
//! symbol search, generalized here into a standalone, side-effect-free
//! tokenizer independent of any particular AST.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}_][\p{L}\p{N}_]*").expect("identifier pattern compiles"))
}

/// The derived token streams for one document's content. Each is joined
/// with spaces before being fed to the index writer, since Tantivy's
/// default tokenizer only needs whitespace-separated terms once the
/// splitting work is already done here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTokens {
    /// Lowercased natural-language words, for prose-style search.
    pub content: Vec<String>,
    /// Every identifier, further split on case/underscore boundaries.
    pub content_code: Vec<String>,
    /// Whole identifiers, unsplit, for exact symbol lookup.
    pub content_symbols: Vec<String>,
}

/// Derive all token streams for `text`.
#[must_use]
pub fn analyze(text: &str) -> FieldTokens {
    let content = standard_tokens(text);
    let (content_code, content_symbols) = code_tokens(text);
    FieldTokens { content, content_code, content_symbols }
}

/// Lowercased Unicode word tokens, for prose-style matching.
#[must_use]
pub fn standard_tokens(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

/// Extract identifiers from `text` and return `(split_subwords, whole_identifiers)`.
#[must_use]
pub fn code_tokens(text: &str) -> (Vec<String>, Vec<String>) {
    let mut split = Vec::new();
    let mut whole = Vec::new();

    for m in identifier_pattern().find_iter(text) {
        let identifier = m.as_str();
        if identifier.chars().all(|c| c == '_') {
            continue;
        }
        whole.push(identifier.to_lowercase());
        split.extend(split_identifier(identifier));
    }

    (split, whole)
}

/// Split one identifier on camelCase, PascalCase, snake_case, and
/// kebab-case boundaries, lowercasing every resulting subword. The
/// original identifier (lowercased, boundaries collapsed) is also
/// included so a query for the whole identifier still matches.
#[must_use]
pub fn split_identifier(identifier: &str) -> Vec<String> {
    let mut subwords = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = identifier.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                subwords.push(std::mem::take(&mut current));
            }
            continue;
        }
        let starts_new_word = i > 0
            && !current.is_empty()
            && ((c.is_uppercase() && chars[i - 1].is_lowercase())
                || (c.is_uppercase()
                    && i + 1 < chars.len()
                    && chars[i - 1].is_uppercase()
                    && chars[i + 1].is_lowercase())
                || (c.is_numeric() && !chars[i - 1].is_numeric())
                || (!c.is_numeric() && chars[i - 1].is_numeric()));
        if starts_new_word {
            subwords.push(std::mem::take(&mut current));
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        subwords.push(current);
    }

    let joined: String = subwords.concat();
    if subwords.len() > 1 && joined != subwords[0] {
        subwords.push(joined);
    }
    subwords.into_iter().filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case() {
        assert_eq!(split_identifier("getUserName"), vec!["get", "user", "name", "getusername"]);
    }

    #[test]
    fn splits_snake_case() {
        assert_eq!(split_identifier("parse_workspace_hash"), vec!["parse", "workspace", "hash", "parseworkspacehash"]);
    }

    #[test]
    fn splits_pascal_case_with_acronym() {
        let tokens = split_identifier("HTTPServerConfig");
        assert!(tokens.contains(&"http".to_owned()));
        assert!(tokens.contains(&"server".to_owned()));
        assert!(tokens.contains(&"config".to_owned()));
    }

    #[test]
    fn single_word_has_no_joined_duplicate() {
        assert_eq!(split_identifier("name"), vec!["name"]);
    }

    #[test]
    fn code_tokens_collects_whole_identifiers_separately() {
        let (split, whole) = code_tokens("fn getUserName(user_id: u64) -> String {");
        assert!(whole.contains(&"getusername".to_owned()));
        assert!(whole.contains(&"user_id".to_owned()));
        assert!(split.contains(&"user".to_owned()));
        assert!(split.contains(&"name".to_owned()));
    }

    #[test]
    fn standard_tokens_lowercases_words() {
        assert_eq!(standard_tokens("Hello World"), vec!["hello", "world"]);
    }

    #[test]
    fn analyze_populates_all_three_streams() {
        let tokens = analyze("fn computeTotal(itemCount: u32) -> u32 { itemCount * 2 }");
        assert!(tokens.content.contains(&"itemcount".to_owned()));
        assert!(tokens.content_code.contains(&"compute".to_owned()));
        assert!(tokens.content_symbols.contains(&"computetotal".to_owned()));
    }
}
