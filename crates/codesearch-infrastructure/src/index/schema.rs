//! Tantivy schema shared by the index writer, reader, and query planner.

use tantivy::schema::{Field, Schema, SchemaBuilder, FAST, INDEXED, STORED, STRING, TEXT};
use tantivy::tokenizer::{SimpleTokenizer, TextAnalyzer, TextAnalyzerBuilder};

/// Name of the case-preserving tokenizer backing `content_literal`.
pub const EXACT_TOKENIZER: &str = "exact_literal";

/// Field handles for the multi-field document schema (spec.md §4.4).
#[derive(Debug, Clone, Copy)]
pub struct SchemaFields {
    /// Canonical absolute path; the document's unique id.
    pub path: Field,
    /// Path relative to the workspace root, for display.
    pub relative_path: Field,
    /// File name only, for display and `fileSearch`.
    pub filename: Field,
    /// Extension without the leading dot, for filtering.
    pub extension: Field,
    /// Best-effort language classification.
    pub language: Field,
    /// File size in bytes.
    pub size: Field,
    /// Modification time in 100ns ticks, fast for range queries.
    pub modified_ticks: Field,
    /// Natural-language words.
    pub content: Field,
    /// Split code identifiers (camelCase/snake_case subwords).
    pub content_code: Field,
    /// Whole identifiers, unsplit.
    pub content_symbols: Field,
    /// Case-preserving exact-match text, for literal substring search.
    pub content_literal: Field,
    /// Raw file content, stored only, for regex search and context snippets.
    pub content_patterns: Field,
}

/// Build the schema plus its field handles.
#[must_use]
pub fn build_schema() -> (Schema, SchemaFields) {
    let mut builder: SchemaBuilder = Schema::builder();

    let path = builder.add_text_field("path", STRING | STORED);
    let relative_path = builder.add_text_field("relative_path", STORED);
    let filename = builder.add_text_field("filename", STORED);
    let extension = builder.add_text_field("extension", STRING | STORED);
    let language = builder.add_text_field("language", STORED);
    let size = builder.add_u64_field("size", INDEXED | STORED | FAST);
    let modified_ticks = builder.add_i64_field("modified_ticks", INDEXED | STORED | FAST);
    let content = builder.add_text_field("content", TEXT);
    let content_code = builder.add_text_field("content_code", TEXT);
    let content_symbols = builder.add_text_field("content_symbols", TEXT);

    let exact_options = tantivy::schema::TextOptions::default().set_indexing_options(
        tantivy::schema::TextFieldIndexing::default()
            .set_tokenizer(EXACT_TOKENIZER)
            .set_index_option(tantivy::schema::IndexRecordOption::WithFreqsAndPositions),
    );
    let content_literal = builder.add_text_field("content_literal", exact_options);
    let content_patterns = builder.add_text_field("content_patterns", STORED);

    let schema = builder.build();
    let fields = SchemaFields {
        path,
        relative_path,
        filename,
        extension,
        language,
        size,
        modified_ticks,
        content,
        content_code,
        content_symbols,
        content_literal,
        content_patterns,
    };
    (schema, fields)
}

/// Case-preserving tokenizer used for `content_literal`: splits on
/// non-alphanumeric boundaries like the default tokenizer but skips
/// lowercasing, so substring queries stay case-sensitive.
#[must_use]
pub fn exact_tokenizer() -> TextAnalyzer {
    let builder: TextAnalyzerBuilder<SimpleTokenizer> = TextAnalyzer::builder(SimpleTokenizer::default());
    builder.build()
}
