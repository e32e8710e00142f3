//! `IndexService` (spec.md §4.5): owns one Tantivy writer/NRT-reader pair
//! per workspace, enforcing the documented state machine and tracking a
//! monotonic commit generation callers can use for cache invalidation.

mod schema;

use async_trait::async_trait;
use codesearch_domain::constants::{DEFAULT_CONTEXT_LINES, DEFAULT_RAM_BUFFER_MIB, MIN_RAM_BUFFER_MIB};
use codesearch_domain::error::{Error, Result};
use codesearch_domain::ports::{HandleId, IndexServicePort, SearchOutcome};
use codesearch_domain::value_objects::{
    CommitGeneration, ContextLine, Document, Hit, IndexHandleState, MatchedTerm, Query,
};
use dashmap::DashMap;
use parking_lot::{Mutex as SyncMutex, RwLock as SyncRwLock};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::schema::Value;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

pub use schema::{build_schema, SchemaFields};

use crate::path::PathResolver;
use crate::query::plan;

/// One workspace's live index resources.
struct IndexHandleInner {
    index_dir: PathBuf,
    index: Index,
    writer: SyncMutex<IndexWriter>,
    reader: IndexReader,
    fields: SchemaFields,
    state: SyncRwLock<IndexHandleState>,
    generation: AtomicU64,
}

/// Tantivy-backed implementation of [`IndexServicePort`].
pub struct TantivyIndexService {
    resolver: PathResolver,
    handles: DashMap<HandleId, Arc<IndexHandleInner>>,
    ram_buffer_bytes: usize,
}

impl TantivyIndexService {
    /// Build a service rooted at `resolver`, using the documented default
    /// writer heap size.
    #[must_use]
    pub fn new(resolver: PathResolver) -> Self {
        Self::with_ram_buffer(resolver, DEFAULT_RAM_BUFFER_MIB)
    }

    /// Build a service with an explicit writer heap size in MiB, clamped
    /// to the documented floor.
    #[must_use]
    pub fn with_ram_buffer(resolver: PathResolver, ram_buffer_mib: usize) -> Self {
        let clamped = ram_buffer_mib.max(MIN_RAM_BUFFER_MIB);
        Self { resolver, handles: DashMap::new(), ram_buffer_bytes: clamped * 1024 * 1024 }
    }

    fn handle(&self, handle_id: &HandleId) -> Result<Arc<IndexHandleInner>> {
        self.handles
            .get(handle_id)
            .map(|entry| Arc::clone(&entry))
            .ok_or_else(|| Error::WorkspaceNotIndexed { workspace: handle_id.clone() })
    }

    fn transition(handle: &IndexHandleInner, next: IndexHandleState) -> Result<()> {
        let mut state = handle.state.write();
        if *state == next {
            return Ok(());
        }
        if !state.can_transition_to(next) {
            return Err(Error::Invariant {
                message: format!("illegal index state transition {state:?} -> {next:?}"),
            });
        }
        *state = next;
        Ok(())
    }

    fn build_tantivy_document(fields: &SchemaFields, doc: &Document) -> TantivyDocument {
        let tokens = crate::analyzer::analyze(&doc.content);
        doc!(
            fields.path => doc.path.clone(),
            fields.relative_path => doc.relative_path.clone(),
            fields.filename => doc.filename.clone(),
            fields.extension => doc.extension.clone(),
            fields.language => doc.language.clone(),
            fields.size => doc.size,
            fields.modified_ticks => doc.modified_ticks,
            fields.content => tokens.content.join(" "),
            fields.content_code => tokens.content_code.join(" "),
            fields.content_symbols => tokens.content_symbols.join(" "),
            fields.content_literal => doc.content.clone(),
            fields.content_patterns => doc.content.clone(),
        )
    }
}

#[async_trait]
impl IndexServicePort for TantivyIndexService {
    async fn acquire(&self, workspace_root: &std::path::Path) -> Result<HandleId> {
        let canonical = crate::path::canonicalize_workspace_path(workspace_root)?;
        let handle_id = crate::path::directory_name_for(&canonical)?;

        if self.handles.contains_key(&handle_id) {
            return Ok(handle_id);
        }

        let index_dir = self.resolver.index_dir_for(&canonical)?;
        std::fs::create_dir_all(&index_dir)?;

        let (schema, fields) = build_schema();
        let already_exists = Index::exists(&tantivy::directory::MmapDirectory::open(&index_dir)?)
            .map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;

        let mut index = if already_exists {
            Index::open_in_dir(&index_dir).map_err(|e| Error::IndexCorrupt { message: e.to_string() })?
        } else {
            Index::create_in_dir(&index_dir, schema).map_err(|e| Error::IndexCorrupt { message: e.to_string() })?
        };
        index.tokenizers().register(schema::EXACT_TOKENIZER, schema::exact_tokenizer());

        let writer: IndexWriter = index
            .writer(self.ram_buffer_bytes)
            .map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e: tantivy::TantivyError| Error::IndexCorrupt { message: e.to_string() })?;

        let handle = Arc::new(IndexHandleInner {
            index_dir,
            index,
            writer: SyncMutex::new(writer),
            reader,
            fields,
            state: SyncRwLock::new(IndexHandleState::Ready),
            generation: AtomicU64::new(0),
        });
        self.handles.insert(handle_id.clone(), handle);
        Ok(handle_id)
    }

    async fn add_or_update(&self, handle_id: &HandleId, document: Document) -> Result<()> {
        let handle = self.handle(handle_id)?;
        Self::transition(&handle, IndexHandleState::Indexing)?;

        let path_term = Term::from_field_text(handle.fields.path, &document.path);
        let tantivy_doc = Self::build_tantivy_document(&handle.fields, &document);

        let writer = handle.writer.lock();
        writer.delete_term(path_term);
        writer.add_document(tantivy_doc).map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;
        Ok(())
    }

    async fn delete(&self, handle_id: &HandleId, path: &str) -> Result<()> {
        let handle = self.handle(handle_id)?;
        Self::transition(&handle, IndexHandleState::Indexing)?;

        let path_term = Term::from_field_text(handle.fields.path, path);
        handle.writer.lock().delete_term(path_term);
        Ok(())
    }

    async fn commit(&self, handle_id: &HandleId) -> Result<CommitGeneration> {
        let handle = self.handle(handle_id)?;
        {
            let mut writer = handle.writer.lock();
            writer.commit().map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;
        }
        handle.reader.reload().map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;
        Self::transition(&handle, IndexHandleState::Ready)?;
        let next = handle.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CommitGeneration(next))
    }

    async fn search(&self, handle_id: &HandleId, query: &Query) -> Result<SearchOutcome> {
        let handle = self.handle(handle_id)?;
        let planned = plan(&handle.fields, query)?;

        let searcher = handle.reader.searcher();
        let limit = query.limit.max(1);
        // Filters (extensions, globs, size, mtime) are applied after
        // retrieval rather than folded into the Tantivy query, so
        // oversample the candidate set to keep the post-filter from
        // starving `limit` real results.
        const OVERSAMPLE_FACTOR: usize = 4;
        let candidate_limit = limit.saturating_mul(OVERSAMPLE_FACTOR).max(limit);
        let top_docs = searcher
            .search(planned.query.as_ref(), &TopDocs::with_limit(candidate_limit))
            .map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;

        let mut hits = Vec::new();
        let mut total_matches = 0usize;
        for (score, address) in top_docs {
            let retrieved: TantivyDocument =
                searcher.doc(address).map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;
            if !passes_filters(&handle.fields, &retrieved, &query.filters) {
                continue;
            }
            total_matches += 1;
            if hits.len() < limit {
                hits.push(to_hit(&handle.fields, &retrieved, score, &planned.matched_terms));
            }
        }

        Ok(SearchOutcome {
            total_matches,
            hits,
            generation: CommitGeneration(handle.generation.load(Ordering::SeqCst)),
            timed_out: false,
        })
    }

    async fn current_generation(&self, handle_id: &HandleId) -> Result<CommitGeneration> {
        let handle = self.handle(handle_id)?;
        Ok(CommitGeneration(handle.generation.load(Ordering::SeqCst)))
    }

    async fn close(&self, handle_id: &HandleId) -> Result<()> {
        let handle = self.handle(handle_id)?;
        Self::transition(&handle, IndexHandleState::Closing)?;
        {
            let mut writer = handle.writer.lock();
            writer.commit().map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;
        }
        self.handles.remove(handle_id);
        Ok(())
    }

    async fn repair(&self, handle_id: &HandleId) -> Result<()> {
        let handle = self.handle(handle_id)?;
        Self::transition(&handle, IndexHandleState::Repairing)?;
        let meta = handle.index.validate_checksum();
        match meta {
            Ok(_) => Self::transition(&handle, IndexHandleState::Ready),
            Err(e) => {
                Self::transition(&handle, IndexHandleState::Failed)?;
                Err(Error::IndexCorrupt { message: e.to_string() })
            }
        }
    }

    async fn clear(&self, handle_id: &HandleId) -> Result<()> {
        let handle = self.handle(handle_id)?;
        Self::transition(&handle, IndexHandleState::Indexing)?;
        let mut writer = handle.writer.lock();
        writer.delete_all_documents().map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;
        Ok(())
    }

    async fn get_content(&self, handle_id: &HandleId, path: &str) -> Result<Option<String>> {
        let handle = self.handle(handle_id)?;
        let searcher = handle.reader.searcher();
        let term = Term::from_field_text(handle.fields.path, path);
        let query = tantivy::query::TermQuery::new(term, tantivy::schema::IndexRecordOption::Basic);
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;

        let Some((_, address)) = top_docs.into_iter().next() else {
            return Ok(None);
        };
        let retrieved: TantivyDocument =
            searcher.doc(address).map_err(|e| Error::IndexCorrupt { message: e.to_string() })?;
        Ok(Some(field_str(&retrieved, handle.fields.content_patterns)))
    }
}

/// Apply the query's structural filters to one candidate document. Globs
/// match against `relative_path`; everything else reads the stored
/// numeric/string fields directly.
fn passes_filters(fields: &SchemaFields, doc: &TantivyDocument, filters: &codesearch_domain::value_objects::QueryFilters) -> bool {
    if let Some(extensions) = &filters.extensions {
        let extension = field_str(doc, fields.extension).to_lowercase();
        if !extensions.iter().any(|e| e.to_lowercase() == extension) {
            return false;
        }
    }

    let relative_path = field_str(doc, fields.relative_path);
    if let Some(include_globs) = &filters.include_globs {
        let included = include_globs.iter().any(|pattern| {
            glob::Pattern::new(pattern).map(|p| p.matches(&relative_path)).unwrap_or(false)
        });
        if !included {
            return false;
        }
    }
    if let Some(exclude_globs) = &filters.exclude_globs {
        let excluded = exclude_globs.iter().any(|pattern| {
            glob::Pattern::new(pattern).map(|p| p.matches(&relative_path)).unwrap_or(false)
        });
        if excluded {
            return false;
        }
    }

    if let Some((min, max)) = filters.size_range {
        let size = doc.get_first(fields.size).and_then(Value::as_u64).unwrap_or(0);
        if size < min || size > max {
            return false;
        }
    }

    if let Some(since) = filters.modified_since {
        let modified_ticks = doc.get_first(fields.modified_ticks).and_then(Value::as_i64).unwrap_or(0);
        let since_ticks = Document::ticks_from_unix_seconds(i64::try_from(since).unwrap_or(0), 0);
        if modified_ticks < since_ticks {
            return false;
        }
    }

    true
}

fn to_hit(fields: &SchemaFields, doc: &TantivyDocument, score: f32, matched_terms: &[String]) -> Hit {
    let document_id = field_str(doc, fields.path);
    let relative_path = field_str(doc, fields.relative_path);
    let raw_content = field_str(doc, fields.content_patterns);

    let matched: Vec<MatchedTerm> =
        matched_terms.iter().map(|term| MatchedTerm { field: "content".to_owned(), term: term.clone(), position: None }).collect();

    let context = extract_context(&raw_content, matched_terms, DEFAULT_CONTEXT_LINES);

    Hit { document_id, relative_path, score, matched_terms: matched, context }
}

fn field_str(doc: &TantivyDocument, field: tantivy::schema::Field) -> String {
    doc.get_first(field).and_then(|v| v.as_str()).unwrap_or_default().to_owned()
}

/// Locate the first line containing any of `terms` (case-insensitive) and
/// return a `context_lines`-wide window around it.
fn extract_context(raw_content: &str, terms: &[String], context_lines: usize) -> Vec<ContextLine> {
    if raw_content.is_empty() || terms.is_empty() {
        return Vec::new();
    }
    let lines: Vec<&str> = raw_content.lines().collect();
    let lowered_terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

    let matched_index = lines.iter().position(|line| {
        let lowered = line.to_lowercase();
        lowered_terms.iter().any(|term| lowered.contains(term.as_str()))
    });

    let Some(matched_index) = matched_index else {
        return Vec::new();
    };

    let start = matched_index.saturating_sub(context_lines);
    let end = (matched_index + context_lines + 1).min(lines.len());

    (start..end)
        .map(|i| ContextLine { line_number: i + 1, text: lines[i].to_owned(), is_match: i == matched_index })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_domain::value_objects::SearchMode;

    fn sample_document(path: &str, content: &str) -> Document {
        Document {
            path: path.to_owned(),
            relative_path: path.trim_start_matches('/').to_owned(),
            filename: path.rsplit('/').next().unwrap_or(path).to_owned(),
            extension: "rs".to_owned(),
            language: "rust".to_owned(),
            size: content.len() as u64,
            modified_ticks: 0,
            content: content.to_owned(),
        }
    }

    #[tokio::test]
    async fn add_commit_search_round_trip() {
        let base = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        let service = TantivyIndexService::new(PathResolver::new(base.path().to_path_buf()));

        let handle = service.acquire(workspace.path()).await.unwrap();
        service
            .add_or_update(&handle, sample_document("/ws/a.rs", "fn computeTotal(itemCount: u32) -> u32"))
            .await
            .unwrap();
        let generation = service.commit(&handle).await.unwrap();
        assert_eq!(generation, CommitGeneration(1));

        let query = Query::new("compute", SearchMode::Code);
        let outcome = service.search(&handle, &query).await.unwrap();
        assert!(!outcome.hits.is_empty());
    }

    #[tokio::test]
    async fn delete_then_commit_removes_document() {
        let base = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        let service = TantivyIndexService::new(PathResolver::new(base.path().to_path_buf()));

        let handle = service.acquire(workspace.path()).await.unwrap();
        service.add_or_update(&handle, sample_document("/ws/a.rs", "fn removedSoon()")).await.unwrap();
        service.commit(&handle).await.unwrap();

        service.delete(&handle, "/ws/a.rs").await.unwrap();
        service.commit(&handle).await.unwrap();

        let query = Query::new("removedsoon", SearchMode::Code);
        let outcome = service.search(&handle, &query).await.unwrap();
        assert!(outcome.hits.is_empty());
    }
}
