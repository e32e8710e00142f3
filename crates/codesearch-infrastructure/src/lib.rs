//! # Infrastructure Layer
//!
//! Technical adapters implementing the domain's port traits: path
//! resolution, the persistent workspace registry, stale-lock recovery,
//! the code-aware analyzer, the Tantivy-backed index service, the
//! filesystem walker and watcher, query planning, caching, memory
//! pressure/circuit-breaking, configuration, and logging setup.

/// Code-aware multi-field tokenization (spec.md §4.4).
pub mod analyzer;
/// Bounded, generation-aware query result cache (spec.md §4.10).
pub mod cache;
/// Layered configuration loading.
pub mod config;
/// Filesystem tree walker producing `Document`s (spec.md §4.6).
pub mod indexer;
/// Tantivy-backed per-workspace index lifecycle (spec.md §4.5).
pub mod index;
/// Stale writer-lock detection and repair (spec.md §4.3).
pub mod lock;
/// Tracing/logging initialization.
pub mod logging;
/// Deterministic workspace-to-directory path mapping (spec.md §4.1).
pub mod path;
/// Memory pressure sampling and per-workspace circuit breaker (spec.md §4.11).
pub mod pressure;
/// Query-mode dispatch to Tantivy queries (spec.md §4.8).
pub mod query;
/// Persistent workspace/orphan catalog (spec.md §4.2).
pub mod registry;
/// Filesystem watcher with debounce/coalescence (spec.md §4.7).
pub mod watcher;
