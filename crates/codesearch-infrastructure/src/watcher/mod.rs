//! `FileWatcher` (spec.md §4.7): watches a workspace tree and coalesces
//! bursts of filesystem events into debounced [`PendingChange`] batches,
//! so a save-as-rename or an editor's atomic write produces one logical
//! change instead of several redundant index updates.
//!
//! Grounded on the corpus's `notify`-based document watchers that track
//! per-path debounce state in a map and drain it on a periodic tick.

use codesearch_domain::constants::{DEFAULT_WATCHER_DEBOUNCE_MS, DEFAULT_WATCHER_QUIET_MS};
use codesearch_domain::error::{Error, Result};
use codesearch_domain::value_objects::{ChangeKind, PendingChange};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Watches one workspace root and surfaces coalesced change batches.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    changes_rx: mpsc::UnboundedReceiver<Vec<PendingChange>>,
}

impl FileWatcher {
    /// Start watching `root` recursively using the documented default
    /// debounce/quiet windows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if the underlying OS watcher fails to
    /// initialize or attach to `root`.
    pub fn start(root: PathBuf) -> Result<Self> {
        Self::start_with_windows(
            root,
            Duration::from_millis(DEFAULT_WATCHER_DEBOUNCE_MS),
            Duration::from_millis(DEFAULT_WATCHER_QUIET_MS),
        )
    }

    /// Start watching with explicit debounce/quiet windows, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invariant`] if the underlying OS watcher fails to
    /// initialize or attach to `root`.
    pub fn start_with_windows(root: PathBuf, debounce: Duration, quiet: Duration) -> Result<Self> {
        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<notify::Event>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                let _ = raw_tx.send(event);
            }
        })
        .map_err(|e| Error::Invariant { message: format!("failed to start file watcher: {e}") })?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| Error::Invariant { message: format!("failed to watch '{}': {e}", root.display()) })?;

        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut pending: HashMap<PathBuf, PendingChange> = HashMap::new();
            let mut ticker = tokio::time::interval(debounce);
            loop {
                tokio::select! {
                    maybe_event = raw_rx.recv() => {
                        match maybe_event {
                            Some(event) => apply_event(&mut pending, &event),
                            None => break,
                        }
                    }
                    _ = ticker.tick() => {
                        let ready = drain_ready(&mut pending, quiet);
                        if !ready.is_empty() && changes_tx.send(ready).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self { _watcher: watcher, changes_rx })
    }

    /// Await the next batch of debounced, quiet-period-elapsed changes.
    pub async fn recv(&mut self) -> Option<Vec<PendingChange>> {
        self.changes_rx.recv().await
    }
}

fn apply_event(pending: &mut HashMap<PathBuf, PendingChange>, event: &notify::Event) {
    for (path, kind) in changes_for_event(event) {
        match pending.get_mut(&path) {
            Some(existing) => existing.supersede(kind),
            None => {
                pending.insert(path.clone(), PendingChange::new(path, kind));
            }
        }
    }
}

/// Decompose one `notify::Event` into `(path, kind)` pairs. Renames are
/// split into a `Deleted` on the old path and a `Created` on the new one
/// here, so [`ChangeKind::Renamed`] never actually reaches a
/// [`PendingChange`] — see its doc comment.
fn changes_for_event(event: &notify::Event) -> Vec<(PathBuf, ChangeKind)> {
    match &event.kind {
        EventKind::Create(_) => event.paths.iter().map(|p| (p.clone(), ChangeKind::Created)).collect(),
        EventKind::Remove(_) => event.paths.iter().map(|p| (p.clone(), ChangeKind::Deleted)).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            event.paths.iter().map(|p| (p.clone(), ChangeKind::Deleted)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.iter().map(|p| (p.clone(), ChangeKind::Created)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.as_slice() {
            [old, new] => vec![(old.clone(), ChangeKind::Deleted), (new.clone(), ChangeKind::Created)],
            _ => Vec::new(),
        },
        EventKind::Modify(_) => event.paths.iter().map(|p| (p.clone(), ChangeKind::Modified)).collect(),
        _ => Vec::new(),
    }
}

/// Remove and return every change whose quiet period has elapsed,
/// dropping any that were cancelled by a later event.
fn drain_ready(pending: &mut HashMap<PathBuf, PendingChange>, quiet: Duration) -> Vec<PendingChange> {
    let ready_paths: Vec<PathBuf> =
        pending.iter().filter(|(_, change)| change.last_activity.elapsed() >= quiet).map(|(path, _)| path.clone()).collect();

    ready_paths
        .into_iter()
        .filter_map(|path| pending.remove(&path))
        .filter(|change| !change.cancelled)
        .collect()
}

/// Whether `path` lies within `root` — used by callers deciding whether a
/// watcher event belongs to a given workspace.
#[must_use]
pub fn belongs_to(root: &Path, path: &Path) -> bool {
    path.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_then_create_same_path_coalesces() {
        let mut pending = HashMap::new();
        let path = PathBuf::from("/ws/a.rs");
        apply_event(
            &mut pending,
            &notify::Event { kind: EventKind::Remove(notify::event::RemoveKind::Any), paths: vec![path.clone()], attrs: Default::default() },
        );
        apply_event(
            &mut pending,
            &notify::Event { kind: EventKind::Create(notify::event::CreateKind::Any), paths: vec![path.clone()], attrs: Default::default() },
        );
        assert_eq!(pending.get(&path).unwrap().kind, ChangeKind::Modified);
    }

    #[test]
    fn rename_both_decomposes_into_delete_and_create() {
        let mut pending = HashMap::new();
        let old = PathBuf::from("/ws/old.rs");
        let new = PathBuf::from("/ws/new.rs");
        apply_event(
            &mut pending,
            &notify::Event {
                kind: EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                paths: vec![old.clone(), new.clone()],
                attrs: Default::default(),
            },
        );
        assert_eq!(pending.get(&old).unwrap().kind, ChangeKind::Deleted);
        assert_eq!(pending.get(&new).unwrap().kind, ChangeKind::Created);
    }

    #[test]
    fn belongs_to_checks_prefix() {
        assert!(belongs_to(Path::new("/ws"), Path::new("/ws/src/a.rs")));
        assert!(!belongs_to(Path::new("/ws"), Path::new("/other/a.rs")));
    }
}
