//! `PendingChange` (spec.md §3, §4.7) — a filesystem event in flight inside
//! the watcher's debounce/coalescence state machine.

use std::path::PathBuf;
use std::time::Instant;

/// The kind of filesystem event observed for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The path was created.
    Created,
    /// The path's contents changed.
    Modified,
    /// The path was removed.
    Deleted,
    /// The path was renamed; `Renamed` always decomposes into a `Deleted`
    /// on the old path and a `Modified` on the new one before reaching
    /// [`PendingChange`].
    Renamed,
}

/// A filesystem event in flight, owned by the watcher until it is
/// discharged (applied, cancelled, or superseded).
#[derive(Debug, Clone)]
pub struct PendingChange {
    /// Absolute path the event concerns.
    pub path: PathBuf,
    /// The most recently observed kind for this path.
    pub kind: ChangeKind,
    /// When this path was first seen in the current burst.
    pub first_seen: Instant,
    /// When this path was most recently touched.
    pub last_activity: Instant,
    /// Number of times processing this change has been retried.
    pub retry_count: u32,
    /// Set when a superseding event invalidates this change before flush.
    pub cancelled: bool,
}

impl PendingChange {
    /// Start tracking a new change.
    #[must_use]
    pub fn new(path: PathBuf, kind: ChangeKind) -> Self {
        let now = Instant::now();
        Self {
            path,
            kind,
            first_seen: now,
            last_activity: now,
            retry_count: 0,
            cancelled: false,
        }
    }

    /// Record a new event superseding the current one, refreshing the
    /// debounce window. A `Created` arriving within the quiet period after
    /// a `Deleted` collapses the pair into a single `Modified` (atomic-write
    /// coalescence); any other combination simply updates `kind`.
    pub fn supersede(&mut self, kind: ChangeKind) {
        self.last_activity = Instant::now();
        self.kind = match (self.kind, kind) {
            (ChangeKind::Deleted, ChangeKind::Created) => ChangeKind::Modified,
            (_, next) => next,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_then_create_coalesces_to_modified() {
        let mut change = PendingChange::new(PathBuf::from("/ws/a.rs"), ChangeKind::Deleted);
        change.supersede(ChangeKind::Created);
        assert_eq!(change.kind, ChangeKind::Modified);
    }

    #[test]
    fn modified_then_modified_stays_modified() {
        let mut change = PendingChange::new(PathBuf::from("/ws/a.rs"), ChangeKind::Modified);
        change.supersede(ChangeKind::Modified);
        assert_eq!(change.kind, ChangeKind::Modified);
    }

    #[test]
    fn created_then_deleted_becomes_deleted() {
        let mut change = PendingChange::new(PathBuf::from("/ws/a.rs"), ChangeKind::Created);
        change.supersede(ChangeKind::Deleted);
        assert_eq!(change.kind, ChangeKind::Deleted);
    }
}
