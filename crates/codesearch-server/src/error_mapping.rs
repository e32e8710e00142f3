//! Maps a domain [`Error`] onto the [`Recovery`] hint attached to a
//! failing envelope (spec.md §7: "for `IndexLocked`, suggest running
//! startup cleanup; for `IndexNotFound`, suggest `index_workspace`; for
//! `TooManyResults`, suggest narrowing filters or enabling summary mode").

use crate::envelope::Recovery;
use codesearch_domain::error::Error;

/// Build the recovery hint for `error`, tailored to its variant.
#[must_use]
pub fn recovery_for(error: &Error) -> Recovery {
    match error {
        Error::IndexLocked => Recovery {
            steps: vec!["run cleanup-locks to reclaim locks with no live holder".to_owned(), "retry the request".to_owned()],
            suggested_actions: vec!["cleanup_locks".to_owned()],
        },
        Error::WorkspaceNotIndexed { .. } => Recovery {
            steps: vec!["index the workspace before searching it".to_owned()],
            suggested_actions: vec!["index_workspace".to_owned()],
        },
        Error::QueryTooComplex { .. } => Recovery {
            steps: vec!["narrow the query with filters".to_owned(), "or request summary response mode".to_owned()],
            suggested_actions: vec!["text_search".to_owned()],
        },
        Error::RegistryCorrupt => Recovery {
            steps: vec!["the registry was rebuilt from a filesystem scan; re-run index_workspace for any workspace missing from the rebuilt list".to_owned()],
            suggested_actions: vec!["index_workspace".to_owned()],
        },
        Error::IndexCorrupt { .. } => Recovery {
            steps: vec!["re-run index_workspace with forceRebuild to repair the index".to_owned()],
            suggested_actions: vec!["index_workspace".to_owned()],
        },
        Error::BreakerOpen { retry_after_secs, .. } => Recovery {
            steps: vec![format!("wait {retry_after_secs}s for the circuit breaker to allow a probe, then retry")],
            suggested_actions: vec!["index_health_check".to_owned()],
        },
        Error::NotFound { .. } => Recovery {
            steps: vec!["confirm the path exists and is under an indexed workspace".to_owned()],
            suggested_actions: vec!["index_workspace".to_owned()],
        },
        Error::Timeout { .. } | Error::Cancelled | Error::FileBusy { .. } => {
            Recovery { steps: vec!["transient failure; retry with backoff".to_owned()], suggested_actions: vec![] }
        }
        _ => Recovery { steps: vec!["retry; if the problem persists, check the server logs".to_owned()], suggested_actions: vec![] },
    }
}
