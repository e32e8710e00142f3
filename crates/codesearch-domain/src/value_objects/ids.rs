//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The content-addressed hash identifying a workspace (`<basename>_<hash>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceHash(pub String);

impl fmt::Display for WorkspaceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkspaceHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A monotonically increasing commit generation for a single index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct CommitGeneration(pub u64);

impl CommitGeneration {
    /// The generation before any commit has happened.
    #[must_use]
    pub fn initial() -> Self {
        Self(0)
    }

    /// The next generation after a commit.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CommitGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
