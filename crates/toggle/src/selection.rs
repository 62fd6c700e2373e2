//! Selection of workflow files from a directory listing.

use serde::{Deserialize, Serialize};

use crate::{DirectoryEntry, EntryKind, FilePath};

/// Directory that holds GitHub Actions workflow definitions.
pub const DEFAULT_WORKFLOW_DIR: &str = ".github/workflows";

/// Returns [`DEFAULT_WORKFLOW_DIR`] as a path.
pub fn default_workflow_dir() -> FilePath {
    FilePath::from_static(DEFAULT_WORKFLOW_DIR)
}

/// Substring a file name must contain to be toggled.
pub const DEFAULT_NAME_FILTER: &str = "workflow";

/// Decides which directory entries are workflow files to toggle.
///
/// An entry matches when it is a regular file and its name contains the
/// configured substring (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPredicate {
    name_contains: String,
}

impl SelectionPredicate {
    pub fn new(name_contains: impl Into<String>) -> Self {
        Self {
            name_contains: name_contains.into(),
        }
    }

    pub fn name_contains(&self) -> &str {
        &self.name_contains
    }

    /// Returns `true` if a file called `name` should be toggled.
    pub fn matches_name(&self, name: &str) -> bool {
        name.contains(&self.name_contains)
    }

    /// Returns `true` if `entry` is a file whose name matches.
    pub fn matches(&self, entry: &DirectoryEntry) -> bool {
        entry.kind == EntryKind::File && self.matches_name(&entry.name)
    }
}

impl Default for SelectionPredicate {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_FILTER)
    }
}
