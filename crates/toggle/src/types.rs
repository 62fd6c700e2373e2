//! Shared value types for the workflow toggle domain.
//!
//! [`RemoteFile`] is the only entity with an invariant worth stating: its
//! [`VersionToken`] is the token a conditional write must present. Files are
//! fetched fresh for every toggle operation and never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FilePath, RepoName};

// ---------------------------------------------------------------------------
// File content and versions
// ---------------------------------------------------------------------------

/// Opaque identifier of the current state of a remote file (the blob SHA on
/// GitHub).
///
/// A write that presents a token other than the one currently stored must be
/// refused by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionToken(String);

impl VersionToken {
    /// Creates a token, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Raw file bytes.
///
/// Content is never assumed to be UTF-8; transformations operate on bytes so
/// a round trip is byte-exact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileContent(Vec<u8>);

impl FileContent {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for FileContent {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<String> for FileContent {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

// ---------------------------------------------------------------------------

/// A versioned file at a path within a repository, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: FilePath,
    pub content: FileContent,
    pub version: VersionToken,
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Kind of an entry returned by a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: FilePath,
    pub kind: EntryKind,
}

/// One repository as reported by an organization listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    pub name: RepoName,
    /// Archived repositories are read-only; writes to them always fail.
    pub archived: bool,
}

/// One page of an organization's repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepositoryPage {
    pub repositories: Vec<RepositorySummary>,

    /// Whether the store knows of a further page.
    ///
    /// `None` when the store gives no hint; callers then fall back to treating
    /// a short page as the last one.
    pub has_next: Option<bool>,
}

// ---------------------------------------------------------------------------
// Toggle direction
// ---------------------------------------------------------------------------

/// Which way a sweep moves workflow files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleDirection {
    Disable,
    Enable,
}

impl ToggleDirection {
    /// Commit message used when the operator does not supply one.
    pub fn default_commit_message(self) -> &'static str {
        match self {
            Self::Disable => "Disable workflow",
            Self::Enable => "Enable workflow",
        }
    }
}

impl std::fmt::Display for ToggleDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disable => write!(f, "disable"),
            Self::Enable => write!(f, "enable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
