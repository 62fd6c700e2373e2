//! Core domain for toggling GitHub Actions workflows across an organization.
//!
//! This crate contains the identifiers, value types, error taxonomy and the
//! comment-marker transform. It also defines the port traits through which the
//! sweep reads and writes remote files. Infrastructure crates implement those
//! traits; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`OrgName`, `RepoName`, `FilePath`, `RunId`) |
//! | [`types`] | Value types (`RemoteFile`, `VersionToken`, `FileContent`, listings) |
//! | [`errors`] | `StoreError` taxonomy and `RetryPolicy` |
//! | [`marker`] | Disable/enable content transform |
//! | [`selection`] | Workflow file selection predicate |
//! | [`ports`] | `ContentStore` and `RepositoryDirectory` traits |

pub mod errors;
pub mod identifiers;
pub mod marker;
pub mod ports;
pub mod selection;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{RetryPolicy, StoreError};
pub use identifiers::{FilePath, OrgName, RepoName, RepositoryRef, RunId};
pub use marker::{Transform, COMMENT_MARKER};
pub use ports::{ContentStore, RepositoryDirectory};
pub use selection::{
    default_workflow_dir, SelectionPredicate, DEFAULT_NAME_FILTER, DEFAULT_WORKFLOW_DIR,
};
pub use types::{
    DirectoryEntry, EntryKind, FileContent, RemoteFile, RepositoryPage, RepositorySummary,
    Timestamp, ToggleDirection, VersionToken,
};
