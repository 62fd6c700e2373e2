//! Newtype domain identifiers.
//!
//! Organization names, repository names and file paths are all strings on the
//! wire. Wrapping each in its own type keeps an [`OrgName`] from being passed
//! where a [`RepoName`] is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or only whitespace.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// A GitHub organization login (e.g. `"rust-lang"`).
    OrgName
}

string_id! {
    /// A repository name within an organization (e.g. `"svc-a"`).
    RepoName
}

string_id! {
    /// A path relative to the repository root (e.g. `".github/workflows/ci.yml"`).
    FilePath
}

impl FilePath {
    /// Wraps a literal known to be non-empty.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    /// Returns the final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

// ---------------------------------------------------------------------------

/// Identifies a repository by organization and name.
///
/// Produced by repository enumeration; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub org: OrgName,
    pub name: RepoName,
}

impl RepositoryRef {
    pub fn new(org: OrgName, name: RepoName) -> Self {
        Self { org, name }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

// ---------------------------------------------------------------------------

/// Identifies a single sweep over an organization.
///
/// Generated fresh for every CLI invocation and attached to the root span so
/// every log line from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(OrgName::new("").is_none());
        assert!(RepoName::new("   ").is_none());
        assert!(FilePath::new("").is_none());
    }

    #[test]
    fn repository_ref_displays_as_owner_slash_name() {
        let repo = RepositoryRef::new(
            OrgName::new("acme").unwrap(),
            RepoName::new("svc-a").unwrap(),
        );
        assert_eq!(repo.to_string(), "acme/svc-a");
    }

    #[test]
    fn file_name_is_last_component() {
        let path = FilePath::new(".github/workflows/ci-workflow.yml").unwrap();
        assert_eq!(path.file_name(), "ci-workflow.yml");

        let bare = FilePath::new("README.md").unwrap();
        assert_eq!(bare.file_name(), "README.md");
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new_random(), RunId::new_random());
    }
}
