//! Options for one sweep, built by the CLI and passed in at construction.

use toggle::{default_workflow_dir, FilePath, RepoName, SelectionPredicate, ToggleDirection};

use crate::SweepError;

/// Largest page size the GitHub repository listing accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    pub direction: ToggleDirection,

    /// Perform every read and decision but issue no writes.
    pub dry_run: bool,

    /// Directory listed for candidate workflow files.
    pub workflow_dir: FilePath,

    pub predicate: SelectionPredicate,

    /// Commit message for every write. `None` uses the direction's default.
    pub commit_message: Option<String>,

    /// Restrict the sweep to these repositories. Empty means every repository.
    pub only_repos: Vec<RepoName>,

    pub page_size: u32,
}

impl SweepOptions {
    /// Options with the stock directory, predicate and page size.
    pub fn new(direction: ToggleDirection) -> Self {
        Self {
            direction,
            dry_run: false,
            workflow_dir: default_workflow_dir(),
            predicate: SelectionPredicate::default(),
            commit_message: None,
            only_repos: Vec::new(),
            page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn commit_message(&self) -> &str {
        self.commit_message
            .as_deref()
            .unwrap_or_else(|| self.direction.default_commit_message())
    }

    /// Returns `true` if `name` passes the repository filter.
    pub fn includes(&self, name: &RepoName) -> bool {
        self.only_repos.is_empty() || self.only_repos.contains(name)
    }

    /// # Errors
    ///
    /// Returns [`SweepError::InvalidOptions`] for a page size outside
    /// `1..=100`, an empty name filter, or a blank commit message.
    pub fn validate(&self) -> Result<(), SweepError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(SweepError::InvalidOptions {
                message: format!(
                    "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                    self.page_size
                ),
            });
        }
        if self.predicate.name_contains().is_empty() {
            return Err(SweepError::InvalidOptions {
                message: "workflow name filter must not be empty".to_string(),
            });
        }
        if matches!(&self.commit_message, Some(m) if m.trim().is_empty()) {
            return Err(SweepError::InvalidOptions {
                message: "commit message must not be blank".to_string(),
            });
        }
        Ok(())
    }
}
