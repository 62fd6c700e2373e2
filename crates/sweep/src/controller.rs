//! Read-transform-write of a single workflow file.
//!
//! Every write presents the version token obtained by the read in the same
//! call, so a concurrent edit between the two surfaces as
//! [`StoreError::Conflict`] instead of being overwritten. Conflicts are not
//! retried: the other actor's change wins and the file is reported as failed.

use std::sync::Arc;

use toggle::{
    marker, ContentStore, FilePath, RepositoryRef, StoreError, ToggleDirection, Transform,
};
use tracing::{debug, info, instrument};

use crate::FileOutcome;

pub struct ToggleController {
    store: Arc<dyn ContentStore>,
    commit_message: String,
    dry_run: bool,
}

impl ToggleController {
    pub fn new(
        store: Arc<dyn ContentStore>,
        commit_message: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            commit_message: commit_message.into(),
            dry_run,
        }
    }

    /// Comments out `path` unless it is already disabled.
    pub async fn disable(
        &self,
        repo: &RepositoryRef,
        path: &FilePath,
    ) -> Result<FileOutcome, StoreError> {
        self.apply(ToggleDirection::Disable, repo, path).await
    }

    /// Strips the disable marker from `path` unless it is already active.
    pub async fn enable(
        &self,
        repo: &RepositoryRef,
        path: &FilePath,
    ) -> Result<FileOutcome, StoreError> {
        self.apply(ToggleDirection::Enable, repo, path).await
    }

    #[instrument(
        skip(self, repo, path),
        fields(repo = %repo, path = %path, dry_run = self.dry_run)
    )]
    pub async fn apply(
        &self,
        direction: ToggleDirection,
        repo: &RepositoryRef,
        path: &FilePath,
    ) -> Result<FileOutcome, StoreError> {
        let file = self.store.fetch(repo, path).await?;

        let transform = match direction {
            ToggleDirection::Disable => marker::disable(&file.content),
            ToggleDirection::Enable => marker::enable(&file.content),
        };

        let new_content = match transform {
            Transform::Unchanged => {
                debug!(version = %file.version, "already in requested state");
                return Ok(match direction {
                    ToggleDirection::Disable => FileOutcome::AlreadyDisabled,
                    ToggleDirection::Enable => FileOutcome::AlreadyEnabled,
                });
            }
            Transform::Changed(content) => content,
        };

        if self.dry_run {
            info!("dry run, skipping write");
            return Ok(match direction {
                ToggleDirection::Disable => FileOutcome::WouldDisable,
                ToggleDirection::Enable => FileOutcome::WouldEnable,
            });
        }

        let version = self
            .store
            .write(repo, path, &new_content, &file.version, &self.commit_message)
            .await?;
        info!(previous = %file.version, version = %version, "workflow {direction}d");

        Ok(match direction {
            ToggleDirection::Disable => FileOutcome::Disabled { version },
            ToggleDirection::Enable => FileOutcome::Enabled { version },
        })
    }
}
