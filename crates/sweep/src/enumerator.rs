//! Enumeration of an organization's repositories and their workflow files.

use std::collections::HashSet;
use std::sync::Arc;

use toggle::{
    DirectoryEntry, FilePath, OrgName, RepositoryDirectory, RepositoryRef, SelectionPredicate,
    StoreError,
};
use tracing::{debug, instrument};

/// A repository produced by [`RepositoryEnumerator::list_repositories`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRepository {
    pub repo: RepositoryRef,
    pub archived: bool,
}

pub struct RepositoryEnumerator {
    directory: Arc<dyn RepositoryDirectory>,
    workflow_dir: FilePath,
    predicate: SelectionPredicate,
    page_size: u32,
}

impl RepositoryEnumerator {
    pub fn new(
        directory: Arc<dyn RepositoryDirectory>,
        workflow_dir: FilePath,
        predicate: SelectionPredicate,
        page_size: u32,
    ) -> Self {
        Self {
            directory,
            workflow_dir,
            predicate,
            page_size,
        }
    }

    /// Pages through every repository of `org`, starting from page 1.
    ///
    /// Stops on the store's "no next page" hint, or, without a hint, on the
    /// first page shorter than the page size. Each call starts over; no state
    /// is kept between calls. Names repeated across pages (a repository
    /// created mid-listing shifts later pages) are returned once.
    #[instrument(skip(self))]
    pub async fn list_repositories(
        &self,
        org: &OrgName,
    ) -> Result<Vec<ListedRepository>, StoreError> {
        let mut seen = HashSet::new();
        let mut listed = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .directory
                .list_repositories_page(org, page, self.page_size)
                .await?;
            let count = batch.repositories.len();
            debug!(page, count, has_next = ?batch.has_next, "repository page");

            for summary in batch.repositories {
                if seen.insert(summary.name.clone()) {
                    listed.push(ListedRepository {
                        repo: RepositoryRef::new(org.clone(), summary.name),
                        archived: summary.archived,
                    });
                }
            }

            let more = batch
                .has_next
                .unwrap_or(count >= self.page_size as usize);
            if !more || count == 0 {
                break;
            }
            page += 1;
        }

        Ok(listed)
    }

    /// Lists the files under the workflow directory that match the predicate.
    ///
    /// A repository without a workflow directory yields an empty list.
    #[instrument(skip(self, repo), fields(repo = %repo))]
    pub async fn list_workflow_files(
        &self,
        repo: &RepositoryRef,
    ) -> Result<Vec<DirectoryEntry>, StoreError> {
        let entries = self
            .directory
            .list_directory(repo, &self.workflow_dir)
            .await?;
        let total = entries.len();
        let selected: Vec<DirectoryEntry> = entries
            .into_iter()
            .filter(|entry| self.predicate.matches(entry))
            .collect();
        debug!(total, selected = selected.len(), "workflow directory listed");
        Ok(selected)
    }
}
