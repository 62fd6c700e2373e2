//! Port traits implemented by infrastructure crates.
//!
//! The sweep logic only ever talks to these traits. The `github` crate
//! supplies the production implementation; tests supply in-memory fakes.

use async_trait::async_trait;

use crate::{
    DirectoryEntry, FileContent, FilePath, OrgName, RemoteFile, RepositoryPage, RepositoryRef,
    StoreError, VersionToken,
};

/// Versioned read and conditional write of individual files.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Reads the current content and version token of `path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the path does not exist.
    /// - [`StoreError::Auth`] if the credential is rejected.
    /// - [`StoreError::Transient`] on server or network failure.
    async fn fetch(&self, repo: &RepositoryRef, path: &FilePath) -> Result<RemoteFile, StoreError>;

    /// Replaces the content of `path`, provided its current version token is
    /// still `expected`. Creates a new commit and returns the new token.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Conflict`] if `expected` is stale; the stored content
    ///   is left untouched.
    /// - Any of the errors [`ContentStore::fetch`] can return.
    async fn write(
        &self,
        repo: &RepositoryRef,
        path: &FilePath,
        content: &FileContent,
        expected: &VersionToken,
        message: &str,
    ) -> Result<VersionToken, StoreError>;
}

/// Listing of repositories and directory contents.
#[async_trait]
pub trait RepositoryDirectory: Send + Sync {
    /// Returns one page (1-based) of the organization's repositories.
    async fn list_repositories_page(
        &self,
        org: &OrgName,
        page: u32,
        per_page: u32,
    ) -> Result<RepositoryPage, StoreError>;

    /// Lists the entries directly under `dir`.
    ///
    /// Returns an empty list, not an error, when `dir` does not exist.
    async fn list_directory(
        &self,
        repo: &RepositoryRef,
        dir: &FilePath,
    ) -> Result<Vec<DirectoryEntry>, StoreError>;
}
