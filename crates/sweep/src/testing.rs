//! In-memory store used by the sweep tests.
//!
//! Behaves like the GitHub contents API as far as the ports are concerned:
//! every write bumps the file's version token, a stale token is refused with
//! [`StoreError::Conflict`], and a missing workflow directory lists as empty.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use toggle::{
    ContentStore, DirectoryEntry, EntryKind, FileContent, FilePath, OrgName, RemoteFile,
    RepoName, RepositoryDirectory, RepositoryPage, RepositoryRef, RepositorySummary, StoreError,
    VersionToken,
};

#[derive(Debug, Clone)]
struct StoredFile {
    content: Vec<u8>,
    version: u64,
}

#[derive(Default)]
struct State {
    repos: Vec<RepositorySummary>,
    files: BTreeMap<(String, String), StoredFile>,
    next_version: u64,
    page_requests: Vec<u32>,
    writes: usize,
    fail_fetch: HashMap<(String, String), StoreError>,
    fail_listing: HashMap<String, StoreError>,
    fail_repositories: Option<StoreError>,
    race_after_fetch: HashSet<(String, String)>,
}

#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<State>,
    /// Report GitHub-style next-page hints instead of relying on short pages.
    pub(crate) link_hints: bool,
}

pub(crate) fn org() -> OrgName {
    OrgName::new("acme").unwrap()
}

pub(crate) fn repo(name: &str) -> RepositoryRef {
    RepositoryRef::new(org(), RepoName::new(name).unwrap())
}

pub(crate) fn workflow(name: &str) -> FilePath {
    FilePath::new(format!(".github/workflows/{name}")).unwrap()
}

fn token(version: u64) -> VersionToken {
    VersionToken::new(format!("sha-{version}")).unwrap()
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_link_hints() -> Self {
        Self {
            link_hints: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub(crate) fn add_repo(&self, name: &str) {
        self.add_repo_with(name, false);
    }

    pub(crate) fn add_repo_with(&self, name: &str, archived: bool) {
        self.lock().repos.push(RepositorySummary {
            name: RepoName::new(name).unwrap(),
            archived,
        });
    }

    pub(crate) fn put_file(&self, repo: &str, path: &str, content: &str) {
        let mut state = self.lock();
        state.next_version += 1;
        let version = state.next_version;
        state.files.insert(
            (repo.to_string(), path.to_string()),
            StoredFile {
                content: content.as_bytes().to_vec(),
                version,
            },
        );
    }

    pub(crate) fn content(&self, repo: &str, path: &str) -> Option<String> {
        self.lock()
            .files
            .get(&(repo.to_string(), path.to_string()))
            .map(|f| String::from_utf8(f.content.clone()).unwrap())
    }

    pub(crate) fn version(&self, repo: &str, path: &str) -> Option<VersionToken> {
        self.lock()
            .files
            .get(&(repo.to_string(), path.to_string()))
            .map(|f| token(f.version))
    }

    pub(crate) fn page_requests(&self) -> Vec<u32> {
        self.lock().page_requests.clone()
    }

    pub(crate) fn writes(&self) -> usize {
        self.lock().writes
    }

    pub(crate) fn fail_fetch(&self, repo: &str, path: &str, error: StoreError) {
        self.lock()
            .fail_fetch
            .insert((repo.to_string(), path.to_string()), error);
    }

    pub(crate) fn fail_listing(&self, repo: &str, error: StoreError) {
        self.lock().fail_listing.insert(repo.to_string(), error);
    }

    /// Makes every repository page request fail with `error`.
    pub(crate) fn fail_repositories(&self, error: StoreError) {
        self.lock().fail_repositories = Some(error);
    }

    /// Simulates another actor committing to `path` right after our read.
    pub(crate) fn race_after_fetch(&self, repo: &str, path: &str) {
        self.lock()
            .race_after_fetch
            .insert((repo.to_string(), path.to_string()));
    }
}

#[async_trait]
impl ContentStore for FakeStore {
    async fn fetch(&self, repo: &RepositoryRef, path: &FilePath) -> Result<RemoteFile, StoreError> {
        let key = (repo.name.to_string(), path.to_string());
        let mut state = self.lock();
        if let Some(err) = state.fail_fetch.get(&key) {
            return Err(err.clone());
        }

        let stored = state
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                resource: format!("{repo}/{path}"),
            })?;
        let file = RemoteFile {
            path: path.clone(),
            content: FileContent::new(stored.content.clone()),
            version: token(stored.version),
        };

        if state.race_after_fetch.remove(&key) {
            state.next_version += 1;
            let version = state.next_version;
            if let Some(f) = state.files.get_mut(&key) {
                f.content = b"name: CI (edited concurrently)\n".to_vec();
                f.version = version;
            }
        }
        Ok(file)
    }

    async fn write(
        &self,
        repo: &RepositoryRef,
        path: &FilePath,
        content: &FileContent,
        expected: &VersionToken,
        _message: &str,
    ) -> Result<VersionToken, StoreError> {
        let key = (repo.name.to_string(), path.to_string());
        let mut state = self.lock();
        let current = state
            .files
            .get(&key)
            .map(|f| token(f.version))
            .ok_or_else(|| StoreError::NotFound {
                resource: format!("{repo}/{path}"),
            })?;
        if &current != expected {
            return Err(StoreError::Conflict {
                path: path.clone(),
                expected: expected.clone(),
            });
        }

        state.next_version += 1;
        state.writes += 1;
        let version = state.next_version;
        if let Some(f) = state.files.get_mut(&key) {
            f.content = content.as_bytes().to_vec();
            f.version = version;
        }
        Ok(token(version))
    }
}

#[async_trait]
impl RepositoryDirectory for FakeStore {
    async fn list_repositories_page(
        &self,
        _org: &OrgName,
        page: u32,
        per_page: u32,
    ) -> Result<RepositoryPage, StoreError> {
        let mut state = self.lock();
        state.page_requests.push(page);
        if let Some(err) = &state.fail_repositories {
            return Err(err.clone());
        }

        let start = ((page - 1) * per_page) as usize;
        let end = (start + per_page as usize).min(state.repos.len());
        let repositories = state.repos.get(start..end).unwrap_or_default().to_vec();
        let has_next = self.link_hints.then_some(end < state.repos.len());
        Ok(RepositoryPage {
            repositories,
            has_next,
        })
    }

    async fn list_directory(
        &self,
        repo: &RepositoryRef,
        dir: &FilePath,
    ) -> Result<Vec<DirectoryEntry>, StoreError> {
        let state = self.lock();
        if let Some(err) = state.fail_listing.get(repo.name.as_str()) {
            return Err(err.clone());
        }

        let prefix = format!("{dir}/");
        Ok(state
            .files
            .keys()
            .filter(|(r, p)| r == repo.name.as_str() && p.starts_with(&prefix))
            .filter_map(|(_, p)| {
                let name = &p[prefix.len()..];
                (!name.contains('/')).then(|| DirectoryEntry {
                    name: name.to_string(),
                    path: FilePath::new(p.clone()).unwrap(),
                    kind: EntryKind::File,
                })
            })
            .collect())
    }
}
