//! Request and response bodies of the GitHub REST endpoints we call.

use reqwest::header::{HeaderMap, LINK};
use serde::{Deserialize, Serialize};

/// Entry of `GET /orgs/{org}/repos`.
#[derive(Debug, Deserialize)]
pub(crate) struct RepoItem {
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

/// Entry of `GET /repos/{owner}/{repo}/contents/{dir}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of `GET /repos/{owner}/{repo}/contents/{file}`.
#[derive(Debug, Deserialize)]
pub(crate) struct FileBody {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{file}`.
#[derive(Debug, Serialize)]
pub(crate) struct PutFileRequest<'a> {
    pub message: &'a str,
    pub content: String,
    pub sha: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PutFileResponse {
    pub content: PutFileContent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PutFileContent {
    pub sha: String,
}

/// Error body GitHub returns alongside non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Whether the `Link` header advertises a next page.
///
/// `None` when there is no `Link` header at all, which GitHub also does for a
/// listing that fits on one page; callers fall back to the short-page rule.
pub(crate) fn has_next_page(headers: &HeaderMap) -> Option<bool> {
    let link = headers.get(LINK)?.to_str().ok()?;
    Some(
        link.split(',')
            .any(|part| part.split(';').skip(1).any(|p| p.trim() == "rel=\"next\"")),
    )
}
