//! GitHub REST client implementing the store ports.

use std::time::SystemTime;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use toggle::{
    ContentStore, DirectoryEntry, EntryKind, FileContent, FilePath, OrgName, RemoteFile,
    RepositoryDirectory, RepositoryPage, RepositoryRef, RepositorySummary, RepoName, RetryPolicy,
    StoreError, VersionToken,
};
use tracing::{debug, instrument, warn};

use crate::errors::{classify, transport_error, RequestContext};
use crate::wire::{
    has_next_page, ApiErrorBody, ContentEntry, FileBody, PutFileRequest, PutFileResponse, RepoItem,
};
use crate::{codec, GithubConfig, GithubError, API_VERSION};

/// Client for the subset of the GitHub REST API the sweep needs.
///
/// Authentication and API-version headers are fixed when the client is
/// built; nothing about a request depends on mutable state.
pub struct GithubClient {
    http: Client,
    config: GithubConfig,
}

impl GithubClient {
    /// # Errors
    ///
    /// - [`GithubError::InvalidToken`] if the token is empty or cannot be
    ///   sent as a header value.
    /// - [`GithubError::Client`] if the HTTP client cannot be built.
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        if config.token.trim().is_empty() {
            return Err(GithubError::InvalidToken("token is empty".to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| GithubError::InvalidToken("token contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("wf-toggle")),
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn contents_url(&self, repo: &RepositoryRef, path: &FilePath) -> Url {
        self.endpoint(
            ["repos", repo.org.as_str(), repo.name.as_str(), "contents"]
                .into_iter()
                .chain(path.as_str().split('/').filter(|s| !s.is_empty())),
        )
    }

    /// Sends the request built by `build`, retrying failures according to
    /// the configured [`RetryConfig`](crate::RetryConfig).
    ///
    /// Rate-limit responses are always retried: GitHub rejected the request
    /// before acting on it. Other transient failures are retried only when
    /// `retry_transient` is set, because a 5xx or timeout on a write leaves
    /// open whether it was applied.
    async fn execute<F>(
        &self,
        ctx: &RequestContext,
        retry_transient: bool,
        build: F,
    ) -> Result<Response, StoreError>
    where
        F: Fn() -> RequestBuilder,
    {
        let retry = &self.config.retry;
        let mut attempt = 0;
        loop {
            let err = match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => error_from_response(response, ctx).await,
                Err(e) => transport_error(e),
            };

            if let StoreError::RateLimited {
                message,
                retry_after: Some(wait),
            } = &err
            {
                if *wait > retry.max_rate_limit_wait {
                    return Err(StoreError::RateLimitExhausted {
                        message: message.clone(),
                        reset_in: *wait,
                    });
                }
            }

            let may_retry = match &err {
                StoreError::RateLimited { .. } => true,
                StoreError::Transient { .. } => retry_transient,
                _ => false,
            };
            match err.retry_policy() {
                RetryPolicy::Retryable { after } if may_retry && attempt < retry.max_retries => {
                    let delay = retry.delay_for(attempt, after);
                    warn!(
                        resource = %ctx.resource,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                _ => return Err(err),
            }
        }
    }

    /// Resolves a write whose outcome is unknown by reading the file back.
    ///
    /// If the stored content is what we sent, the write landed and its blob
    /// sha is the new version. Otherwise the original error stands.
    async fn confirm_write(
        &self,
        repo: &RepositoryRef,
        path: &FilePath,
        content: &FileContent,
        err: StoreError,
    ) -> Result<VersionToken, StoreError> {
        match self.fetch(repo, path).await {
            Ok(current) if current.content == *content => {
                warn!(
                    error = %err,
                    version = %current.version,
                    "write outcome was unknown; stored content matches"
                );
                Ok(current.version)
            }
            _ => Err(err),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        ctx: &RequestContext,
    ) -> Result<(T, HeaderMap), StoreError> {
        let response = self
            .execute(ctx, true, || self.http.get(url.clone()))
            .await?;
        let headers = response.headers().clone();
        let body = response.json::<T>().await.map_err(|e| StoreError::Decode {
            message: format!("{}: {e}", ctx.resource),
        })?;
        Ok((body, headers))
    }
}

async fn error_from_response(response: Response, ctx: &RequestContext) -> StoreError {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
    let message = if body.message.is_empty() {
        status.canonical_reason().unwrap_or("no message").to_string()
    } else {
        body.message
    };
    classify(status, &headers, message, ctx, SystemTime::now())
}

fn entry_kind(kind: &str) -> Option<EntryKind> {
    match kind {
        "file" => Some(EntryKind::File),
        "dir" => Some(EntryKind::Dir),
        "symlink" => Some(EntryKind::Symlink),
        "submodule" => Some(EntryKind::Submodule),
        _ => None,
    }
}

fn invalid(field: &str, resource: &str) -> StoreError {
    StoreError::Decode {
        message: format!("empty {field} in response for {resource}"),
    }
}

#[async_trait]
impl ContentStore for GithubClient {
    #[instrument(skip(self, repo, path), fields(repo = %repo, path = %path))]
    async fn fetch(&self, repo: &RepositoryRef, path: &FilePath) -> Result<RemoteFile, StoreError> {
        let ctx = RequestContext::read(format!("{repo}/{path}"));
        let (body, _) = self
            .get_json::<FileBody>(self.contents_url(repo, path), &ctx)
            .await?;

        if body.encoding != "base64" {
            return Err(StoreError::Decode {
                message: format!(
                    "{}: unsupported content encoding '{}' (file too large for the contents API?)",
                    ctx.resource, body.encoding
                ),
            });
        }
        let content = codec::decode(&body.content)?;
        let version = VersionToken::new(body.sha).ok_or_else(|| invalid("sha", &ctx.resource))?;
        debug!(%version, bytes = content.len(), "fetched");

        Ok(RemoteFile {
            path: FilePath::new(body.path).unwrap_or_else(|| path.clone()),
            content,
            version,
        })
    }

    #[instrument(
        skip(self, repo, path, content, expected, message),
        fields(repo = %repo, path = %path, expected = %expected)
    )]
    async fn write(
        &self,
        repo: &RepositoryRef,
        path: &FilePath,
        content: &FileContent,
        expected: &VersionToken,
        message: &str,
    ) -> Result<VersionToken, StoreError> {
        let ctx = RequestContext::write(format!("{repo}/{path}"), path.clone(), expected.clone());
        let url = self.contents_url(repo, path);
        let body = PutFileRequest {
            message,
            content: codec::encode(content),
            sha: expected.as_str(),
        };

        let response = match self
            .execute(&ctx, false, || self.http.put(url.clone()).json(&body))
            .await
        {
            Ok(response) => response,
            Err(err @ StoreError::Transient { .. }) => {
                return self.confirm_write(repo, path, content, err).await;
            }
            Err(err) => return Err(err),
        };
        let created: PutFileResponse = response.json().await.map_err(|e| StoreError::Decode {
            message: format!("{}: {e}", ctx.resource),
        })?;
        let version =
            VersionToken::new(created.content.sha).ok_or_else(|| invalid("sha", &ctx.resource))?;
        debug!(%version, "written");
        Ok(version)
    }
}

#[async_trait]
impl RepositoryDirectory for GithubClient {
    #[instrument(skip(self))]
    async fn list_repositories_page(
        &self,
        org: &OrgName,
        page: u32,
        per_page: u32,
    ) -> Result<RepositoryPage, StoreError> {
        let ctx = RequestContext::read(format!("orgs/{org}/repos?page={page}"));
        let mut url = self.endpoint(["orgs", org.as_str(), "repos"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());

        let (items, headers) = self.get_json::<Vec<RepoItem>>(url, &ctx).await?;
        let repositories = items
            .into_iter()
            .filter_map(|item| {
                Some(RepositorySummary {
                    name: RepoName::new(item.name)?,
                    archived: item.archived,
                })
            })
            .collect();

        Ok(RepositoryPage {
            repositories,
            has_next: has_next_page(&headers),
        })
    }

    #[instrument(skip(self, repo, dir), fields(repo = %repo, dir = %dir))]
    async fn list_directory(
        &self,
        repo: &RepositoryRef,
        dir: &FilePath,
    ) -> Result<Vec<DirectoryEntry>, StoreError> {
        let ctx = RequestContext::read(format!("{repo}/{dir}"));
        let entries = match self
            .get_json::<Vec<ContentEntry>>(self.contents_url(repo, dir), &ctx)
            .await
        {
            Ok((entries, _)) => entries,
            Err(StoreError::NotFound { .. }) => {
                debug!("directory does not exist");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let kind = entry_kind(&entry.kind)?;
                Some(DirectoryEntry {
                    path: FilePath::new(entry.path)?,
                    name: entry.name,
                    kind,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GithubClient {
        let config = GithubConfig::new("t").with_base_url(base).unwrap();
        GithubClient::new(config).unwrap()
    }

    fn repo() -> RepositoryRef {
        RepositoryRef::new(
            OrgName::new("acme").unwrap(),
            RepoName::new("svc-a").unwrap(),
        )
    }

    #[test]
    fn contents_url_keeps_path_separators() {
        let c = client("https://api.github.com");
        let url = c.contents_url(&repo(), &FilePath::new(".github/workflows/ci.yml").unwrap());
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/svc-a/contents/.github/workflows/ci.yml"
        );
    }

    #[test]
    fn contents_url_under_enterprise_prefix() {
        let c = client("https://github.example.com/api/v3/");
        let url = c.contents_url(&repo(), &FilePath::new(".github/workflows").unwrap());
        assert_eq!(
            url.as_str(),
            "https://github.example.com/api/v3/repos/acme/svc-a/contents/.github/workflows"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let c = client("https://api.github.com");
        let path = FilePath::new(".github/workflows/my workflow.yml").unwrap();
        let url = c.contents_url(&repo(), &path);
        assert!(url.as_str().ends_with("/contents/.github/workflows/my%20workflow.yml"));
    }

    #[test]
    fn rejects_empty_token() {
        assert!(matches!(
            GithubClient::new(GithubConfig::new("  ")),
            Err(GithubError::InvalidToken(_))
        ));
    }

    #[test]
    fn rejects_token_with_newline() {
        assert!(matches!(
            GithubClient::new(GithubConfig::new("abc\ndef")),
            Err(GithubError::InvalidToken(_))
        ));
    }

    #[test]
    fn entry_kinds() {
        assert_eq!(entry_kind("file"), Some(EntryKind::File));
        assert_eq!(entry_kind("dir"), Some(EntryKind::Dir));
        assert_eq!(entry_kind("weird"), None);
    }
}
