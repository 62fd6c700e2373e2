//! Immutable client configuration.

use std::time::Duration;

use reqwest::Url;

use crate::{GithubError, RetryConfig};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

/// Everything [`GithubClient`](crate::GithubClient) needs, fixed at
/// construction.
#[derive(Clone)]
pub struct GithubConfig {
    /// API root; GitHub Enterprise Server uses `https://<host>/api/v3`.
    pub base_url: Url,
    pub token: String,
    pub user_agent: String,
    /// Upper bound on a single HTTP exchange.
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl GithubConfig {
    /// Configuration for the public API with default timeout and retries.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            token: token.into(),
            user_agent: concat!("wf-toggle/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    /// # Errors
    ///
    /// Returns [`GithubError::InvalidBaseUrl`] if `url` does not parse or is
    /// not an http(s) URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, GithubError> {
        let parsed = Url::parse(url).map_err(|e| GithubError::InvalidBaseUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GithubError::InvalidBaseUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        self.base_url = parsed;
        Ok(self)
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}
