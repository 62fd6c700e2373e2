//! Construction-time errors and HTTP status classification.
//!
//! Request-time failures are reported as [`toggle::StoreError`]; this module
//! owns the mapping from GitHub's status codes and rate-limit headers onto
//! that taxonomy.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use thiserror::Error;
use toggle::{FilePath, StoreError, VersionToken};

/// Errors raised while building a [`GithubClient`](crate::GithubClient).
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// What a request was doing, used to phrase the resulting error.
#[derive(Debug, Clone)]
pub(crate) struct RequestContext {
    pub resource: String,
    /// Set for conditional writes so a 409 can name the stale token.
    pub conditional: Option<(FilePath, VersionToken)>,
}

impl RequestContext {
    pub fn read(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            conditional: None,
        }
    }

    pub fn write(resource: impl Into<String>, path: FilePath, expected: VersionToken) -> Self {
        Self {
            resource: resource.into(),
            conditional: Some((path, expected)),
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Delay GitHub asks for, from `Retry-After` (seconds) or
/// `x-ratelimit-reset` (epoch seconds).
pub(crate) fn requested_delay(headers: &HeaderMap, now: SystemTime) -> Option<Duration> {
    if let Some(secs) = header_u64(headers, RETRY_AFTER.as_str()) {
        return Some(Duration::from_secs(secs));
    }
    let reset = header_u64(headers, "x-ratelimit-reset")?;
    let now = now.duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(Duration::from_secs(reset.saturating_sub(now)))
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap, message: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && (header_u64(headers, "x-ratelimit-remaining") == Some(0)
                || message.to_ascii_lowercase().contains("rate limit")))
}

/// Maps a non-success response onto [`StoreError`].
pub(crate) fn classify(
    status: StatusCode,
    headers: &HeaderMap,
    message: String,
    ctx: &RequestContext,
    now: SystemTime,
) -> StoreError {
    if is_rate_limited(status, headers, &message) {
        return StoreError::RateLimited {
            message,
            retry_after: requested_delay(headers, now),
        };
    }

    match status {
        StatusCode::UNAUTHORIZED => StoreError::Auth { message },
        StatusCode::FORBIDDEN => StoreError::Forbidden { message },
        StatusCode::NOT_FOUND => StoreError::NotFound {
            resource: ctx.resource.clone(),
        },
        StatusCode::CONFLICT => match &ctx.conditional {
            Some((path, expected)) => StoreError::Conflict {
                path: path.clone(),
                expected: expected.clone(),
            },
            None => StoreError::Rejected { message },
        },
        StatusCode::UNPROCESSABLE_ENTITY => StoreError::Rejected { message },
        s if s.is_server_error() => StoreError::Transient {
            message: format!("HTTP {}: {message}", s.as_u16()),
        },
        s => StoreError::UnexpectedStatus {
            status: s.as_u16(),
            message,
        },
    }
}

/// Maps a transport-level failure (no response) onto [`StoreError`].
pub(crate) fn transport_error(err: reqwest::Error) -> StoreError {
    if err.is_decode() {
        StoreError::Decode {
            message: err.to_string(),
        }
    } else if err.is_timeout() {
        StoreError::Transient {
            message: format!("request timed out: {err}"),
        }
    } else {
        StoreError::Transient {
            message: err.to_string(),
        }
    }
}
