//! Store error taxonomy and retry-policy types.
//!
//! [`StoreError`] is what every port in [`crate::ports`] reports. The variant
//! decides what the sweep does next: [`StoreError::Auth`] and
//! [`StoreError::RateLimitExhausted`] abort the run, [`StoreError::Transient`]
//! is retried by the adapter before it surfaces, and everything else skips the
//! current file and carries on.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FilePath, VersionToken};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// ## Rules
///
/// - `Retryable` errors: server errors, network failures, timeouts, rate-limit
///   responses.
/// - `NonRetryable` errors: rejected credentials, missing files, version
///   conflicts, validation failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt, derived from
        /// `Retry-After` or `x-ratelimit-reset`. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors reported by the remote file store and repository directory ports.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The credential was missing or rejected. Fatal for the whole run.
    #[error("Authentication rejected: {message}")]
    Auth { message: String },

    /// The credential is valid but lacks permission for this resource.
    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    /// The repository or path does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The expected version token no longer matches the stored one; another
    /// actor modified the file between our read and our write.
    #[error("Version conflict on '{path}': expected {expected}")]
    Conflict {
        path: FilePath,
        expected: VersionToken,
    },

    /// The store rejected the request as invalid (e.g. archived repository).
    #[error("Request rejected: {message}")]
    Rejected { message: String },

    /// The store hit its rate limit; retried with back-off before surfacing.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// The rate limit will not reset within the longest wait the adapter is
    /// configured to sit out. Every further request would fail the same way,
    /// so this is fatal for the whole run.
    #[error("Rate limit exhausted: {message} (resets in {}s)", .reset_in.as_secs())]
    RateLimitExhausted { message: String, reset_in: Duration },

    /// Server failure, timeout, or network error.
    #[error("Transient failure: {message}")]
    Transient { message: String },

    /// The store returned a payload that could not be decoded.
    #[error("Malformed response: {message}")]
    Decode { message: String },

    /// Any other HTTP status.
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
}

impl StoreError {
    /// Returns whether the failed operation may be attempted again.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::RateLimited { retry_after, .. } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Transient { .. } => RetryPolicy::Retryable { after: None },
            _ => RetryPolicy::NonRetryable,
        }
    }

    /// Returns `true` if no further work in this run can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::RateLimitExhausted { .. })
    }

    /// Returns `true` for the lost-update race on a conditional write.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
