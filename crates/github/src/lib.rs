//! GitHub infrastructure adapter.
//!
//! Implements the store ports defined in the [`toggle`] crate
//! ([`ContentStore`](toggle::ContentStore) and
//! [`RepositoryDirectory`](toggle::RepositoryDirectory)) over the GitHub REST
//! contents and organization-repositories endpoints, using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (authentication, base64 transport encoding,
//! rate limiting, pagination hints, status-code mapping) are handled here;
//! the [`toggle`] and `sweep` crates never see them.
//!
//! ## Module Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | `client` | [`GithubClient`]: the port implementations and retry loop |
//! | `config` | [`GithubConfig`], [`DEFAULT_API_URL`], [`API_VERSION`] |
//! | `errors` | [`GithubError`] and HTTP status classification |
//! | `retry` | [`RetryConfig`]: exponential back-off with jitter |
//! | `codec` | Base64 encoding of file content |
//! | `wire` | JSON request/response bodies and `Link` header parsing |

mod client;
mod codec;
mod config;
mod errors;
mod retry;
mod wire;

pub use client::GithubClient;
pub use config::{GithubConfig, API_VERSION, DEFAULT_API_URL};
pub use errors::GithubError;
pub use retry::RetryConfig;
