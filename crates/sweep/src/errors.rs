//! Errors that end a sweep early.
//!
//! Per-file and per-repository failures never appear here; they are recorded
//! in the [`RunReport`](crate::RunReport) and the sweep moves on.

use thiserror::Error;
use toggle::StoreError;

use crate::RunReport;

#[derive(Debug, Error)]
pub enum SweepError {
    /// A fatal store error (rejected credentials or an exhausted rate limit)
    /// stopped the run. `report`
    /// holds everything processed up to that point.
    #[error("Sweep aborted: {source}")]
    Aborted {
        #[source]
        source: StoreError,
        report: Box<RunReport>,
    },

    /// The organization's repositories could not be listed at all.
    #[error("Could not enumerate repositories: {0}")]
    Enumeration(#[source] StoreError),

    /// The sweep options are inconsistent.
    #[error("Invalid sweep options: {message}")]
    InvalidOptions { message: String },
}
