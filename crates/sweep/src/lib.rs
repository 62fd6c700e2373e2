//! Workflow toggle orchestration.
//!
//! Sequences calls between the domain rules in the [`toggle`] crate and the
//! store ports it defines. Contains no HTTP code; the `github` crate supplies
//! the port implementations at the composition root.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.**
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`controller`] | `ToggleController`: read, transform, conditional write of one file |
//! | [`enumerator`] | `RepositoryEnumerator`: paginated repository listing, workflow selection |
//! | [`orchestrator`] | `Orchestrator`: fail-forward pass over an organization |
//! | [`report`] | `RunReport` and per-repository/per-file outcomes |
//! | [`options`] | `SweepOptions` |

pub mod controller;
pub mod enumerator;
pub mod errors;
pub mod options;
pub mod orchestrator;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::ToggleController;
pub use enumerator::{ListedRepository, RepositoryEnumerator};
pub use errors::SweepError;
pub use options::{SweepOptions, MAX_PAGE_SIZE};
pub use orchestrator::Orchestrator;
pub use report::{FileOutcome, FileReport, RepositoryReport, RepositoryStatus, RunReport, Summary};
