//! Aggregated outcome of a sweep.
//!
//! The orchestrator records one [`RepositoryReport`] per repository it visits
//! and one [`FileReport`] per workflow file it touches. The report is rendered
//! as text for operators or serialised as JSON for tooling, and decides the
//! process exit code through [`RunReport::has_failures`].

use std::fmt::Write as _;

use serde::Serialize;
use toggle::{FilePath, OrgName, RepositoryRef, RunId, Timestamp, ToggleDirection, VersionToken};

// ---------------------------------------------------------------------------
// Per-file outcomes
// ---------------------------------------------------------------------------

/// What happened to one workflow file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file was commented out; `version` is the new blob token.
    Disabled { version: VersionToken },
    /// The marker was stripped; `version` is the new blob token.
    Enabled { version: VersionToken },
    AlreadyDisabled,
    AlreadyEnabled,
    /// Dry run: the file would have been disabled.
    WouldDisable,
    /// Dry run: the file would have been enabled.
    WouldEnable,
    Failed {
        error: String,
        /// Set when the failure was a lost update race.
        conflict: bool,
    },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns `true` if the file was (or in a dry run, would be) rewritten.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Disabled { .. } | Self::Enabled { .. } | Self::WouldDisable | Self::WouldEnable
        )
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Disabled { .. } => "disabled",
            Self::Enabled { .. } => "enabled",
            Self::AlreadyDisabled => "already disabled",
            Self::AlreadyEnabled => "already enabled",
            Self::WouldDisable => "would disable",
            Self::WouldEnable => "would enable",
            Self::Failed { conflict: true, .. } => "conflict",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: FilePath,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

// ---------------------------------------------------------------------------
// Per-repository outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepositoryStatus {
    /// The workflow directory was listed; see the file reports.
    Processed,
    /// Archived repositories are read-only and are not touched.
    SkippedArchived,
    /// Listing the workflow directory failed.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryReport {
    pub repo: RepositoryRef,
    #[serde(flatten)]
    pub status: RepositoryStatus,
    pub files: Vec<FileReport>,
}

impl RepositoryReport {
    pub fn processed(repo: RepositoryRef) -> Self {
        Self {
            repo,
            status: RepositoryStatus::Processed,
            files: Vec::new(),
        }
    }

    pub fn skipped_archived(repo: RepositoryRef) -> Self {
        Self {
            repo,
            status: RepositoryStatus::SkippedArchived,
            files: Vec::new(),
        }
    }

    pub fn failed(repo: RepositoryRef, error: impl Into<String>) -> Self {
        Self {
            repo,
            status: RepositoryStatus::Failed {
                error: error.into(),
            },
            files: Vec::new(),
        }
    }

    /// Returns `true` if the repository itself or any of its files failed.
    pub fn has_failures(&self) -> bool {
        matches!(self.status, RepositoryStatus::Failed { .. })
            || self.files.iter().any(|f| f.outcome.is_failure())
    }
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Counts derived from a [`RunReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub repositories: usize,
    pub repositories_failed: usize,
    pub repositories_skipped: usize,
    pub files_changed: usize,
    pub files_unchanged: usize,
    pub files_failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub org: OrgName,
    pub direction: ToggleDirection,
    pub dry_run: bool,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub repositories: Vec<RepositoryReport>,
}

impl RunReport {
    pub fn new(run_id: RunId, org: OrgName, direction: ToggleDirection, dry_run: bool) -> Self {
        Self {
            run_id,
            org,
            direction,
            dry_run,
            started_at: Timestamp::now(),
            finished_at: None,
            repositories: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Timestamp::now());
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            repositories: self.repositories.len(),
            ..Summary::default()
        };
        for repo in &self.repositories {
            match repo.status {
                RepositoryStatus::Failed { .. } => summary.repositories_failed += 1,
                RepositoryStatus::SkippedArchived => summary.repositories_skipped += 1,
                RepositoryStatus::Processed => {}
            }
            for file in &repo.files {
                if file.outcome.is_failure() {
                    summary.files_failed += 1;
                } else if file.outcome.is_change() {
                    summary.files_changed += 1;
                } else {
                    summary.files_unchanged += 1;
                }
            }
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.repositories.iter().any(RepositoryReport::has_failures)
    }

    /// Renders the report as operator-facing text, one line per file.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let mode = if self.dry_run { " (dry run)" } else { "" };
        let _ = writeln!(
            out,
            "Run {}: {} workflows in {}{}",
            self.run_id, self.direction, self.org, mode
        );

        for repo in &self.repositories {
            match &repo.status {
                RepositoryStatus::Processed if repo.files.is_empty() => {
                    let _ = writeln!(out, "  {}: no matching workflows", repo.repo);
                }
                RepositoryStatus::Processed => {
                    let _ = writeln!(out, "  {}:", repo.repo);
                }
                RepositoryStatus::SkippedArchived => {
                    let _ = writeln!(out, "  {}: skipped (archived)", repo.repo);
                }
                RepositoryStatus::Failed { error } => {
                    let _ = writeln!(out, "  {}: FAILED {}", repo.repo, error);
                }
            }
            for file in &repo.files {
                match &file.outcome {
                    FileOutcome::Failed { error, .. } => {
                        let _ = writeln!(
                            out,
                            "    {} {}: {}",
                            file.path,
                            file.outcome.label(),
                            error
                        );
                    }
                    outcome => {
                        let _ = writeln!(out, "    {} {}", file.path, outcome.label());
                    }
                }
            }
        }

        let s = self.summary();
        let _ = writeln!(
            out,
            "{} repositories ({} failed, {} skipped); {} files changed, {} unchanged, {} failed",
            s.repositories,
            s.repositories_failed,
            s.repositories_skipped,
            s.files_changed,
            s.files_unchanged,
            s.files_failed
        );
        out
    }

    /// Serialises the report, including its summary, as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Envelope<'a> {
            #[serde(flatten)]
            report: &'a RunReport,
            summary: Summary,
        }
        serde_json::to_string_pretty(&Envelope {
            report: self,
            summary: self.summary(),
        })
    }
}
