//! One pass over an organization: every repository, every matching workflow.
//!
//! Failures are contained at the file boundary. A failed file is recorded and
//! the next file is processed; a repository whose workflow directory cannot be
//! listed is recorded and the next repository is processed. Only a fatal store
//! error (rejected credentials, exhausted rate limit) ends the pass early.

use std::collections::HashSet;
use std::sync::Arc;

use toggle::{ContentStore, OrgName, RepositoryDirectory, RepositoryRef, RunId, StoreError};
use tracing::{info, info_span, warn, Instrument};

use crate::{
    FileOutcome, FileReport, ListedRepository, RepositoryEnumerator, RepositoryReport, RunReport,
    SweepError, SweepOptions, ToggleController,
};

pub struct Orchestrator {
    enumerator: RepositoryEnumerator,
    controller: ToggleController,
    options: SweepOptions,
}

impl Orchestrator {
    /// Wires the enumerator and controller from the two ports.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::InvalidOptions`] if `options` fail validation.
    pub fn new(
        store: Arc<dyn ContentStore>,
        directory: Arc<dyn RepositoryDirectory>,
        options: SweepOptions,
    ) -> Result<Self, SweepError> {
        options.validate()?;
        let enumerator = RepositoryEnumerator::new(
            directory,
            options.workflow_dir.clone(),
            options.predicate.clone(),
            options.page_size,
        );
        let controller = ToggleController::new(store, options.commit_message(), options.dry_run);
        Ok(Self {
            enumerator,
            controller,
            options,
        })
    }

    /// Applies the configured direction to every matching workflow in `org`.
    ///
    /// # Errors
    ///
    /// - [`SweepError::Enumeration`] if the repository list cannot be fetched.
    /// - [`SweepError::Aborted`] on a fatal store error; the partial report is
    ///   attached.
    pub async fn run(&self, org: &OrgName, run_id: RunId) -> Result<RunReport, SweepError> {
        let span = info_span!("sweep", %run_id, %org, direction = %self.options.direction);
        self.run_inner(org, run_id).instrument(span).await
    }

    async fn run_inner(&self, org: &OrgName, run_id: RunId) -> Result<RunReport, SweepError> {
        let mut report = RunReport::new(
            run_id,
            org.clone(),
            self.options.direction,
            self.options.dry_run,
        );

        let repositories = match self.enumerator.list_repositories(org).await {
            Ok(repos) => repos,
            Err(err) if err.is_fatal() => {
                report.finish();
                return Err(SweepError::Aborted {
                    source: err,
                    report: Box::new(report),
                });
            }
            Err(err) => return Err(SweepError::Enumeration(err)),
        };
        info!(count = repositories.len(), "repositories listed");

        let mut visited = HashSet::new();
        for listed in repositories
            .into_iter()
            .filter(|r| self.options.includes(&r.repo.name))
        {
            visited.insert(listed.repo.name.clone());
            let span = info_span!("repository", repo = %listed.repo);
            match self.sweep_repository(&listed).instrument(span).await {
                Ok(repo_report) => report.repositories.push(repo_report),
                Err((err, partial)) => {
                    report.repositories.push(partial);
                    report.finish();
                    return Err(SweepError::Aborted {
                        source: err,
                        report: Box::new(report),
                    });
                }
            }
        }

        for name in &self.options.only_repos {
            if !visited.contains(name) {
                warn!(repo = %name, "requested repository not found in organization");
                report.repositories.push(RepositoryReport::failed(
                    RepositoryRef::new(org.clone(), name.clone()),
                    "not found in organization",
                ));
            }
        }

        report.finish();
        let summary = report.summary();
        info!(
            repositories = summary.repositories,
            changed = summary.files_changed,
            unchanged = summary.files_unchanged,
            failed = summary.files_failed + summary.repositories_failed,
            "sweep finished"
        );
        Ok(report)
    }

    /// Processes one repository. A fatal error is returned together with the
    /// report built so far so the caller can attach it to the abort.
    async fn sweep_repository(
        &self,
        listed: &ListedRepository,
    ) -> Result<RepositoryReport, (StoreError, RepositoryReport)> {
        let repo = &listed.repo;
        if listed.archived {
            info!("archived, skipping");
            return Ok(RepositoryReport::skipped_archived(repo.clone()));
        }

        let files = match self.enumerator.list_workflow_files(repo).await {
            Ok(files) => files,
            Err(err) if err.is_fatal() => {
                let partial = RepositoryReport::failed(repo.clone(), err.to_string());
                return Err((err, partial));
            }
            Err(err) => {
                warn!(error = %err, "could not list workflows");
                return Ok(RepositoryReport::failed(repo.clone(), err.to_string()));
            }
        };

        let mut repo_report = RepositoryReport::processed(repo.clone());
        if files.is_empty() {
            info!("no matching workflows");
            return Ok(repo_report);
        }

        for entry in files {
            let outcome = match self
                .controller
                .apply(self.options.direction, repo, &entry.path)
                .await
            {
                Ok(outcome) => outcome,
                Err(err) => {
                    let fatal = err.is_fatal();
                    if err.is_conflict() {
                        warn!(path = %entry.path, error = %err, "lost update race, skipping file");
                    } else {
                        warn!(path = %entry.path, error = %err, "toggle failed, skipping file");
                    }
                    repo_report.files.push(FileReport {
                        path: entry.path,
                        outcome: FileOutcome::Failed {
                            error: err.to_string(),
                            conflict: err.is_conflict(),
                        },
                    });
                    if fatal {
                        return Err((err, repo_report));
                    }
                    continue;
                }
            };
            repo_report.files.push(FileReport {
                path: entry.path,
                outcome,
            });
        }

        Ok(repo_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{org, FakeStore};
    use crate::RepositoryStatus;
    use toggle::{RepoName, ToggleDirection};

    const CI: &str = ".github/workflows/ci-workflow.yml";

    fn orchestrator(store: &Arc<FakeStore>, options: SweepOptions) -> Orchestrator {
        Orchestrator::new(store.clone(), store.clone(), options).unwrap()
    }

    fn disable() -> SweepOptions {
        SweepOptions::new(ToggleDirection::Disable)
    }

    #[tokio::test]
    async fn disables_then_enables_across_repositories() {
        let store = Arc::new(FakeStore::new());
        store.add_repo("svc-a");
        store.add_repo("svc-b");
        store.put_file("svc-a", CI, "name: CI\n");
        store.put_file("svc-a", ".github/workflows/build.yml", "name: Build\n");

        let report = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap();

        assert!(!report.has_failures());
        assert_eq!(store.content("svc-a", CI).unwrap(), "# name: CI\n");
        assert_eq!(
            store.content("svc-a", ".github/workflows/build.yml").unwrap(),
            "name: Build\n"
        );
        assert_eq!(report.repositories.len(), 2);
        assert_eq!(report.repositories[1].status, RepositoryStatus::Processed);
        assert!(report.repositories[1].files.is_empty());

        let report = orchestrator(&store, SweepOptions::new(ToggleDirection::Enable))
            .run(&org(), RunId::new_random())
            .await
            .unwrap();

        assert!(!report.has_failures());
        assert_eq!(store.content("svc-a", CI).unwrap(), "name: CI\n");
        assert!(matches!(
            report.repositories[0].files[0].outcome,
            FileOutcome::Enabled { .. }
        ));
    }

    #[tokio::test]
    async fn failed_file_does_not_stop_later_repositories() {
        let store = Arc::new(FakeStore::new());
        for name in ["svc-a", "svc-b", "svc-c"] {
            store.add_repo(name);
            store.put_file(name, CI, "name: CI\n");
        }
        store.fail_fetch(
            "svc-a",
            CI,
            StoreError::Transient {
                message: "502 Bad Gateway".into(),
            },
        );
        store.fail_listing(
            "svc-b",
            StoreError::Forbidden {
                message: "Resource not accessible by integration".into(),
            },
        );

        let report = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap();

        assert!(report.has_failures());
        assert!(report.repositories[0].files[0].outcome.is_failure());
        assert!(matches!(
            report.repositories[1].status,
            RepositoryStatus::Failed { .. }
        ));
        assert_eq!(store.content("svc-c", CI).unwrap(), "# name: CI\n");
        let summary = report.summary();
        assert_eq!(summary.files_failed, 1);
        assert_eq!(summary.repositories_failed, 1);
        assert_eq!(summary.files_changed, 1);
    }

    #[tokio::test]
    async fn conflict_is_recorded_and_skipped() {
        let store = Arc::new(FakeStore::new());
        store.add_repo("svc-a");
        store.put_file("svc-a", CI, "name: CI\n");
        store.race_after_fetch("svc-a", CI);

        let report = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap();

        assert!(matches!(
            report.repositories[0].files[0].outcome,
            FileOutcome::Failed { conflict: true, .. }
        ));
        assert_eq!(
            store.content("svc-a", CI).unwrap(),
            "name: CI (edited concurrently)\n"
        );
    }

    #[tokio::test]
    async fn auth_failure_aborts_with_partial_report() {
        let store = Arc::new(FakeStore::new());
        for name in ["svc-a", "svc-b", "svc-c"] {
            store.add_repo(name);
            store.put_file(name, CI, "name: CI\n");
        }
        store.fail_fetch(
            "svc-b",
            CI,
            StoreError::Auth {
                message: "Bad credentials".into(),
            },
        );

        let err = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap_err();

        match err {
            SweepError::Aborted { source, report } => {
                assert!(source.is_fatal());
                assert_eq!(report.repositories.len(), 2);
                assert!(report.repositories[1].has_failures());
                assert!(report.finished_at.is_some());
            }
            other => panic!("expected abort, got {other:?}"),
        }
        assert_eq!(store.content("svc-c", CI).unwrap(), "name: CI\n");
    }

    #[tokio::test]
    async fn exhausted_rate_limit_aborts_like_auth() {
        let store = Arc::new(FakeStore::new());
        for name in ["svc-a", "svc-b"] {
            store.add_repo(name);
            store.put_file(name, CI, "name: CI\n");
        }
        store.fail_fetch(
            "svc-a",
            CI,
            StoreError::RateLimitExhausted {
                message: "API rate limit exceeded".into(),
                reset_in: std::time::Duration::from_secs(3600),
            },
        );

        let err = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap_err();

        assert!(matches!(err, SweepError::Aborted { .. }));
        assert_eq!(store.content("svc-b", CI).unwrap(), "name: CI\n");
    }

    #[tokio::test]
    async fn auth_failure_while_listing_repositories_aborts_with_empty_report() {
        let store = Arc::new(FakeStore::new());
        store.add_repo("svc-a");
        store.fail_repositories(StoreError::Auth {
            message: "Bad credentials".into(),
        });

        let err = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap_err();

        match err {
            SweepError::Aborted { source, report } => {
                assert!(matches!(source, StoreError::Auth { .. }));
                assert!(report.repositories.is_empty());
                assert!(report.finished_at.is_some());
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_fatal_listing_failure_is_an_enumeration_error() {
        let store = Arc::new(FakeStore::new());
        store.add_repo("svc-a");
        store.fail_repositories(StoreError::Transient {
            message: "HTTP 502: Bad Gateway".into(),
        });

        let err = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SweepError::Enumeration(StoreError::Transient { .. })
        ));
        assert_eq!(store.page_requests(), [1]);
    }

    #[tokio::test]
    async fn repository_without_workflow_directory_is_not_an_error() {
        let store = Arc::new(FakeStore::new());
        store.add_repo("svc-b");
        store.put_file("svc-b", "README.md", "# svc-b\n");

        let report = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap();

        assert!(!report.has_failures());
        assert_eq!(report.repositories[0].status, RepositoryStatus::Processed);
        assert!(report.repositories[0].files.is_empty());
    }

    #[tokio::test]
    async fn archived_repositories_are_skipped() {
        let store = Arc::new(FakeStore::new());
        store.add_repo_with("legacy", true);
        store.put_file("legacy", CI, "name: CI\n");

        let report = orchestrator(&store, disable())
            .run(&org(), RunId::new_random())
            .await
            .unwrap();

        assert_eq!(
            report.repositories[0].status,
            RepositoryStatus::SkippedArchived
        );
        assert_eq!(store.content("legacy", CI).unwrap(), "name: CI\n");
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn repository_filter_limits_the_sweep() {
        let store = Arc::new(FakeStore::new());
        for name in ["svc-a", "svc-b"] {
            store.add_repo(name);
            store.put_file(name, CI, "name: CI\n");
        }
        let mut options = disable();
        options.only_repos = vec![
            RepoName::new("svc-b").unwrap(),
            RepoName::new("svc-z").unwrap(),
        ];

        let report = orchestrator(&store, options)
            .run(&org(), RunId::new_random())
            .await
            .unwrap();

        assert_eq!(store.content("svc-a", CI).unwrap(), "name: CI\n");
        assert_eq!(store.content("svc-b", CI).unwrap(), "# name: CI\n");
        assert_eq!(report.repositories.len(), 2);
        assert_eq!(report.repositories[1].repo.name.as_str(), "svc-z");
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn dry_run_reports_without_writing() {
        let store = Arc::new(FakeStore::new());
        store.add_repo("svc-a");
        store.put_file("svc-a", CI, "name: CI\n");
        let mut options = disable();
        options.dry_run = true;

        let report = orchestrator(&store, options)
            .run(&org(), RunId::new_random())
            .await
            .unwrap();

        assert_eq!(
            report.repositories[0].files[0].outcome,
            FileOutcome::WouldDisable
        );
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn invalid_options_are_rejected_at_construction() {
        let store = Arc::new(FakeStore::new());
        let mut options = disable();
        options.page_size = 0;

        let result = Orchestrator::new(store.clone(), store, options);

        assert!(matches!(result, Err(SweepError::InvalidOptions { .. })));
    }
}
