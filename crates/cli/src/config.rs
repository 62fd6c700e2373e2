//! Resolution of the run configuration.
//!
//! Every setting is taken from the first source that provides it: command-line
//! flag, then environment variable (clap folds both into [`Cli`]), then the
//! optional TOML file, then the built-in default.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use github::GithubConfig;
use serde::Deserialize;
use sweep::{SweepOptions, MAX_PAGE_SIZE};
use toggle::{FilePath, OrgName, RepoName, SelectionPredicate, ToggleDirection};

use crate::args::{Cli, LogFormat, ReportFormat};

/// Contents of the optional config file.
///
/// ```toml
/// org = "acme"
/// api_url = "https://github.example.com/api/v3"
/// log_format = "json"
///
/// [sweep]
/// workflow_dir = ".github/workflows"
/// match = "workflow"
/// disable_message = "Disable workflow"
///
/// [http]
/// timeout_secs = 30
/// max_retries = 3
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub org: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub log_format: Option<LogFormat>,
    pub report: Option<ReportFormat>,
    pub sweep: SweepSection,
    pub http: HttpSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSection {
    pub workflow_dir: Option<String>,
    #[serde(rename = "match")]
    pub name_filter: Option<String>,
    pub disable_message: Option<String>,
    pub enable_message: Option<String>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

/// Fully resolved configuration for one invocation.
#[derive(Debug)]
pub struct Settings {
    pub org: OrgName,
    pub github: GithubConfig,
    pub options: SweepOptions,
    pub log_format: LogFormat,
    pub report_format: ReportFormat,
}

pub fn load_file(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config from {}", path.display()))
}

/// Reads the config file named on the command line, if any, and resolves.
pub fn load(cli: &Cli) -> Result<Settings> {
    let file = match &cli.config {
        Some(path) => load_file(path)?,
        None => FileConfig::default(),
    };
    resolve(cli, file)
}

pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Settings> {
    let org = cli
        .org
        .clone()
        .or(file.org)
        .context("No organization given; pass --org or set GITHUB_ORG")?;
    let org = OrgName::new(org).context("Organization name is blank")?;

    let token = cli
        .token
        .clone()
        .or(file.token)
        .context("No access token given; pass --token or set GITHUB_TOKEN")?;

    let mut github = GithubConfig::new(token);
    if let Some(url) = cli.api_url.clone().or(file.api_url) {
        github = github.with_base_url(&url)?;
    }
    if let Some(secs) = file.http.timeout_secs {
        github.timeout = Duration::from_secs(secs);
    }
    if let Some(retries) = file.http.max_retries {
        github.retry.max_retries = retries;
    }

    let direction = cli.command.direction();
    let args = cli.command.args();
    let mut options = SweepOptions::new(direction);
    options.dry_run = args.dry_run;

    if let Some(dir) = args.dir.clone().or(file.sweep.workflow_dir) {
        options.workflow_dir = FilePath::new(dir).context("Workflow directory is blank")?;
    }
    if let Some(filter) = args.name_filter.clone().or(file.sweep.name_filter) {
        options.predicate = SelectionPredicate::new(filter);
    }
    let file_message = match direction {
        ToggleDirection::Disable => file.sweep.disable_message,
        ToggleDirection::Enable => file.sweep.enable_message,
    };
    options.commit_message = args.message.clone().or(file_message);
    options.only_repos = args
        .repos
        .iter()
        .map(|name| RepoName::new(name.as_str()).context("Repository name is blank"))
        .collect::<Result<_>>()?;
    options.page_size = file.sweep.page_size.unwrap_or(MAX_PAGE_SIZE);
    options.validate()?;

    Ok(Settings {
        org,
        github,
        options,
        log_format: cli.log_format.or(file.log_format).unwrap_or_default(),
        report_format: cli.report.or(file.report).unwrap_or_default(),
    })
}
