//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use toggle::ToggleDirection;

#[derive(Debug, Parser)]
#[command(name = "wf-toggle", version)]
#[command(about = "Disable or enable GitHub Actions workflows across an organization")]
pub struct Cli {
    /// TOML file supplying defaults for any option not given on the command line
    #[arg(long, global = true, env = "WF_TOGGLE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Organization whose repositories are swept
    #[arg(long, global = true, env = "GITHUB_ORG")]
    pub org: Option<String>,

    /// Access token with contents write permission
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// REST API root (GitHub Enterprise Server: https://<host>/api/v3)
    #[arg(long, global = true, env = "GITHUB_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Run report format on stdout
    #[arg(long, global = true, value_enum)]
    pub report: Option<ReportFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Comment out every line of each matching workflow file
    Disable(ToggleArgs),

    /// Restore workflow files disabled by `disable`
    Enable(ToggleArgs),
}

impl Command {
    pub fn direction(&self) -> ToggleDirection {
        match self {
            Self::Disable(_) => ToggleDirection::Disable,
            Self::Enable(_) => ToggleDirection::Enable,
        }
    }

    pub fn args(&self) -> &ToggleArgs {
        match self {
            Self::Disable(args) | Self::Enable(args) => args,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ToggleArgs {
    /// Read and decide everything, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Only sweep this repository (repeatable)
    #[arg(long = "repo", value_name = "NAME")]
    pub repos: Vec<String>,

    /// Substring a workflow file name must contain
    #[arg(long = "match", value_name = "SUBSTR")]
    pub name_filter: Option<String>,

    /// Directory holding the workflow files
    #[arg(long, value_name = "PATH")]
    pub dir: Option<String>,

    /// Commit message for every write
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}
