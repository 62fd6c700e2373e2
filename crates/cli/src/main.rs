//! wf-toggle entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Resolve configuration**: flags, environment and the optional TOML
//!    file are merged into one [`config::Settings`].
//! 2. **Wire observability**: `tracing-subscriber` with a text or JSON layer,
//!    plus an OpenTelemetry OTLP exporter when one is configured. All spans and
//!    events emitted by every crate in the workspace flow through here.
//! 3. **Construct infrastructure**: one [`GithubClient`] serves as both the
//!    content store and the repository directory injected into the
//!    [`Orchestrator`].
//! 4. **Report**: print the run report and map it to the process exit code.
//!
//! | Exit code | Meaning |
//! |-----------|---------|
//! | 0 | every file was toggled or already in the requested state |
//! | 1 | at least one repository or file failed |
//! | 2 | fatal: bad configuration, rejected credentials, exhausted rate limit, no repo list |

mod args;
mod config;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use github::GithubClient;
use sweep::{Orchestrator, RunReport, SweepError};
use toggle::RunId;
use tracing::{error, info};

use crate::args::{Cli, ReportFormat};
use crate::config::Settings;

const EXIT_OK: u8 = 0;
const EXIT_FAILURES: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match config::load(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let telemetry = match telemetry::init(settings.log_format) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let code = run(settings).await;
    telemetry.shutdown();
    ExitCode::from(code)
}

async fn run(settings: Settings) -> u8 {
    let Settings {
        org,
        github,
        options,
        report_format,
        ..
    } = settings;

    let client = match GithubClient::new(github) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "could not build GitHub client");
            return EXIT_FATAL;
        }
    };
    let orchestrator = match Orchestrator::new(client.clone(), client, options) {
        Ok(o) => o,
        Err(e) => {
            error!(error = %e, "invalid options");
            return EXIT_FATAL;
        }
    };

    let run_id = RunId::new_random();
    info!(%run_id, %org, "starting run");
    let outcome = orchestrator.run(&org, run_id).await;

    match &outcome {
        Ok(report) => print_report(report, report_format),
        Err(SweepError::Aborted { source, report }) => {
            error!(error = %source, "run aborted");
            print_report(report, report_format);
        }
        Err(e) => error!(error = %e, "run failed"),
    }
    exit_code(&outcome)
}

fn print_report(report: &RunReport, format: ReportFormat) {
    match format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => error!(error = %e, "could not serialise run report"),
        },
    }
}

fn exit_code(outcome: &Result<RunReport, SweepError>) -> u8 {
    match outcome {
        Ok(report) if report.has_failures() => EXIT_FAILURES,
        Ok(_) => EXIT_OK,
        Err(_) => EXIT_FATAL,
    }
}
