mod cli;
mod rc_config;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::control;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::{Cli, Command};
use rc_config::RcConfig;
use samlcheck::checks::{metadata_report, settings_report};
use samlcheck::output::{self, ReportKind, ReportSource};
use samlcheck::result::CheckSummary;
use samlcheck::sp_metadata::{self, MetadataOptions, SigningOutcome};
use samlcheck::time::SystemClock;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let path = cli.command.path();
    let rc_dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let rc = RcConfig::load(rc_dir);

    let verbose = RcConfig::merge(cli.verbose, rc.verbose);
    let json = RcConfig::merge(cli.json, rc.json);
    if RcConfig::merge(cli.no_color, rc.no_color) {
        control::set_override(false);
    }

    let outcome = match &cli.command {
        Command::Settings { path, sp_only } => {
            run_settings(path, RcConfig::merge(*sp_only, rc.sp_only), verbose, json)
        }
        Command::Metadata { path } => run_metadata(path, verbose, json),
        Command::SpMetadata { path } => run_sp_metadata(path),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

/// Returns `Ok(true)` when no errors were found.
fn run_settings(path: &Path, sp_only: bool, verbose: bool, json: bool) -> Result<bool> {
    let settings = samlcheck::config::load(path)?;
    let sp_only = sp_only || settings.sp_validation_only();

    let results = settings_report(&settings, sp_only, &SystemClock);
    let source = ReportSource {
        path,
        kind: ReportKind::Settings,
        sp_only,
    };
    output::print_results(&results, verbose, json, &source);

    Ok(!CheckSummary::from_results(&results).has_errors())
}

fn run_metadata(path: &Path, verbose: bool, json: bool) -> Result<bool> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let issues = samlcheck::validate_metadata_document(&xml)
        .with_context(|| format!("Failed to validate {}", path.display()))?;

    let results = metadata_report(&issues);
    let source = ReportSource {
        path,
        kind: ReportKind::Metadata,
        sp_only: false,
    };
    output::print_results(&results, verbose, json, &source);

    Ok(issues.is_empty())
}

fn run_sp_metadata(path: &Path) -> Result<bool> {
    let settings = samlcheck::config::load(path)?;
    let options = MetadataOptions::from_now(chrono::Utc::now());
    let metadata = sp_metadata::generate(&settings, &options, None)
        .with_context(|| format!("Failed to generate SP metadata for {}", path.display()))?;

    print!("{}", metadata.xml);

    if let SigningOutcome::Failed(reason) = &metadata.signing {
        eprintln!("Warning: metadata is unsigned: {}", reason);
        return Ok(false);
    }
    Ok(true)
}
