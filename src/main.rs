//! rtplan-preflight CLI entry point
//!
//! Validates a radiotherapy plan snapshot against clinic rules.

use clap::Parser;
use rtplan_preflight::cli::args::Args;
use rtplan_preflight::cli::output::{exit_code, get_formatter};
use rtplan_preflight::{load_snapshot, run_validation, PreflightError, ValidationConfig};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(3)
        }
    }
}

fn init_logging(args: &Args) {
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: &Args) -> Result<u8, PreflightError> {
    let mut config = match &args.config {
        Some(path) => ValidationConfig::from_file(path)?,
        None => ValidationConfig::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;

    let plan = load_snapshot(&args.snapshot)?;
    tracing::debug!(plan = %plan.plan_id, structures = plan.structures().len(), "snapshot loaded");

    let report = run_validation(Some(&plan), &config);
    let formatter = get_formatter(args.format, args.quiet);
    println!("{}", formatter.format(&report));

    Ok(exit_code(&report.summary()))
}
