// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HealthKit importer CLI.
//!
//! Reads an Apple Health `export.xml` and creates the workouts it contains
//! through the Workout Log API. Safe to re-run: workouts already in the store
//! are skipped.
//!
//! ```bash
//! healthkit-import --xml export.xml --api http://localhost:5000 --dry-run
//! healthkit-import --xml export.xml --api http://localhost:5000
//! ```
//!
//! Exit codes: 0 success, 1 unreadable export, 2 API unhealthy,
//! 3 a create request failed.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use workout_log::importer::{
    ImportError, ImportOptions, Importer, StoreClient, DEFAULT_EXCLUDE_TYPES,
};

/// Import Apple Health workouts into the workout log
#[derive(Parser, Debug)]
#[command(name = "healthkit-import")]
#[command(version)]
struct Args {
    /// Path to export.xml
    #[arg(long, value_name = "PATH")]
    xml: PathBuf,

    /// API base URL
    #[arg(long, default_value = "http://localhost:5000", env = "WORKOUT_API_URL")]
    api: String,

    /// Do not create anything; print what would be imported
    #[arg(long)]
    dry_run: bool,

    /// Import only this HealthKit workoutActivityType (repeatable)
    #[arg(long = "include-type", value_name = "NAME")]
    include_types: Vec<String>,

    /// Also exclude this HealthKit workoutActivityType (repeatable; added to
    /// the built-in exclusions)
    #[arg(long = "exclude-type", value_name = "NAME")]
    exclude_types: Vec<String>,

    /// Max workouts to read (0 = no limit)
    #[arg(long, default_value_t = 0)]
    max: u64,
}

impl Args {
    fn import_options(&self) -> ImportOptions {
        ImportOptions {
            include_types: self.include_types.iter().cloned().collect(),
            exclude_types: DEFAULT_EXCLUDE_TYPES
                .iter()
                .map(|t| t.to_string())
                .chain(self.exclude_types.iter().cloned())
                .collect(),
            max_records: self.max,
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let importer = Importer::new(StoreClient::new(&args.api), args.import_options());

    let mut stdout = std::io::stdout();
    let summary = match importer.run(&args.xml, &mut stdout).await {
        Ok(summary) => summary,
        Err(e) => return ExitCode::from(report_failure(&e, &mut std::io::stderr())),
    };

    match summary.to_json_pretty() {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode summary");
            eprintln!("healthkit-import: failed to encode summary: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log the failure, print it to `stderr` regardless of the log filter and
/// return the process exit code.
fn report_failure<W: Write>(err: &ImportError, stderr: &mut W) -> u8 {
    tracing::error!(error = %err, "Import failed");
    let _ = writeln!(stderr, "healthkit-import: {}", err);
    err.exit_code()
}

/// Human-readable diagnostics on stderr; stdout carries only the report.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("workout_log=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
