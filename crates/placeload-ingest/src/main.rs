//! placeload - resumable place catalog ingestion

use clap::Parser;
use placeload_common::error::EXIT_FAILURE;
use placeload_common::logging::{init_logging, LogConfig, LogLevel};
use placeload_ingest::config::{IngestArgs, IngestConfig};
use placeload_ingest::{cancel, pipeline, RunOutcome};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();
    let args = IngestArgs::parse();

    let verbose = args.verbose;
    let log_config = LogConfig::builder()
        .level(LogLevel::Info)
        .log_file_prefix("placeload")
        .filter_directives("sqlx=warn")
        .build()
        .with_env_overrides()
        .map(|config| config.with_verbose(verbose));

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = match log_config.and_then(|config| init_logging(&config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return ExitCode::from(EXIT_FAILURE);
        },
    };

    let config = match IngestConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Invalid configuration");
            return ExitCode::from(e.exit_code());
        },
    };

    let token = cancel::spawn_monitor();

    match pipeline::ingest(&config, token).await {
        Ok(summary) => match summary.outcome {
            RunOutcome::Completed => {
                info!(committed = summary.committed, "Ingestion complete");
                println!("CSV data inserted successfully!");
                ExitCode::SUCCESS
            },
            RunOutcome::Interrupted => {
                warn!(
                    committed = summary.committed,
                    last_key = summary.last_key.as_deref().unwrap_or(""),
                    "Ingestion interrupted; rerun to continue after the checkpoint"
                );
                ExitCode::from(summary.outcome.exit_code())
            },
        },
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Ingestion failed");
            ExitCode::from(e.exit_code())
        },
    }
}
