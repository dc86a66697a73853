use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use tracing::{error, info};

use backup_restore::challenge;
use backup_restore::cli::Args;
use backup_restore::runtime::DockerRuntime;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading any configuration
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable format
    // Use JSON format if LOG_FORMAT=json, otherwise use compact format
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
                .json()
                .with_current_span(true)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
                .with_target(false)
                .with_file(false)
                .compact()
                .init();
        }
    }

    let args = Args::parse();
    args.validate()?;

    let http = reqwest::Client::builder()
        .timeout(args.http_timeout_duration())
        .build()?;
    let runtime = DockerRuntime;

    info!(
        container = %args.pg_container,
        image = %args.pg_image,
        port = args.pg_port,
        database = %args.pg_db,
        "Backup restore challenge started"
    );

    let start_time = Instant::now();

    match challenge::run(&args, &runtime, &http).await {
        Ok(report) => {
            info!(
                alive_count = report.alive_ssns.len(),
                solve_status = report.solve_status,
                total_execution_seconds = start_time.elapsed().as_secs_f64(),
                "Challenge run completed"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                status = "failed",
                error = %e,
                total_execution_seconds = start_time.elapsed().as_secs_f64(),
                "Challenge run failed"
            );
            Err(e)
        }
    }
}
