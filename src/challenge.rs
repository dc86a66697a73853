use anyhow::Result;
use tracing::{info, info_span, warn};

use crate::cli::Args;
use crate::dump;
use crate::instance;
use crate::records;
use crate::runtime::InstanceRuntime;
use crate::solve::{self, Solution};

/// Outcome of a full run.
#[derive(Debug)]
pub struct RunReport {
    pub alive_ssns: Vec<String>,
    pub solve_status: u16,
    pub solve_body: String,
}

/// Run the complete challenge workflow.
///
/// The instance is destroyed on every exit path, including failures partway
/// through provisioning. A teardown failure while unwinding an earlier
/// error is logged and the original error is returned.
pub async fn run(
    args: &Args,
    runtime: &dyn InstanceRuntime,
    http: &reqwest::Client,
) -> Result<RunReport> {
    let result = solve_challenge(args, runtime, http).await;

    let span = info_span!("teardown", container = %args.pg_container).entered();
    let teardown = instance::teardown(args, runtime).await;
    drop(span);

    match (result, teardown) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(td)) => {
            warn!(error = %td, "Teardown failed while unwinding an earlier error");
            Err(e)
        }
    }
}

async fn solve_challenge(
    args: &Args,
    runtime: &dyn InstanceRuntime,
    http: &reqwest::Client,
) -> Result<RunReport> {
    let span = info_span!("provision", container = %args.pg_container).entered();
    instance::provision(args, runtime).await?;
    drop(span);

    let span = info_span!("fetch_dump").entered();
    let sql = dump::fetch_dump_sql(args, http).await?;
    info!(bytes = sql.len(), "Dump fetched and decoded");
    drop(span);

    let span = info_span!("restore").entered();
    runtime.execute_script(args, &sql).await?;
    info!("Dump restored");
    drop(span);

    let span = info_span!("extract").entered();
    let alive_ssns = records::fetch_alive_ssns(&args.dsn()).await?;
    info!(count = alive_ssns.len(), "Extraction query completed");
    drop(span);

    println!("Alive SSNs:");
    for ssn in &alive_ssns {
        println!("  {ssn}");
    }

    let span = info_span!("submit").entered();
    let solution = Solution { alive_ssns };
    let (solve_status, solve_body) = solve::submit(args, http, &solution).await?;
    drop(span);

    println!("Solve status: {solve_status}");
    println!("Solve body  : {solve_body}");

    Ok(RunReport {
        alive_ssns: solution.alive_ssns,
        solve_status,
        solve_body,
    })
}
