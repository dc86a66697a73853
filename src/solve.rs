use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::Args;

/// Payload accepted by the solve endpoint.
#[derive(Debug, Serialize)]
pub struct Solution {
    pub alive_ssns: Vec<String>,
}

/// Submit the extracted values and surface the raw response.
///
/// The response is not interpreted here; status and body are returned
/// verbatim for the caller to print.
pub async fn submit(
    args: &Args,
    http: &reqwest::Client,
    solution: &Solution,
) -> Result<(u16, String)> {
    let response = http
        .post(args.solve_url())
        .json(solution)
        .send()
        .await
        .context("Failed to reach solve endpoint")?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .context("Failed to read solve response body")?;

    Ok((status, body))
}
