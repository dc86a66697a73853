use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

use crate::cli::Args;

#[derive(Debug, Deserialize)]
struct ProblemResponse {
    dump: String,
}

/// Fetch the problem payload and normalize it into restorable SQL text.
pub async fn fetch_dump_sql(args: &Args, http: &reqwest::Client) -> Result<String> {
    let response = http
        .get(args.problem_url())
        .send()
        .await
        .context("Failed to reach problem endpoint")?
        .error_for_status()
        .context("Problem endpoint returned an error status")?;

    let problem: ProblemResponse = response
        .json()
        .await
        .context("Failed to parse problem response")?;

    decode_dump(&problem.dump)
}

/// Decode a base64 dump payload into SQL text.
///
/// Gzip framing is probed first; a payload that is not gzip-compressed is
/// used as-is. Malformed UTF-8 sequences are replaced rather than rejected
/// so a dirty dump still restores.
pub fn decode_dump(encoded: &str) -> Result<String> {
    let raw = BASE64
        .decode(encoded.trim())
        .context("Dump field is not valid base64")?;

    let bytes = match gunzip(&raw) {
        Ok(inflated) => {
            debug!(
                compressed = raw.len(),
                inflated = inflated.len(),
                "Dump was gzip-compressed"
            );
            inflated
        }
        Err(_) => raw,
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
