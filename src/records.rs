use anyhow::{Context, Result};
use tokio_postgres::NoTls;
use tracing::{debug, warn};

/// SSNs of living record holders. Status matching is case-insensitive with
/// surrounding whitespace trimmed; ordering is ascending by SSN.
const ALIVE_SSNS_QUERY: &str = "SELECT ssn \
     FROM public.criminal_records \
     WHERE lower(btrim(status)) = 'alive' \
     ORDER BY ssn";

/// Run the extraction query against the restored database.
///
/// The connection lives only for the duration of this call.
pub async fn fetch_alive_ssns(dsn: &str) -> Result<Vec<String>> {
    let (client, connection) = tokio_postgres::connect(dsn, NoTls)
        .await
        .context("Failed to connect to the restored database")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            warn!(error = %e, "Database connection closed with error");
        }
    });

    let rows = client
        .query(ALIVE_SSNS_QUERY, &[])
        .await
        .context("Extraction query failed")?;

    let ssns: Vec<String> = rows.iter().map(|row| row.get(0)).collect();
    debug!(count = ssns.len(), "Extraction query returned rows");

    Ok(ssns)
}
