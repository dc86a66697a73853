use anyhow::Result;
use tracing::{debug, info};

use crate::cli::Args;
use crate::error::InstanceError;
use crate::runtime::InstanceRuntime;

/// Provision a fresh instance with the target database created inside it.
pub async fn provision(args: &Args, runtime: &dyn InstanceRuntime) -> Result<()> {
    remove_stale(args, runtime).await?;

    info!(
        container = %args.pg_container,
        image = %args.pg_image,
        port = args.pg_port,
        "Launching database instance"
    );
    runtime.start(args).await?;

    wait_ready(args, runtime).await?;

    runtime.create_database(args).await?;
    info!(database = %args.pg_db, "Instance provisioned");
    Ok(())
}

/// Force-remove a leftover instance from a previous run.
///
/// A missing instance is the normal case; any other removal failure
/// surfaces rather than being suppressed.
async fn remove_stale(args: &Args, runtime: &dyn InstanceRuntime) -> Result<()> {
    match runtime.destroy(args).await {
        Ok(()) => {
            info!(
                container = %args.pg_container,
                "Removed leftover instance from a previous run"
            );
            Ok(())
        }
        Err(e) if is_not_found(&e) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Block until the instance accepts connections, probing once per interval
/// up to the configured attempt ceiling.
pub async fn wait_ready(args: &Args, runtime: &dyn InstanceRuntime) -> Result<()> {
    for attempt in 1..=args.ready_attempts {
        if runtime.probe_ready(args).await? {
            info!(attempt, "Instance is ready");
            return Ok(());
        }
        debug!(attempt, "Instance not ready yet");
        tokio::time::sleep(args.probe_interval()).await;
    }

    Err(InstanceError::NotReady(args.ready_attempts).into())
}

/// Destroy the instance, tolerating one that is already gone.
pub async fn teardown(args: &Args, runtime: &dyn InstanceRuntime) -> Result<()> {
    match runtime.destroy(args).await {
        Ok(()) => {
            info!(container = %args.pg_container, "Instance destroyed");
            Ok(())
        }
        Err(e) if is_not_found(&e) => Ok(()),
        Err(e) => Err(e),
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<InstanceError>(),
        Some(InstanceError::NotFound(_))
    )
}
