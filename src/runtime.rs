use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::cli::Args;
use crate::error::InstanceError;

/// Lifecycle operations on the disposable database service.
///
/// The production implementation shells out to Docker; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait InstanceRuntime: Send + Sync {
    /// Launch a detached instance bound to the configured host port.
    async fn start(&self, args: &Args) -> Result<()>;

    /// Check whether the instance accepts connections.
    async fn probe_ready(&self, args: &Args) -> Result<bool>;

    /// Create the target logical database inside the instance.
    async fn create_database(&self, args: &Args) -> Result<()>;

    /// Feed a SQL script to the instance's interpreter as one submission.
    async fn execute_script(&self, args: &Args, sql: &str) -> Result<()>;

    /// Remove the instance. Fails with [`InstanceError::NotFound`] when no
    /// instance exists under the configured name.
    async fn destroy(&self, args: &Args) -> Result<()>;
}

/// Docker-backed runtime.
pub struct DockerRuntime;

#[async_trait]
impl InstanceRuntime for DockerRuntime {
    async fn start(&self, args: &Args) -> Result<()> {
        let password_env = format!("POSTGRES_PASSWORD={}", args.pg_password);
        let port_mapping = format!("{}:5432", args.pg_port);

        let output = Command::new("docker")
            .args([
                "run",
                "-d",
                "--name",
                args.pg_container.as_str(),
                "-e",
                password_env.as_str(),
                "-p",
                port_mapping.as_str(),
                args.pg_image.as_str(),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute docker run")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InstanceError::LaunchFailed(stderr.trim().to_string()).into());
        }
        Ok(())
    }

    async fn probe_ready(&self, args: &Args) -> Result<bool> {
        let status = Command::new("docker")
            .args([
                "exec",
                args.pg_container.as_str(),
                "pg_isready",
                "-U",
                args.pg_user.as_str(),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .context("Failed to execute readiness probe")?;

        Ok(status.success())
    }

    async fn create_database(&self, args: &Args) -> Result<()> {
        let output = Command::new("docker")
            .args([
                "exec",
                args.pg_container.as_str(),
                "createdb",
                "-U",
                args.pg_user.as_str(),
                args.pg_db.as_str(),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute createdb")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("createdb {} failed: {}", args.pg_db, stderr.trim());
        }
        Ok(())
    }

    async fn execute_script(&self, args: &Args, sql: &str) -> Result<()> {
        // ON_ERROR_STOP makes psql exit non-zero on the first bad statement
        // instead of reporting errors and exiting 0.
        let mut child = Command::new("docker")
            .args([
                "exec",
                "-i",
                args.pg_container.as_str(),
                "psql",
                "-U",
                args.pg_user.as_str(),
                "-d",
                args.pg_db.as_str(),
                "-v",
                "ON_ERROR_STOP=1",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn psql")?;

        let mut stdin = child.stdin.take().context("psql stdin unavailable")?;
        stdin
            .write_all(sql.as_bytes())
            .await
            .context("Failed to stream script to psql")?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for psql")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InstanceError::ScriptFailed(stderr.trim().to_string()).into());
        }

        debug!(bytes = sql.len(), "Script executed");
        Ok(())
    }

    async fn destroy(&self, args: &Args) -> Result<()> {
        let output = Command::new("docker")
            .args(["rm", "-f", args.pg_container.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute docker rm")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No such container") {
                return Err(InstanceError::NotFound(args.pg_container.clone()).into());
            }
            anyhow::bail!("docker rm {} failed: {}", args.pg_container, stderr.trim());
        }
        Ok(())
    }
}
