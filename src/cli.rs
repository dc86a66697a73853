use clap::Parser;
use std::time::Duration;

/// Hackattic backup_restore challenge automation
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Hackattic access token
    #[arg(long, env = "TOKEN", default_value = "", hide_default_value = true)]
    pub access_token: String,

    /// Host port mapped to the instance's PostgreSQL port
    #[arg(long, env = "PG_PORT", default_value = "5433")]
    pub pg_port: u16,

    /// Logical database the dump is restored into
    #[arg(long, env = "PG_DB", default_value = "ctfdb")]
    pub pg_db: String,

    /// Administrative password for the instance
    #[arg(long, env = "PG_PASSWORD", default_value = "pg")]
    pub pg_password: String,

    /// Administrative user for the instance
    #[arg(long, env = "PG_USER", default_value = "postgres")]
    pub pg_user: String,

    /// Name of the disposable container
    #[arg(long, env = "PG_CONTAINER", default_value = "hackattic-pg")]
    pub pg_container: String,

    /// PostgreSQL image to launch
    #[arg(long, env = "PG_IMAGE", default_value = "postgres:16")]
    pub pg_image: String,

    /// Base URL of the challenge service
    #[arg(long, env = "HACKATTIC_URL", default_value = "https://hackattic.com")]
    pub base_url: String,

    /// Readiness probe attempts before giving up
    #[arg(long, default_value = "90")]
    pub ready_attempts: u32,

    /// Seconds between readiness probes
    #[arg(long, default_value = "1")]
    pub ready_interval: u64,

    /// Timeout for HTTP requests in seconds
    #[arg(long, default_value = "30")]
    pub http_timeout: u64,
}

impl Args {
    /// The access token is the only parameter without a usable default;
    /// nothing may run without it.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.access_token.trim().is_empty() {
            anyhow::bail!("access token is not set (use --access-token or the TOKEN env var)");
        }
        Ok(())
    }

    pub fn problem_url(&self) -> String {
        format!(
            "{}/challenges/backup_restore/problem?access_token={}",
            self.base_url.trim_end_matches('/'),
            self.access_token.trim()
        )
    }

    pub fn solve_url(&self) -> String {
        format!(
            "{}/challenges/backup_restore/solve?access_token={}",
            self.base_url.trim_end_matches('/'),
            self.access_token.trim()
        )
    }

    /// Connection string for the restored database, reachable through the
    /// published host port.
    pub fn dsn(&self) -> String {
        format!(
            "postgresql://{}:{}@localhost:{}/{}",
            self.pg_user, self.pg_password, self.pg_port, self.pg_db
        )
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.ready_interval)
    }

    pub fn http_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}
