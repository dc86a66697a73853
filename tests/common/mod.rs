use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use backup_restore::cli::Args;
use backup_restore::error::InstanceError;
use backup_restore::runtime::InstanceRuntime;

/// In-memory stand-in for the Docker runtime, tracking instance state so
/// tests can assert on lifecycle ordering.
pub struct FakeRuntime {
    state: Mutex<State>,
    /// Probes that must fail before the instance reports ready;
    /// `u32::MAX` means it never becomes ready.
    ready_after: u32,
    /// Simulated interpreter failure for every script submission.
    script_error: Option<String>,
}

#[derive(Default)]
struct State {
    exists: bool,
    probes: u32,
    scripts: Vec<String>,
    destroys: u32,
}

impl FakeRuntime {
    /// Runtime whose instance is ready on the first probe.
    pub fn ready() -> Self {
        Self {
            state: Mutex::new(State::default()),
            ready_after: 0,
            script_error: None,
        }
    }

    /// Runtime whose instance never becomes ready.
    pub fn never_ready() -> Self {
        Self {
            ready_after: u32::MAX,
            ..Self::ready()
        }
    }

    /// Simulate a leftover instance from a previous run.
    pub fn with_pre_existing_instance(self) -> Self {
        self.state.lock().unwrap().exists = true;
        self
    }

    /// Make every script submission fail with the given interpreter error.
    pub fn with_script_error(mut self, stderr: &str) -> Self {
        self.script_error = Some(stderr.to_string());
        self
    }

    pub fn probes(&self) -> u32 {
        self.state.lock().unwrap().probes
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts.clone()
    }

    pub fn destroys(&self) -> u32 {
        self.state.lock().unwrap().destroys
    }

    pub fn instance_exists(&self) -> bool {
        self.state.lock().unwrap().exists
    }
}

#[async_trait]
impl InstanceRuntime for FakeRuntime {
    async fn start(&self, _args: &Args) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.exists = true;
        state.probes = 0;
        Ok(())
    }

    async fn probe_ready(&self, _args: &Args) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.probes += 1;
        Ok(state.exists && state.probes > self.ready_after)
    }

    async fn create_database(&self, _args: &Args) -> Result<()> {
        Ok(())
    }

    async fn execute_script(&self, _args: &Args, sql: &str) -> Result<()> {
        if let Some(stderr) = &self.script_error {
            return Err(InstanceError::ScriptFailed(stderr.clone()).into());
        }
        self.state.lock().unwrap().scripts.push(sql.to_string());
        Ok(())
    }

    async fn destroy(&self, args: &Args) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.exists {
            return Err(InstanceError::NotFound(args.pg_container.clone()).into());
        }
        state.exists = false;
        state.destroys += 1;
        Ok(())
    }
}

/// Arguments pointing at a mock challenge service.
pub fn test_args(base_url: &str) -> Args {
    use clap::Parser;

    Args::try_parse_from([
        "backup-restore",
        "--access-token",
        "test-token",
        "--base-url",
        base_url,
    ])
    .unwrap()
}
