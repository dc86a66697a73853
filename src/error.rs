use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("Instance not found: {0}")]
    NotFound(String),

    #[error("Instance launch failed: {0}")]
    LaunchFailed(String),

    #[error("Instance not ready after {0} probes")]
    NotReady(u32),

    #[error("Restore script failed: {0}")]
    ScriptFailed(String),
}
