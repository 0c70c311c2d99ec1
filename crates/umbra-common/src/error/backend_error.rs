/// Failures of the script-executing host.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error("Script execution failed: {0}")]
    Script(String),
    #[error("Navigation failed: {0}")]
    Navigation(String),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Not ready")]
    NotReady,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Other: {0}")]
    Other(String),
}
