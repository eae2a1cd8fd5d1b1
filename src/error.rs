//! Error types shared across the timer

use thiserror::Error;

/// Failure reading or writing the persisted timer record
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid timer record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure handing a message to the controller task
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("timer controller is no longer running")]
    Closed,
}
