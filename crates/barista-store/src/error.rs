//! Error types for the local stores.

use thiserror::Error;

/// Errors from backup and config file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid secret name: {0}")]
    InvalidName(String),

    #[error("no backup at index {0}")]
    NoSuchBackup(usize),
}
