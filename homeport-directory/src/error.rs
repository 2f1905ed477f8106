//! Error types for the directory layer.

use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur while assembling the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Remote directory fetch failed.
    #[error("remote directory error: {0}")]
    Remote(String),

    /// Local-network discovery failed.
    #[error("local discovery error: {0}")]
    Discovery(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
