//! Error types for the endpoint layer.

use thiserror::Error;

/// Result type for endpoint operations.
pub type EndpointResult<T> = Result<T, EndpointError>;

/// Errors that can occur while resolving or persisting endpoints.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Network error while probing an origin.
    #[error("network error: {0}")]
    Network(String),

    /// Settings storage error.
    #[error("storage error: {0}")]
    Storage(String),
}
