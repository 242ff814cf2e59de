//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A skip token the store did not mint, or one it can no longer honor.
    #[error("invalid skip token: {0}")]
    InvalidSkipToken(String),

    /// Payload serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for holdfast_hub_core::HubError {
    fn from(err: StoreError) -> Self {
        holdfast_hub_core::HubError::server(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
