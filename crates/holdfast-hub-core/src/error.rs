//! Error types for the Holdfast Hub request path.
//!
//! Every failure a caller can repair names the offending field with a
//! dot-path (`commit.protected.kid`, `query.filters[0].value`). The path and
//! the machine-readable code survive all the way to the wire; see
//! [`crate::response::ErrorResponse`].

use thiserror::Error;

/// Machine-readable codes carried in the `error_code` field of an error
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    NotImplemented,
    PermissionsRequired,
    ServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::NotImplemented => "not_implemented",
            ErrorCode::PermissionsRequired => "permissions_required",
            ErrorCode::ServerError => "server_error",
        }
    }
}

/// Failures that can occur while validating, routing, or executing a request.
///
/// `MissingParameter` and `IncorrectParameter` are structural: the request
/// named a field wrongly or not at all. `BadRequest` covers rule violations
/// on fields that are present and well-typed.
#[derive(Debug, Clone, Error)]
pub enum HubError {
    #[error("required parameter '{path}' was missing")]
    MissingParameter { path: String },

    #[error("parameter '{path}' was malformed")]
    IncorrectParameter { path: String },

    #[error("{message}")]
    NotImplemented { path: String, message: String },

    #[error("{message}")]
    BadRequest { path: String, message: String },

    #[error("permission to access the requested data is required")]
    PermissionsRequired,

    #[error("{message}")]
    ServerError { message: String },
}

impl HubError {
    pub fn missing_parameter(path: impl Into<String>) -> Self {
        HubError::MissingParameter { path: path.into() }
    }

    pub fn incorrect_parameter(path: impl Into<String>) -> Self {
        HubError::IncorrectParameter { path: path.into() }
    }

    pub fn not_implemented(path: impl Into<String>, message: impl Into<String>) -> Self {
        HubError::NotImplemented {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(path: impl Into<String>, message: impl Into<String>) -> Self {
        HubError::BadRequest {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        HubError::ServerError {
            message: message.into(),
        }
    }

    /// The wire code this failure maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            HubError::MissingParameter { .. }
            | HubError::IncorrectParameter { .. }
            | HubError::BadRequest { .. } => ErrorCode::BadRequest,
            HubError::NotImplemented { .. } => ErrorCode::NotImplemented,
            HubError::PermissionsRequired => ErrorCode::PermissionsRequired,
            HubError::ServerError { .. } => ErrorCode::ServerError,
        }
    }

    /// Dot-path of the offending field, when the failure names one.
    pub fn path(&self) -> Option<&str> {
        match self {
            HubError::MissingParameter { path }
            | HubError::IncorrectParameter { path }
            | HubError::NotImplemented { path, .. }
            | HubError::BadRequest { path, .. } => Some(path),
            HubError::PermissionsRequired | HubError::ServerError { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

/// Failures from the raw cryptographic primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("key material has the wrong length")]
    InvalidKeyLength,

    #[error("invalid hex encoding")]
    InvalidHex,
}
