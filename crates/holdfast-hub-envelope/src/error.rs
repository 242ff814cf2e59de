//! Error types for the envelope layer.
//!
//! These never reach a requester directly. A failure while opening an
//! inbound envelope collapses into an opaque [`crate::Rejection`]; a failure
//! after authentication is mapped onto a `HubError` and travels back inside
//! a sealed error response.

use thiserror::Error;

/// Errors that can occur while sealing, opening, signing, or verifying
/// envelopes.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Envelope bytes did not decode as the expected structure.
    #[error("envelope decoding failed: {0}")]
    Decode(String),

    /// The envelope names a format version this hub does not speak.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    /// Authenticated decryption failed.
    #[error("decryption failed")]
    Decrypt,

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// A compact JWS was structurally invalid.
    #[error("malformed JWS: {0}")]
    MalformedJws(String),

    /// A JWS signature did not verify against the resolved key.
    #[error("signature verification failed")]
    BadSignature,

    /// DID resolution failed or found no document.
    #[error("could not resolve '{0}'")]
    Resolution(String),

    /// The signer's document lists no key-agreement key to seal replies to.
    #[error("no key-agreement key published for '{0}'")]
    NoEncryptionKey(String),

    /// A bearer token was missing, expired, or not issued by this hub.
    #[error("token rejected: {0}")]
    InvalidToken(String),
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

impl From<EnvelopeError> for holdfast_hub_core::HubError {
    fn from(error: EnvelopeError) -> Self {
        holdfast_hub_core::HubError::server(error.to_string())
    }
}
