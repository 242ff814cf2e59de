//! Base64url encoding helpers.
//!
//! Every wire string in the protocol (protected headers, payloads, JWS
//! segments, detached signatures) is base64url without padding. Callers keep
//! the encoded strings they received verbatim: a decode/re-encode round trip
//! is never guaranteed to reproduce the signed bytes.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Encode bytes as base64url without padding.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a base64url string.
pub fn decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(encoded)
}

/// Encode a JSON value as base64url over its compact text form.
pub fn encode_json(value: &serde_json::Value) -> String {
    encode(value.to_string())
}

/// Decode a base64url string into a JSON value.
///
/// Returns `None` when the string is not base64url or the decoded bytes are
/// not JSON; callers map that onto an error naming the offending field.
pub fn decode_json(encoded: &str) -> Option<serde_json::Value> {
    let bytes = decode(encoded).ok()?;
    serde_json::from_slice(&bytes).ok()
}
