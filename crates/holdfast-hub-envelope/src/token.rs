//! Hub-issued bearer tokens.
//!
//! When a request arrives without a `tok` header member, the hub answers by
//! issuing a fresh token instead of processing the body. The token is a
//! compact JWS signed by the hub's own key, so validation needs no storage
//! and no resolution: the hub checks its own signature, the bound subject,
//! and the expiry.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use holdfast_hub_core::encoding;
use holdfast_hub_core::{Did, Ed25519PublicKey, Ed25519Signature, Keypair};

use crate::error::{EnvelopeError, Result};
use crate::jws::JwsHeader;

/// Claims carried in a hub bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The identity the token is bound to.
    pub sub: Did,

    /// Issued-at, unix milliseconds.
    pub iat: i64,

    /// Expiry, unix milliseconds.
    pub exp: i64,

    /// Random value making every issued token distinct.
    pub nonce: String,
}

/// Issue a token for `sub`, signed by the hub's key.
pub fn issue(
    keypair: &Keypair,
    kid: &str,
    sub: &Did,
    lifetime_ms: i64,
    now: i64,
) -> Result<String> {
    let mut nonce = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut nonce);

    let claims = TokenClaims {
        sub: sub.clone(),
        iat: now,
        exp: now + lifetime_ms,
        nonce: hex::encode(nonce),
    };
    let payload =
        serde_json::to_vec(&claims).map_err(|e| EnvelopeError::InvalidToken(e.to_string()))?;

    crate::jws::sign_compact(&JwsHeader::new(kid), &payload, keypair)
}

/// Validate a token presented by `sub` against the hub's own public key.
pub fn validate(
    token: &str,
    hub_key: &Ed25519PublicKey,
    sub: &Did,
    now: i64,
) -> Result<TokenClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(EnvelopeError::InvalidToken(format!(
            "expected 3 parts, got {}",
            parts.len()
        )));
    }
    let (header_b64, payload_b64, signature_b64) = (parts[0], parts[1], parts[2]);

    let header_bytes = encoding::decode(header_b64)
        .map_err(|e| EnvelopeError::InvalidToken(format!("header: {e}")))?;
    let header: JwsHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| EnvelopeError::InvalidToken(format!("header: {e}")))?;
    if header.alg != "EdDSA" {
        return Err(EnvelopeError::InvalidToken(format!(
            "unsupported alg '{}'",
            header.alg
        )));
    }

    // Tokens verify against the hub's own key, never the header kid.
    let signature_bytes = encoding::decode(signature_b64)
        .map_err(|e| EnvelopeError::InvalidToken(format!("signature: {e}")))?;
    let signature = Ed25519Signature::from_slice(&signature_bytes)
        .map_err(|_| EnvelopeError::InvalidToken("bad signature length".to_string()))?;

    let signing_input = format!("{header_b64}.{payload_b64}");
    hub_key
        .verify(signing_input.as_bytes(), &signature)
        .map_err(|_| EnvelopeError::InvalidToken("signature mismatch".to_string()))?;

    let payload = encoding::decode(payload_b64)
        .map_err(|e| EnvelopeError::InvalidToken(format!("claims: {e}")))?;
    let claims: TokenClaims = serde_json::from_slice(&payload)
        .map_err(|e| EnvelopeError::InvalidToken(format!("claims: {e}")))?;

    if &claims.sub != sub {
        return Err(EnvelopeError::InvalidToken(format!(
            "token bound to '{}', presented by '{}'",
            claims.sub.as_str(),
            sub.as_str()
        )));
    }
    if now >= claims.exp {
        return Err(EnvelopeError::InvalidToken("token expired".to_string()));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;
    const LIFETIME: i64 = 300_000;

    fn hub() -> (Keypair, Did) {
        (Keypair::generate(), Did::new("did:example:alice"))
    }

    #[test]
    fn test_issue_validate_roundtrip() {
        let (keypair, sub) = hub();
        let token = issue(&keypair, "did:example:hub#key-1", &sub, LIFETIME, NOW).unwrap();

        let claims = validate(&token, &keypair.public_key(), &sub, NOW + 1_000).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + LIFETIME);
        assert_eq!(claims.nonce.len(), 32);
    }

    #[test]
    fn test_issued_tokens_are_distinct() {
        let (keypair, sub) = hub();
        let a = issue(&keypair, "did:example:hub#key-1", &sub, LIFETIME, NOW).unwrap();
        let b = issue(&keypair, "did:example:hub#key-1", &sub, LIFETIME, NOW).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_token_rejected() {
        let (keypair, sub) = hub();
        let token = issue(&keypair, "did:example:hub#key-1", &sub, LIFETIME, NOW).unwrap();

        let err = validate(&token, &keypair.public_key(), &sub, NOW + LIFETIME).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidToken(_)));
    }

    #[test]
    fn test_wrong_subject_rejected() {
        let (keypair, sub) = hub();
        let token = issue(&keypair, "did:example:hub#key-1", &sub, LIFETIME, NOW).unwrap();

        let mallory = Did::new("did:example:mallory");
        let err = validate(&token, &keypair.public_key(), &mallory, NOW + 1_000).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidToken(_)));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let (keypair, sub) = hub();
        let token = issue(&keypair, "did:example:hub#key-1", &sub, LIFETIME, NOW).unwrap();

        let other = Keypair::generate();
        let err = validate(&token, &other.public_key(), &sub, NOW + 1_000).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidToken(_)));
    }

    #[test]
    fn test_garbage_rejected() {
        let (keypair, sub) = hub();
        let err = validate("not-a-token", &keypair.public_key(), &sub, NOW).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidToken(_)));
    }
}
