//! The envelope processor: authenticate inbound buffers, seal outbound ones.
//!
//! Inbound order is decrypt-then-verify, outbound is sign-then-encrypt.
//! That ordering is a protocol contract: the signature always covers the
//! plaintext, and the plaintext is never visible outside the sealed layer.
//!
//! Every failure before an identity is established collapses into the one
//! opaque [`Rejection`], so the boundary cannot be used as a decryption or
//! signature oracle. Causes are recorded on the tracing sink only.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use holdfast_hub_core::{Did, Keypair, Resolver, X25519PublicKey};

use crate::crypto::X25519StaticSecret;
use crate::error::{EnvelopeError, Result};
use crate::jws::{self, JwsHeader};
use crate::seal::SealedEnvelope;
use crate::token;

/// The key material a hub operates with.
pub struct HubKeys {
    /// The hub's own identity.
    pub did: Did,

    /// Key id of the signing key, as listed in the hub's DID document.
    pub kid: String,

    /// Ed25519 keypair for signing responses and bearer tokens.
    pub signing: Keypair,

    /// Static X25519 secret inbound requests are sealed to.
    pub agreement: X25519StaticSecret,
}

impl HubKeys {
    pub fn new(
        did: Did,
        kid: impl Into<String>,
        signing: Keypair,
        agreement: X25519StaticSecret,
    ) -> Self {
        Self {
            did,
            kid: kid.into(),
            signing,
            agreement,
        }
    }
}

/// An inbound buffer after envelope processing.
#[derive(Debug)]
pub enum Inbound {
    /// The sender presented no bearer token. The sealed reply carrying a
    /// fresh token is already built; send it back without routing anything.
    TokenIssued(Vec<u8>),

    /// An authenticated request, ready for routing.
    Request(VerifiedRequest),
}

/// A decrypted, signature-verified, token-checked request.
#[derive(Debug, Clone)]
pub struct VerifiedRequest {
    /// The authenticated identity, derived from the verified signing kid.
    pub requester: Did,

    /// The requester's key-agreement key, captured for sealing the response.
    pub reply_key: X25519PublicKey,

    /// The decrypted request body.
    pub body: Vec<u8>,
}

/// Opaque authentication failure.
///
/// Carries no detail by construction. Whatever went wrong, the caller
/// learns only that the buffer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection;

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("request rejected")
    }
}

impl std::error::Error for Rejection {}

/// Authenticates inbound buffers and seals outbound responses.
pub struct EnvelopeProcessor<R> {
    keys: HubKeys,
    resolver: Arc<R>,
    token_lifetime_ms: i64,
}

impl<R: Resolver> EnvelopeProcessor<R> {
    pub fn new(keys: HubKeys, resolver: Arc<R>, token_lifetime_ms: i64) -> Self {
        Self {
            keys,
            resolver,
            token_lifetime_ms,
        }
    }

    /// The hub's own identity.
    pub fn did(&self) -> &Did {
        &self.keys.did
    }

    /// Decrypt and authenticate an inbound buffer.
    ///
    /// `now` is unix milliseconds, injected so token expiry is testable.
    pub async fn verify(&self, buffer: &[u8], now: i64) -> std::result::Result<Inbound, Rejection> {
        match self.verify_inner(buffer, now).await {
            Ok(inbound) => Ok(inbound),
            Err(cause) => {
                debug!(%cause, "rejecting inbound envelope");
                Err(Rejection)
            }
        }
    }

    async fn verify_inner(&self, buffer: &[u8], now: i64) -> Result<Inbound> {
        let envelope = SealedEnvelope::from_bytes(buffer)?;
        let plaintext = envelope.open(&self.keys.agreement)?;
        let compact = std::str::from_utf8(&plaintext)
            .map_err(|e| EnvelopeError::MalformedJws(e.to_string()))?;

        let verified = jws::verify_compact(compact, self.resolver.as_ref()).await?;

        let reply_key = verified
            .document
            .encryption_key()
            .copied()
            .ok_or_else(|| EnvelopeError::NoEncryptionKey(verified.signer.as_str().to_string()))?;

        match &verified.header.tok {
            None => {
                let sealed = self.issue_token_reply(&verified.signer, &reply_key, now)?;
                Ok(Inbound::TokenIssued(sealed))
            }
            Some(tok) => {
                token::validate(tok, &self.keys.signing.public_key(), &verified.signer, now)?;
                Ok(Inbound::Request(VerifiedRequest {
                    requester: verified.signer,
                    reply_key,
                    body: verified.payload,
                }))
            }
        }
    }

    /// Sign a response body with the hub's key and seal it to the requester.
    ///
    /// Works identically whether `body` encodes success or an error; error
    /// bodies are authenticated and encrypted the same way.
    pub fn respond(&self, request: &VerifiedRequest, body: &[u8]) -> Result<Vec<u8>> {
        self.seal_to(&request.reply_key, body, None)
    }

    fn issue_token_reply(
        &self,
        sub: &Did,
        reply_key: &X25519PublicKey,
        now: i64,
    ) -> Result<Vec<u8>> {
        let token = token::issue(
            &self.keys.signing,
            &self.keys.kid,
            sub,
            self.token_lifetime_ms,
            now,
        )?;

        // The fresh token rides in the reply's own JWS header, mirroring
        // how requests carry theirs.
        self.seal_to(reply_key, b"{}", Some(token))
    }

    fn seal_to(
        &self,
        recipient: &X25519PublicKey,
        body: &[u8],
        token: Option<String>,
    ) -> Result<Vec<u8>> {
        let mut header = JwsHeader::new(&self.keys.kid);
        if let Some(token) = token {
            header = header.with_token(token);
        }

        let compact = jws::sign_compact(&header, body, &self.keys.signing)?;
        let envelope = SealedEnvelope::seal(compact.as_bytes(), recipient)?;
        Ok(envelope.to_bytes())
    }
}
