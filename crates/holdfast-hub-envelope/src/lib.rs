//! # Holdfast Hub Envelope
//!
//! Authenticated request envelope for the Holdfast Hub.
//!
//! ## Overview
//!
//! Every buffer crossing the hub boundary is a compact JWS wrapped in an
//! anonymous-sender sealed layer. Inbound, the hub decrypts and then
//! verifies; outbound, it signs and then encrypts. Requests without a
//! bearer token get one issued instead of being routed.
//!
//! ## Key Properties
//!
//! - **Decrypt-then-verify inbound**: the signature covers the plaintext
//!   the hub actually acts on
//! - **Sign-then-encrypt outbound**: responses are authentic and private,
//!   error bodies included
//! - **Opaque rejection**: every pre-authentication failure looks the same
//!   from outside
//! - **Stateless tokens**: bearer tokens verify against the hub's own key,
//!   no session storage
//!
//! ## Usage
//!
//! ```rust,no_run
//! use holdfast_hub_envelope::{EnvelopeProcessor, HubKeys, Inbound, X25519StaticSecret};
//! use holdfast_hub_core::{Did, Keypair};
//! use std::sync::Arc;
//!
//! async fn example() {
//!     // let resolver: Arc<impl Resolver> = ...;
//!     let keys = HubKeys::new(
//!         Did::new("did:example:hub"),
//!         "did:example:hub#sign-1",
//!         Keypair::generate(),
//!         X25519StaticSecret::generate(),
//!     );
//!     // let processor = EnvelopeProcessor::new(keys, resolver, 300_000);
//!
//!     // match processor.verify(&buffer, now).await? {
//!     //     Inbound::TokenIssued(reply) => send(reply),
//!     //     Inbound::Request(request) => {
//!     //         let body = handle(&request.body);
//!     //         send(processor.respond(&request, &body)?);
//!     //     }
//!     // }
//! }
//! ```
//!
//! ## Layering
//!
//! ```text
//! outbound                               inbound
//!   body                                   SealedEnvelope (CBOR)
//!    | sign (Ed25519, compact JWS)          | open (X25519 + ChaCha20)
//!    v                                      v
//!   header.payload.signature              header.payload.signature
//!    | seal (X25519 + ChaCha20)             | verify (resolved kid)
//!    v                                      v
//!   SealedEnvelope (CBOR)                  body + authenticated identity
//! ```

pub mod crypto;
pub mod error;
pub mod jws;
pub mod processor;
pub mod seal;
pub mod token;

pub use crypto::{EphemeralKeyPair, SealKey, SealNonce, SharedKey, X25519StaticSecret};
pub use error::{EnvelopeError, Result};
pub use jws::{sign_compact, verify_compact, JwsHeader, VerifiedJws};
pub use processor::{EnvelopeProcessor, HubKeys, Inbound, Rejection, VerifiedRequest};
pub use seal::{SealedEnvelope, SEAL_VERSION};
pub use token::TokenClaims;
