//! The sealed (encrypted) layer of the envelope.
//!
//! Everything a hub receives or returns is sealed to its recipient: an
//! ephemeral X25519 key agreement against the recipient's published
//! key-agreement key, a key derived from the shared secret, and
//! ChaCha20-Poly1305 over the signed payload. The envelope itself travels
//! as CBOR.

use serde::{Deserialize, Serialize};

use crate::crypto::{EphemeralKeyPair, SealNonce, X25519PublicKey, X25519StaticSecret};
use crate::error::{EnvelopeError, Result};

/// Current sealed envelope format version.
pub const SEAL_VERSION: u8 = 1;

/// A sealed envelope: the only shape that ever crosses the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    /// Format version.
    pub v: u8,

    /// The sender's ephemeral X25519 public key.
    pub epk: X25519PublicKey,

    /// Nonce used for encryption (unique per envelope).
    pub nonce: SealNonce,

    /// The encrypted payload (includes authentication tag).
    pub ciphertext: Vec<u8>,
}

impl SealedEnvelope {
    /// Seal plaintext to the recipient's key-agreement key.
    pub fn seal(plaintext: &[u8], recipient: &X25519PublicKey) -> Result<Self> {
        let ephemeral = EphemeralKeyPair::generate();
        let epk = ephemeral.public_key();

        let shared = ephemeral.diffie_hellman(recipient);
        let key = shared.derive_seal_key(epk.as_bytes());
        let nonce = SealNonce::generate();
        let ciphertext = key.encrypt(plaintext, &nonce)?;

        Ok(Self {
            v: SEAL_VERSION,
            epk,
            nonce,
            ciphertext,
        })
    }

    /// Open the envelope with the recipient's static secret.
    pub fn open(&self, secret: &X25519StaticSecret) -> Result<Vec<u8>> {
        if self.v != SEAL_VERSION {
            return Err(EnvelopeError::UnsupportedVersion(self.v));
        }

        let shared = secret.diffie_hellman(&self.epk);
        let key = shared.derive_seal_key(self.epk.as_bytes());
        key.decrypt(&self.ciphertext, &self.nonce)
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| EnvelopeError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let recipient = X25519StaticSecret::generate();
        let plaintext = b"the signed request bytes";

        let envelope = SealedEnvelope::seal(plaintext, &recipient.public_key()).unwrap();
        assert_eq!(envelope.v, SEAL_VERSION);
        assert_ne!(envelope.ciphertext, plaintext);

        let opened = envelope.open(&recipient).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_open_with_wrong_secret_fails() {
        let recipient = X25519StaticSecret::generate();
        let other = X25519StaticSecret::generate();

        let envelope = SealedEnvelope::seal(b"secret", &recipient.public_key()).unwrap();
        assert!(matches!(
            envelope.open(&other),
            Err(EnvelopeError::Decrypt)
        ));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let recipient = X25519StaticSecret::generate();
        let mut envelope = SealedEnvelope::seal(b"secret", &recipient.public_key()).unwrap();
        envelope.v = 9;

        assert!(matches!(
            envelope.open(&recipient),
            Err(EnvelopeError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let recipient = X25519StaticSecret::generate();
        let mut envelope = SealedEnvelope::seal(b"secret", &recipient.public_key()).unwrap();
        envelope.ciphertext[0] ^= 0x01;

        assert!(matches!(
            envelope.open(&recipient),
            Err(EnvelopeError::Decrypt)
        ));
    }

    #[test]
    fn test_cbor_roundtrip() {
        let recipient = X25519StaticSecret::generate();
        let envelope = SealedEnvelope::seal(b"payload", &recipient.public_key()).unwrap();

        let bytes = envelope.to_bytes();
        let recovered = SealedEnvelope::from_bytes(&bytes).unwrap();
        assert_eq!(envelope, recovered);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(SealedEnvelope::from_bytes(b"not cbor at all").is_err());
    }

    proptest! {
        #[test]
        fn prop_seal_open_any_payload(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let recipient = X25519StaticSecret::from_bytes([0x33; 32]);
            let envelope = SealedEnvelope::seal(&payload, &recipient.public_key()).unwrap();
            let opened = envelope.open(&recipient).unwrap();
            prop_assert_eq!(opened, payload);
        }
    }
}
