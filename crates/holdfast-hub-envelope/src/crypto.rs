//! Key agreement and authenticated encryption for sealed envelopes.
//!
//! Provides X25519 key agreement and ChaCha20-Poly1305. The public key type
//! lives in core so DID documents can carry it; the secret halves live here,
//! next to the only code that uses them.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

pub use holdfast_hub_core::X25519PublicKey;

use crate::error::{EnvelopeError, Result};

fn to_dalek(key: &X25519PublicKey) -> PublicKey {
    PublicKey::from(*key.as_bytes())
}

/// An X25519 static secret key: the long-lived key-agreement half of a hub
/// or client identity.
pub struct X25519StaticSecret(StaticSecret);

impl X25519StaticSecret {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(StaticSecret::from(bytes))
    }

    /// Create from seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Derive the public key.
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey::from_bytes(*PublicKey::from(&self.0).as_bytes())
    }

    /// Perform key agreement with a peer's public key.
    pub fn diffie_hellman(&self, peer_public: &X25519PublicKey) -> SharedKey {
        let shared = self.0.diffie_hellman(&to_dalek(peer_public));
        SharedKey(*shared.as_bytes())
    }
}

/// Ephemeral key pair for one-time key agreement. Every sealed envelope
/// gets a fresh one.
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: X25519PublicKey,
}

impl EphemeralKeyPair {
    /// Generate a new ephemeral key pair.
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random_from_rng(rand::thread_rng());
        let public = X25519PublicKey::from_bytes(*PublicKey::from(&secret).as_bytes());
        Self { secret, public }
    }

    /// Get the public key.
    pub fn public_key(&self) -> X25519PublicKey {
        self.public
    }

    /// Perform key agreement with a peer's public key.
    ///
    /// Consumes the ephemeral secret (can only be used once).
    pub fn diffie_hellman(self, peer_public: &X25519PublicKey) -> SharedKey {
        let shared = self.secret.diffie_hellman(&to_dalek(peer_public));
        SharedKey(*shared.as_bytes())
    }
}

/// A shared secret derived from X25519 key agreement.
#[derive(Clone)]
pub struct SharedKey([u8; 32]);

impl SharedKey {
    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive the sealing key from this shared secret.
    ///
    /// The context binds the key to the envelope it seals; callers pass the
    /// ephemeral public key so a transplanted epk cannot reuse a key.
    pub fn derive_seal_key(&self, context: &[u8]) -> SealKey {
        use blake3::Hasher;
        let mut hasher = Hasher::new_derive_key("holdfast-hub-envelope-v1-seal");
        hasher.update(&self.0);
        hasher.update(context);
        SealKey(*hasher.finalize().as_bytes())
    }
}

/// A 256-bit symmetric key for ChaCha20-Poly1305.
#[derive(Clone)]
pub struct SealKey([u8; 32]);

impl SealKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encrypt data with this key.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &SealNonce) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| EnvelopeError::Encrypt(e.to_string()))?;

        let nonce = Nonce::from_slice(&nonce.0);
        cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| EnvelopeError::Encrypt(e.to_string()))
    }

    /// Decrypt data with this key.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &SealNonce) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|_| EnvelopeError::Decrypt)?;

        let nonce = Nonce::from_slice(&nonce.0);
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| EnvelopeError::Decrypt)
    }
}

/// A 96-bit nonce for ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealNonce(pub [u8; 12]);

impl SealNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 12];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_key_agreement() {
        let alice_secret = X25519StaticSecret::generate();
        let bob_secret = X25519StaticSecret::generate();

        let alice_shared = alice_secret.diffie_hellman(&bob_secret.public_key());
        let bob_shared = bob_secret.diffie_hellman(&alice_secret.public_key());

        assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());
    }

    #[test]
    fn test_ephemeral_key_agreement() {
        let hub_secret = X25519StaticSecret::generate();
        let hub_public = hub_secret.public_key();

        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();

        let sender_shared = ephemeral.diffie_hellman(&hub_public);
        let hub_shared = hub_secret.diffie_hellman(&ephemeral_public);

        assert_eq!(sender_shared.as_bytes(), hub_shared.as_bytes());
    }

    #[test]
    fn test_encrypt_decrypt() {
        let key = SealKey::from_bytes([0x17; 32]);
        let nonce = SealNonce::generate();
        let plaintext = b"hello, world!";

        let ciphertext = key.encrypt(plaintext, &nonce).unwrap();
        assert_ne!(ciphertext, plaintext);

        let decrypted = key.decrypt(&ciphertext, &nonce).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_wrong_key_fails() {
        let key1 = SealKey::from_bytes([0x01; 32]);
        let key2 = SealKey::from_bytes([0x02; 32]);
        let nonce = SealNonce::generate();

        let ciphertext = key1.encrypt(b"secret", &nonce).unwrap();
        assert!(key2.decrypt(&ciphertext, &nonce).is_err());
    }

    #[test]
    fn test_seal_key_derivation_deterministic() {
        let shared = SharedKey([0x42; 32]);
        let context = [0x07; 32];

        let key1 = shared.derive_seal_key(&context);
        let key2 = shared.derive_seal_key(&context);
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_seal_key_derivation_binds_context() {
        let shared = SharedKey([0x42; 32]);

        let key1 = shared.derive_seal_key(&[0x01; 32]);
        let key2 = shared.derive_seal_key(&[0x02; 32]);
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }
}
