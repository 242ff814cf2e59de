//! Decentralized identifiers and key resolution.
//!
//! A hub never stores foreign key material; it resolves the DID named in a
//! commit or request to a document listing that identity's current public
//! keys. Resolution itself is pluggable through the [`Resolver`] trait so
//! tests can use a static map while deployments plug in a network resolver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{Ed25519PublicKey, X25519PublicKey};

/// A decentralized identifier, e.g. `did:example:alice`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    /// Create from a DID string.
    pub fn new(did: impl Into<String>) -> Self {
        Self(did.into())
    }

    /// Extract the DID from a key identifier.
    ///
    /// A key id is a DID followed by a fragment, e.g.
    /// `did:example:alice#key-1`; the DID is everything before the first `#`.
    /// A key id without a fragment is already a DID.
    pub fn from_key_id(kid: &str) -> Self {
        match kid.split_once('#') {
            Some((did, _)) => Self(did.to_string()),
            None => Self(kid.to_string()),
        }
    }

    /// Get the DID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form a key identifier by appending a fragment.
    pub fn key_id(&self, fragment: &str) -> String {
        format!("{}#{}", self.0, fragment)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Did({})", self.0)
    }
}

impl From<&str> for Did {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Did {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A public key listed in a DID document, tagged by purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "purpose", rename_all = "kebab-case")]
pub enum PublicKeyEntry {
    /// An Ed25519 key used to verify signatures.
    Signing {
        /// Full key identifier, e.g. `did:example:alice#key-1`.
        id: String,
        key: Ed25519PublicKey,
    },
    /// An X25519 key used for key agreement when sealing messages.
    KeyAgreement {
        id: String,
        key: X25519PublicKey,
    },
}

impl PublicKeyEntry {
    /// The full key identifier of this entry.
    pub fn id(&self) -> &str {
        match self {
            PublicKeyEntry::Signing { id, .. } => id,
            PublicKeyEntry::KeyAgreement { id, .. } => id,
        }
    }
}

/// A resolved DID document: the identity's current public keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    pub did: Did,
    pub keys: Vec<PublicKeyEntry>,
}

impl DidDocument {
    /// Create an empty document for the given DID.
    pub fn new(did: Did) -> Self {
        Self {
            did,
            keys: Vec::new(),
        }
    }

    /// Add a signing key under the given fragment.
    pub fn with_signing_key(mut self, fragment: &str, key: Ed25519PublicKey) -> Self {
        let id = self.did.key_id(fragment);
        self.keys.push(PublicKeyEntry::Signing { id, key });
        self
    }

    /// Add a key-agreement key under the given fragment.
    pub fn with_key_agreement(mut self, fragment: &str, key: X25519PublicKey) -> Self {
        let id = self.did.key_id(fragment);
        self.keys.push(PublicKeyEntry::KeyAgreement { id, key });
        self
    }

    /// Look up a signing key by its full key identifier.
    pub fn signing_key(&self, kid: &str) -> Option<&Ed25519PublicKey> {
        self.keys.iter().find_map(|entry| match entry {
            PublicKeyEntry::Signing { id, key } if id == kid => Some(key),
            _ => None,
        })
    }

    /// The key responses to this identity are sealed to.
    ///
    /// Documents may list several key-agreement keys; the first one listed
    /// is the current encryption key.
    pub fn encryption_key(&self) -> Option<&X25519PublicKey> {
        self.keys.iter().find_map(|entry| match entry {
            PublicKeyEntry::KeyAgreement { key, .. } => Some(key),
            _ => None,
        })
    }
}

/// Errors from DID resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("DID not found: {0}")]
    NotFound(Did),

    #[error("resolution failed: {0}")]
    Failed(String),
}

/// Resolves a DID to its current document.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, did: &Did) -> Result<DidDocument, ResolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_did_from_key_id() {
        let did = Did::from_key_id("did:example:alice#key-1");
        assert_eq!(did.as_str(), "did:example:alice");

        // A bare DID passes through unchanged.
        let bare = Did::from_key_id("did:example:bob");
        assert_eq!(bare.as_str(), "did:example:bob");

        // Only the first '#' splits.
        let odd = Did::from_key_id("did:example:carol#key#extra");
        assert_eq!(odd.as_str(), "did:example:carol");
    }

    #[test]
    fn test_key_id_roundtrip() {
        let did = Did::new("did:example:alice");
        let kid = did.key_id("key-1");
        assert_eq!(kid, "did:example:alice#key-1");
        assert_eq!(Did::from_key_id(&kid), did);
    }

    #[test]
    fn test_document_key_lookup() {
        let keypair = Keypair::generate();
        let did = Did::new("did:example:alice");
        let doc = DidDocument::new(did.clone())
            .with_signing_key("key-1", keypair.public_key())
            .with_key_agreement("enc-1", crate::crypto::X25519PublicKey::from_bytes([7u8; 32]));

        assert_eq!(
            doc.signing_key("did:example:alice#key-1"),
            Some(&keypair.public_key())
        );
        assert_eq!(doc.signing_key("did:example:alice#key-2"), None);
        assert_eq!(
            doc.encryption_key(),
            Some(&crate::crypto::X25519PublicKey::from_bytes([7u8; 32]))
        );
    }

    #[test]
    fn test_encryption_key_prefers_first_listed() {
        let did = Did::new("did:example:alice");
        let doc = DidDocument::new(did)
            .with_key_agreement("enc-1", crate::crypto::X25519PublicKey::from_bytes([1u8; 32]))
            .with_key_agreement("enc-2", crate::crypto::X25519PublicKey::from_bytes([2u8; 32]));

        assert_eq!(
            doc.encryption_key(),
            Some(&crate::crypto::X25519PublicKey::from_bytes([1u8; 32]))
        );
    }

    #[test]
    fn test_did_serde_transparent() {
        let did = Did::new("did:example:alice");
        let json = serde_json::to_string(&did).unwrap();
        assert_eq!(json, "\"did:example:alice\"");
        let back: Did = serde_json::from_str(&json).unwrap();
        assert_eq!(back, did);
    }
}
