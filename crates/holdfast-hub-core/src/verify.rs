//! Commit signature verification.
//!
//! A commit names its signing key by kid; verification resolves the issuer's
//! DID document and checks the signature against the key the document lists
//! under that kid. The trait seam lets tests swap in a verifier that records
//! or refuses commits without touching resolution.

use async_trait::async_trait;
use std::sync::Arc;

use crate::commit::Commit;
use crate::crypto::Ed25519Signature;
use crate::did::{Resolver, ResolverError};
use crate::encoding;
use crate::error::{HubError, Result};

/// Verifies that a commit was signed by the key it names.
#[async_trait]
pub trait CommitVerifier: Send + Sync {
    async fn verify(&self, commit: &Commit) -> Result<()>;
}

/// The standard verifier: resolve the issuer, look up the kid, check the
/// Ed25519 signature over the commit's signing input.
pub struct SignatureVerifier<R> {
    resolver: Arc<R>,
}

impl<R: Resolver> SignatureVerifier<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<R: Resolver> CommitVerifier for SignatureVerifier<R> {
    async fn verify(&self, commit: &Commit) -> Result<()> {
        let encoded = commit
            .signature()
            .ok_or_else(|| HubError::missing_parameter("commit.signature"))?;
        let bytes = encoding::decode(encoded)
            .map_err(|_| HubError::incorrect_parameter("commit.signature"))?;
        let signature = Ed25519Signature::from_slice(&bytes)
            .map_err(|_| HubError::incorrect_parameter("commit.signature"))?;

        let iss = &commit.headers().iss;
        let kid = &commit.protected_headers().kid;

        let document = match self.resolver.resolve(iss).await {
            Ok(document) => document,
            Err(ResolverError::NotFound(did)) => {
                return Err(HubError::bad_request(
                    "commit.protected.kid",
                    format!("could not resolve DID '{did}'"),
                ));
            }
            Err(ResolverError::Failed(message)) => {
                return Err(HubError::server(format!("DID resolution failed: {message}")));
            }
        };

        let key = document.signing_key(kid).ok_or_else(|| {
            HubError::bad_request(
                "commit.protected.kid",
                format!("DID document for '{iss}' lists no signing key '{kid}'"),
            )
        })?;

        key.verify(commit.signing_input().as_bytes(), &signature)
            .map_err(|_| HubError::bad_request("commit.signature", "commit signature is invalid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{CommitBuilder, Operation};
    use crate::crypto::Keypair;
    use crate::did::{Did, DidDocument};
    use serde_json::json;
    use std::collections::HashMap;

    struct StaticResolver {
        documents: HashMap<String, DidDocument>,
    }

    impl StaticResolver {
        fn with(document: DidDocument) -> Arc<Self> {
            let mut documents = HashMap::new();
            documents.insert(document.did.as_str().to_string(), document);
            Arc::new(Self { documents })
        }
    }

    #[async_trait]
    impl Resolver for StaticResolver {
        async fn resolve(&self, did: &Did) -> std::result::Result<DidDocument, ResolverError> {
            self.documents
                .get(did.as_str())
                .cloned()
                .ok_or_else(|| ResolverError::NotFound(did.clone()))
        }
    }

    fn commit_signed_by(keypair: &Keypair) -> Commit {
        CommitBuilder::new(Operation::Create, "did:example:alice", "did:example:alice#key-1")
            .context("https://schema.org")
            .object_type("MusicPlaylist")
            .committed_at("2024-05-01T00:00:00.000Z")
            .payload(json!({"title": "Road Trip"}))
            .sign(keypair)
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_signature_verifies() {
        let keypair = Keypair::generate();
        let document = DidDocument::new(Did::new("did:example:alice"))
            .with_signing_key("key-1", keypair.public_key());
        let verifier = SignatureVerifier::new(StaticResolver::with(document));

        verifier.verify(&commit_signed_by(&keypair)).await.unwrap();
    }

    #[tokio::test]
    async fn test_signature_from_wrong_key_rejected() {
        let alice = Keypair::generate();
        let mallory = Keypair::generate();
        let document = DidDocument::new(Did::new("did:example:alice"))
            .with_signing_key("key-1", alice.public_key());
        let verifier = SignatureVerifier::new(StaticResolver::with(document));

        // Signed by mallory's key but claiming alice's kid.
        let err = verifier.verify(&commit_signed_by(&mallory)).await.unwrap_err();
        match err {
            HubError::BadRequest { path, .. } => assert_eq!(path, "commit.signature"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_signature() {
        let keypair = Keypair::generate();
        let document = DidDocument::new(Did::new("did:example:alice"))
            .with_signing_key("key-1", keypair.public_key());
        let verifier = SignatureVerifier::new(StaticResolver::with(document));

        let mut value = commit_signed_by(&keypair).to_value();
        value.as_object_mut().unwrap().remove("signature");
        let unsigned = Commit::from_value(&value).unwrap();

        let err = verifier.verify(&unsigned).await.unwrap_err();
        match err {
            HubError::MissingParameter { path } => assert_eq!(path, "commit.signature"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_kid_rejected() {
        let keypair = Keypair::generate();
        // Document lists a different fragment than the commit's kid.
        let document = DidDocument::new(Did::new("did:example:alice"))
            .with_signing_key("key-2", keypair.public_key());
        let verifier = SignatureVerifier::new(StaticResolver::with(document));

        let err = verifier.verify(&commit_signed_by(&keypair)).await.unwrap_err();
        match err {
            HubError::BadRequest { path, .. } => assert_eq!(path, "commit.protected.kid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unresolvable_issuer_rejected() {
        let keypair = Keypair::generate();
        let document = DidDocument::new(Did::new("did:example:somebody-else"));
        let verifier = SignatureVerifier::new(StaticResolver::with(document));

        let err = verifier.verify(&commit_signed_by(&keypair)).await.unwrap_err();
        match err {
            HubError::BadRequest { path, .. } => assert_eq!(path, "commit.protected.kid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_corrupt_signature_rejected() {
        let keypair = Keypair::generate();
        let document = DidDocument::new(Did::new("did:example:alice"))
            .with_signing_key("key-1", keypair.public_key());
        let verifier = SignatureVerifier::new(StaticResolver::with(document));

        let mut value = commit_signed_by(&keypair).to_value();
        value["signature"] = json!("AAAA");
        let corrupt = Commit::from_value(&value).unwrap();

        let err = verifier.verify(&corrupt).await.unwrap_err();
        match err {
            HubError::IncorrectParameter { path } => assert_eq!(path, "commit.signature"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
