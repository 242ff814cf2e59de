//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: identities with full key
//! material, a resolver serving their documents, and a store wrapper that
//! records every query it sees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::RngCore;

use holdfast_hub_core::{
    Commit, Did, DidDocument, EqFilter, Keypair, ObjectMetadata, Operation, Resolver,
    ResolverError, SCHEMA_CONTEXT,
};
use holdfast_hub_envelope::{HubKeys, X25519StaticSecret};
use holdfast_hub_perms::{PermissionGrant, GRANT_INTERFACE, GRANT_OBJECT_TYPE};
use holdfast_hub_store::{CommitResponse, MemoryStore, Page, Store};

/// A test identity with both key halves and a DID document to serve.
pub struct TestIdentity {
    pub did: Did,
    /// Key id of the signing key, `<did>#sign-1`.
    pub kid: String,
    pub signing: Keypair,
    agreement_seed: [u8; 32],
}

impl TestIdentity {
    /// Create a new identity with random keys.
    pub fn new(did: &str) -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        let did = Did::new(did);
        Self {
            kid: did.key_id("sign-1"),
            did,
            signing: Keypair::generate(),
            agreement_seed: seed,
        }
    }

    /// Create with deterministic keys from a seed.
    pub fn with_seed(did: &str, seed: [u8; 32]) -> Self {
        let did = Did::new(did);
        Self {
            kid: did.key_id("sign-1"),
            did,
            signing: Keypair::from_seed(&seed),
            agreement_seed: seed,
        }
    }

    /// The key-agreement secret.
    pub fn agreement(&self) -> X25519StaticSecret {
        X25519StaticSecret::from_bytes(self.agreement_seed)
    }

    /// The DID document a resolver serves for this identity.
    pub fn document(&self) -> DidDocument {
        DidDocument::new(self.did.clone())
            .with_signing_key("sign-1", self.signing.public_key())
            .with_key_agreement("agree-1", self.agreement().public_key())
    }

    /// Key material in the form the hub side consumes.
    pub fn hub_keys(&self) -> HubKeys {
        HubKeys::new(
            self.did.clone(),
            self.kid.clone(),
            self.signing.clone(),
            self.agreement(),
        )
    }
}

/// A resolver backed by a fixed set of documents.
#[derive(Default)]
pub struct StaticResolver {
    documents: HashMap<String, DidDocument>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document to serve.
    pub fn register(mut self, document: DidDocument) -> Self {
        self.documents
            .insert(document.did.as_str().to_string(), document);
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, did: &Did) -> Result<DidDocument, ResolverError> {
        self.documents
            .get(did.as_str())
            .cloned()
            .ok_or_else(|| ResolverError::NotFound(did.clone()))
    }
}

/// A resolver serving the documents of the given identities.
pub fn resolver_for(identities: &[&TestIdentity]) -> Arc<StaticResolver> {
    let mut resolver = StaticResolver::new();
    for identity in identities {
        resolver = resolver.register(identity.document());
    }
    Arc::new(resolver)
}

/// A create commit storing a permission grant in the owner's hub.
pub fn grant_commit(owner: &TestIdentity, grant: &PermissionGrant, committed_at: &str) -> Commit {
    holdfast_hub_core::CommitBuilder::new(Operation::Create, owner.did.clone(), owner.kid.clone())
        .interface(GRANT_INTERFACE)
        .context(SCHEMA_CONTEXT)
        .object_type(GRANT_OBJECT_TYPE)
        .committed_at(committed_at)
        .payload(serde_json::to_value(grant).expect("grants serialize"))
        .sign(&owner.signing)
        .expect("grant commit builds")
}

/// One recorded call to a store query method.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub owner: Did,
    pub filters: Vec<EqFilter>,
    pub skip_token: Option<String>,
}

/// A store that records the exact arguments of every query.
///
/// Wraps a [`MemoryStore`], so recorded scenarios still see real data flow.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    object_queries: Mutex<Vec<RecordedQuery>>,
    commit_queries: Mutex<Vec<RecordedQuery>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `query_objects` call seen so far, in order.
    pub fn object_queries(&self) -> Vec<RecordedQuery> {
        self.object_queries.lock().unwrap().clone()
    }

    /// Every `query_commits` call seen so far, in order.
    pub fn commit_queries(&self) -> Vec<RecordedQuery> {
        self.commit_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn commit(
        &self,
        owner: &Did,
        commit: &Commit,
    ) -> holdfast_hub_store::Result<CommitResponse> {
        self.inner.commit(owner, commit).await
    }

    async fn query_objects(
        &self,
        owner: &Did,
        filters: &[EqFilter],
        skip_token: Option<&str>,
    ) -> holdfast_hub_store::Result<Page<ObjectMetadata>> {
        self.object_queries.lock().unwrap().push(RecordedQuery {
            owner: owner.clone(),
            filters: filters.to_vec(),
            skip_token: skip_token.map(String::from),
        });
        self.inner.query_objects(owner, filters, skip_token).await
    }

    async fn query_commits(
        &self,
        owner: &Did,
        filters: &[EqFilter],
        skip_token: Option<&str>,
    ) -> holdfast_hub_store::Result<Page<Commit>> {
        self.commit_queries.lock().unwrap().push(RecordedQuery {
            owner: owner.clone(),
            filters: filters.to_vec(),
            skip_token: skip_token.map(String::from),
        });
        self.inner.query_commits(owner, filters, skip_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdfast_hub_core::CommitBuilder;
    use serde_json::json;

    #[tokio::test]
    async fn test_identity_document_carries_both_keys() {
        let alice = TestIdentity::new("did:example:alice");
        let document = alice.document();

        assert!(document.signing_key(&alice.kid).is_some());
        assert_eq!(
            document.encryption_key().copied(),
            Some(alice.agreement().public_key())
        );
    }

    #[tokio::test]
    async fn test_seeded_identity_is_deterministic() {
        let a = TestIdentity::with_seed("did:example:alice", [7; 32]);
        let b = TestIdentity::with_seed("did:example:alice", [7; 32]);

        assert_eq!(a.signing.public_key(), b.signing.public_key());
        assert_eq!(a.agreement().public_key(), b.agreement().public_key());
    }

    #[tokio::test]
    async fn test_resolver_serves_registered_identities() {
        let alice = TestIdentity::new("did:example:alice");
        let bob = TestIdentity::new("did:example:bob");
        let resolver = resolver_for(&[&alice, &bob]);

        assert!(resolver.resolve(&alice.did).await.is_ok());
        assert!(resolver.resolve(&bob.did).await.is_ok());
        assert!(resolver
            .resolve(&Did::new("did:example:mallory"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_recording_store_captures_arguments() {
        let store = RecordingStore::new();
        let alice = TestIdentity::new("did:example:alice");

        let commit = CommitBuilder::new(Operation::Create, alice.did.clone(), alice.kid.clone())
            .context("https://schema.org")
            .object_type("Note")
            .committed_at("2024-05-01T00:00:00.000Z")
            .payload(json!({"text": "hi"}))
            .sign(&alice.signing)
            .unwrap();
        store.commit(&alice.did, &commit).await.unwrap();

        let filters = [EqFilter::one("interface", "Collections")];
        store
            .query_objects(&alice.did, &filters, Some("0"))
            .await
            .unwrap();

        let recorded = store.object_queries();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].owner, alice.did);
        assert_eq!(recorded[0].filters, filters.to_vec());
        assert_eq!(recorded[0].skip_token.as_deref(), Some("0"));
        assert!(store.commit_queries().is_empty());
    }
}
