//! Grant resolution against the store.
//!
//! The controller answers one question: which of the owner's grants apply
//! to this requester for this work? It returns the applicable set, possibly
//! empty. Callers treat an empty set as the authorization failure itself;
//! gating is all-or-nothing per query, never per item.

use std::sync::Arc;

use tracing::warn;

use holdfast_hub_core::{
    Commit, Did, EqFilter, ObjectMetadata, Operation, Result, SCHEMA_CONTEXT,
};
use holdfast_hub_store::Store;

use crate::grant::{Capability, PermissionGrant, GRANT_INTERFACE, GRANT_OBJECT_TYPE};

/// Resolves permission grants through the store's public interface.
pub struct AuthorizationController<S> {
    store: Arc<S>,
}

impl<S: Store> AuthorizationController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Grants permitting `requester` to read the candidate objects.
    ///
    /// A grant applies when it permits R and covers every candidate's
    /// (context, type) pair.
    pub async fn authorize_object_query(
        &self,
        requester: &Did,
        owner: &Did,
        candidates: &[ObjectMetadata],
    ) -> Result<Vec<PermissionGrant>> {
        let grants = self.resolve_grants(requester, owner).await?;
        Ok(grants
            .into_iter()
            .filter(|grant| {
                grant.permits(Capability::Read)
                    && candidates
                        .iter()
                        .all(|meta| grant.covers(&meta.context, &meta.object_type))
            })
            .collect())
    }

    /// Grants permitting `requester` to read the candidate commits.
    pub async fn authorize_commit_query(
        &self,
        requester: &Did,
        owner: &Did,
        candidates: &[Commit],
    ) -> Result<Vec<PermissionGrant>> {
        let grants = self.resolve_grants(requester, owner).await?;
        Ok(grants
            .into_iter()
            .filter(|grant| {
                grant.permits(Capability::Read)
                    && candidates.iter().all(|commit| {
                        let protected = commit.protected_headers();
                        grant.covers(&protected.context, &protected.object_type)
                    })
            })
            .collect())
    }

    /// Grants permitting `requester` to apply the given commit.
    ///
    /// The commit's operation selects the required capability: create needs
    /// C, update needs U, delete needs D.
    pub async fn authorize_write(
        &self,
        requester: &Did,
        owner: &Did,
        commit: &Commit,
    ) -> Result<Vec<PermissionGrant>> {
        let capability = Capability::for_operation(commit.operation());
        let grants = self.resolve_grants(requester, owner).await?;
        let protected = commit.protected_headers();
        Ok(grants
            .into_iter()
            .filter(|grant| {
                grant.permits(capability)
                    && grant.covers(&protected.context, &protected.object_type)
            })
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────
    //   Grant resolution
    // ─────────────────────────────────────────────────────────────────────

    /// All live grants the owner holds for this requester.
    ///
    /// An owner requesting their own data short-circuits to the implicit
    /// all-access grant without touching the store.
    async fn resolve_grants(
        &self,
        requester: &Did,
        owner: &Did,
    ) -> Result<Vec<PermissionGrant>> {
        if requester == owner {
            return Ok(vec![PermissionGrant::owner_grant(owner)]);
        }

        let filters = [
            EqFilter::one("interface", GRANT_INTERFACE),
            EqFilter::one("context", SCHEMA_CONTEXT),
            EqFilter::one("type", GRANT_OBJECT_TYPE),
        ];
        let objects = self.drain_objects(owner, &filters).await?;

        let mut grants = Vec::new();
        for object in objects {
            if let Some(grant) = self.latest_grant(owner, &object.id).await? {
                if &grant.grantee == requester {
                    grants.push(grant);
                }
            }
        }
        Ok(grants)
    }

    /// The current state of one grant object, `None` when deleted or when
    /// its stored payload does not decode as a grant.
    async fn latest_grant(&self, owner: &Did, object_id: &str) -> Result<Option<PermissionGrant>> {
        let filters = [EqFilter::one("object_id", object_id)];
        let commits = self.drain_commits(owner, &filters).await?;

        let Some(latest) = commits.iter().max_by(|a, b| {
            (a.protected_headers().committed_at.as_str(), a.revision())
                .cmp(&(b.protected_headers().committed_at.as_str(), b.revision()))
        }) else {
            return Ok(None);
        };

        if latest.operation() == Operation::Delete {
            return Ok(None);
        }

        let payload = match latest.decode_payload() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(object_id, %err, "grant object payload does not decode");
                return Ok(None);
            }
        };
        match serde_json::from_value::<PermissionGrant>(payload) {
            Ok(grant) => Ok(Some(grant)),
            Err(err) => {
                warn!(object_id, %err, "grant object payload is not a grant");
                Ok(None)
            }
        }
    }

    async fn drain_objects(
        &self,
        owner: &Did,
        filters: &[EqFilter],
    ) -> Result<Vec<ObjectMetadata>> {
        let mut results = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .store
                .query_objects(owner, filters, token.as_deref())
                .await?;
            results.extend(page.results);
            match page.skip_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(results)
    }

    async fn drain_commits(&self, owner: &Did, filters: &[EqFilter]) -> Result<Vec<Commit>> {
        let mut results = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .store
                .query_commits(owner, filters, token.as_deref())
                .await?;
            results.extend(page.results);
            match page.skip_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdfast_hub_core::{CommitBuilder, Keypair};
    use holdfast_hub_store::MemoryStore;

    fn alice() -> Did {
        Did::new("did:example:alice")
    }

    fn bob() -> Did {
        Did::new("did:example:bob")
    }

    fn grant_commit(
        keypair: &Keypair,
        grantee: &Did,
        allow: &str,
        context: &str,
        object_type: &str,
        committed_at: &str,
    ) -> Commit {
        let grant = PermissionGrant::new(
            alice(),
            grantee.clone(),
            allow,
            context,
            object_type,
        );
        CommitBuilder::new(Operation::Create, "did:example:alice", "did:example:alice#key-1")
            .interface(GRANT_INTERFACE)
            .context(SCHEMA_CONTEXT)
            .object_type(GRANT_OBJECT_TYPE)
            .committed_at(committed_at)
            .payload(serde_json::to_value(&grant).unwrap())
            .sign(keypair)
            .unwrap()
    }

    fn grant_follow_up(
        keypair: &Keypair,
        operation: Operation,
        object_id: &str,
        payload: serde_json::Value,
        committed_at: &str,
    ) -> Commit {
        CommitBuilder::new(operation, "did:example:alice", "did:example:alice#key-1")
            .interface(GRANT_INTERFACE)
            .context(SCHEMA_CONTEXT)
            .object_type(GRANT_OBJECT_TYPE)
            .committed_at(committed_at)
            .object_id(object_id)
            .payload(payload)
            .sign(keypair)
            .unwrap()
    }

    fn note_metadata() -> ObjectMetadata {
        ObjectMetadata {
            interface: "Collections".to_string(),
            context: "https://schema.org".to_string(),
            object_type: "Note".to_string(),
            id: "abc".to_string(),
            sub: alice(),
            created_by: alice(),
            created_at: "2024-05-01T00:00:00.000Z".to_string(),
            commit_strategy: "basic".to_string(),
        }
    }

    fn data_commit(keypair: &Keypair, operation: Operation, object_type: &str) -> Commit {
        let mut builder = CommitBuilder::new(
            operation,
            "did:example:alice",
            "did:example:bob#key-1",
        )
        .context("https://schema.org")
        .object_type(object_type)
        .committed_at("2024-06-01T00:00:00.000Z")
        .payload(serde_json::json!({"text": "hi"}));
        if operation != Operation::Create {
            builder = builder.object_id("abc");
        }
        builder.sign(keypair).unwrap()
    }

    #[tokio::test]
    async fn test_owner_bypasses_store() {
        let controller = AuthorizationController::new(Arc::new(MemoryStore::new()));

        let grants = controller
            .authorize_object_query(&alice(), &alice(), &[note_metadata()])
            .await
            .unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].grantee, alice());
    }

    #[tokio::test]
    async fn test_no_grants_yields_empty_set() {
        let controller = AuthorizationController::new(Arc::new(MemoryStore::new()));

        let grants = controller
            .authorize_object_query(&bob(), &alice(), &[note_metadata()])
            .await
            .unwrap();
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_covering_read_grant_applies() {
        let store = Arc::new(MemoryStore::new());
        let keypair = Keypair::generate();
        let commit = grant_commit(
            &keypair,
            &bob(),
            "R",
            "https://schema.org",
            "Note",
            "2024-05-01T00:00:00.000Z",
        );
        store.commit(&alice(), &commit).await.unwrap();

        let controller = AuthorizationController::new(store);
        let grants = controller
            .authorize_object_query(&bob(), &alice(), &[note_metadata()])
            .await
            .unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].grantee, bob());
    }

    #[tokio::test]
    async fn test_grant_without_read_does_not_apply() {
        let store = Arc::new(MemoryStore::new());
        let keypair = Keypair::generate();
        let commit = grant_commit(
            &keypair,
            &bob(),
            "C",
            "https://schema.org",
            "Note",
            "2024-05-01T00:00:00.000Z",
        );
        store.commit(&alice(), &commit).await.unwrap();

        let controller = AuthorizationController::new(store);
        let grants = controller
            .authorize_object_query(&bob(), &alice(), &[note_metadata()])
            .await
            .unwrap();
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_gating_is_all_or_nothing() {
        let store = Arc::new(MemoryStore::new());
        let keypair = Keypair::generate();
        let commit = grant_commit(
            &keypair,
            &bob(),
            "R",
            "https://schema.org",
            "Note",
            "2024-05-01T00:00:00.000Z",
        );
        store.commit(&alice(), &commit).await.unwrap();

        let mut task = note_metadata();
        task.object_type = "Task".to_string();

        let controller = AuthorizationController::new(store);
        let grants = controller
            .authorize_object_query(&bob(), &alice(), &[note_metadata(), task])
            .await
            .unwrap();
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_deleted_grant_is_gone() {
        let store = Arc::new(MemoryStore::new());
        let keypair = Keypair::generate();
        let commit = grant_commit(
            &keypair,
            &bob(),
            "R",
            "https://schema.org",
            "Note",
            "2024-05-01T00:00:00.000Z",
        );
        let object_id = commit.object_id().to_string();
        store.commit(&alice(), &commit).await.unwrap();

        let delete = grant_follow_up(
            &keypair,
            Operation::Delete,
            &object_id,
            serde_json::json!({}),
            "2024-05-02T00:00:00.000Z",
        );
        store.commit(&alice(), &delete).await.unwrap();

        let controller = AuthorizationController::new(store);
        let grants = controller
            .authorize_object_query(&bob(), &alice(), &[note_metadata()])
            .await
            .unwrap();
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_updated_grant_folds_to_latest() {
        let store = Arc::new(MemoryStore::new());
        let keypair = Keypair::generate();
        let commit = grant_commit(
            &keypair,
            &bob(),
            "R",
            "https://schema.org",
            "Note",
            "2024-05-01T00:00:00.000Z",
        );
        let object_id = commit.object_id().to_string();
        store.commit(&alice(), &commit).await.unwrap();

        // Reassign the grant to carol; bob loses access.
        let reassigned = PermissionGrant::new(
            alice(),
            "did:example:carol",
            "R",
            "https://schema.org",
            "Note",
        );
        let update = grant_follow_up(
            &keypair,
            Operation::Update,
            &object_id,
            serde_json::to_value(&reassigned).unwrap(),
            "2024-05-02T00:00:00.000Z",
        );
        store.commit(&alice(), &update).await.unwrap();

        let controller = AuthorizationController::new(store);
        let for_bob = controller
            .authorize_object_query(&bob(), &alice(), &[note_metadata()])
            .await
            .unwrap();
        assert!(for_bob.is_empty());

        let carol = Did::new("did:example:carol");
        let for_carol = controller
            .authorize_object_query(&carol, &alice(), &[note_metadata()])
            .await
            .unwrap();
        assert_eq!(for_carol.len(), 1);
    }

    #[tokio::test]
    async fn test_write_gating_by_operation() {
        let store = Arc::new(MemoryStore::new());
        let keypair = Keypair::generate();
        let commit = grant_commit(
            &keypair,
            &bob(),
            "C",
            "https://schema.org",
            "Note",
            "2024-05-01T00:00:00.000Z",
        );
        store.commit(&alice(), &commit).await.unwrap();

        let controller = AuthorizationController::new(store);
        let bob_keypair = Keypair::generate();

        let create = data_commit(&bob_keypair, Operation::Create, "Note");
        let grants = controller
            .authorize_write(&bob(), &alice(), &create)
            .await
            .unwrap();
        assert_eq!(grants.len(), 1);

        let update = data_commit(&bob_keypair, Operation::Update, "Note");
        let grants = controller
            .authorize_write(&bob(), &alice(), &update)
            .await
            .unwrap();
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_grant_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let keypair = Keypair::generate();

        // An object in the Permissions interface whose payload is not a
        // grant at all.
        let commit = CommitBuilder::new(
            Operation::Create,
            "did:example:alice",
            "did:example:alice#key-1",
        )
        .interface(GRANT_INTERFACE)
        .context(SCHEMA_CONTEXT)
        .object_type(GRANT_OBJECT_TYPE)
        .committed_at("2024-05-01T00:00:00.000Z")
        .payload(serde_json::json!({"not": "a grant"}))
        .sign(&keypair)
        .unwrap();
        store.commit(&alice(), &commit).await.unwrap();

        let controller = AuthorizationController::new(store);
        let grants = controller
            .authorize_object_query(&bob(), &alice(), &[])
            .await
            .unwrap();
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_empty_candidate_set_still_needs_a_grant() {
        let controller = AuthorizationController::new(Arc::new(MemoryStore::new()));

        let grants = controller
            .authorize_commit_query(&bob(), &alice(), &[])
            .await
            .unwrap();
        assert!(grants.is_empty());
    }
}
