//! Request controllers.
//!
//! One controller per request shape. Writes verify the commit signature,
//! gate on a write grant, then apply; queries compile, fetch, then gate on
//! a read grant over the results. An empty grant set is the authorization
//! failure: the caller sees `permissions_required`, never a partial page.

use std::sync::Arc;

use holdfast_hub_core::{
    CommitQueryRequest, CommitQueryResponse, CommitVerifier, HubError, ObjectQueryRequest,
    ObjectQueryResponse, Response, Result, WriteRequest, WriteResponse,
};
use holdfast_hub_perms::AuthorizationController;
use holdfast_hub_store::Store;

use crate::query::{compile_commit_query, compile_object_query};

/// Handles writes and object queries for every interface.
///
/// The four interfaces share object semantics; routing only decides whether
/// the declared interface name is one the hub serves.
pub struct ObjectController<S, V> {
    store: Arc<S>,
    authorization: Arc<AuthorizationController<S>>,
    verifier: Arc<V>,
}

impl<S: Store, V: CommitVerifier> ObjectController<S, V> {
    pub fn new(
        store: Arc<S>,
        authorization: Arc<AuthorizationController<S>>,
        verifier: Arc<V>,
    ) -> Self {
        Self {
            store,
            authorization,
            verifier,
        }
    }

    /// Apply one commit: verify its signature, gate, store.
    ///
    /// Authorization runs before the store sees the commit, so an
    /// unauthorized write leaves no trace.
    pub async fn handle_write(&self, request: &WriteRequest) -> Result<Response> {
        self.verifier.verify(&request.commit).await?;

        let grants = self
            .authorization
            .authorize_write(&request.base.iss, &request.base.sub, &request.commit)
            .await?;
        if grants.is_empty() {
            return Err(HubError::PermissionsRequired);
        }

        let committed = self
            .store
            .commit(&request.base.sub, &request.commit)
            .await?;
        Ok(WriteResponse::new(committed.known_revisions).into())
    }

    /// Return one page of the objects the query names.
    ///
    /// Grants are checked against the fetched results, not the filters, so
    /// coverage is decided over what would actually be disclosed.
    pub async fn handle_object_query(&self, request: &ObjectQueryRequest) -> Result<Response> {
        let compiled = compile_object_query(request);
        let page = self
            .store
            .query_objects(
                &compiled.owner,
                &compiled.filters,
                compiled.skip_token.as_deref(),
            )
            .await?;

        let grants = self
            .authorization
            .authorize_object_query(&request.base.iss, &compiled.owner, &page.results)
            .await?;
        if grants.is_empty() {
            return Err(HubError::PermissionsRequired);
        }

        Ok(ObjectQueryResponse::new(page.results, page.skip_token).into())
    }
}

/// Handles commit queries, which are interface-agnostic.
pub struct CommitQueryController<S> {
    store: Arc<S>,
    authorization: Arc<AuthorizationController<S>>,
}

impl<S: Store> CommitQueryController<S> {
    pub fn new(store: Arc<S>, authorization: Arc<AuthorizationController<S>>) -> Self {
        Self {
            store,
            authorization,
        }
    }

    pub async fn handle(&self, request: &CommitQueryRequest) -> Result<Response> {
        // Field projection would change the response shape, so it is
        // refused before any store work happens.
        if !request.fields.is_empty() {
            return Err(HubError::not_implemented(
                "fields",
                "A new type of response is required",
            ));
        }

        let compiled = compile_commit_query(request);
        let page = self
            .store
            .query_commits(
                &compiled.owner,
                &compiled.filters,
                compiled.skip_token.as_deref(),
            )
            .await?;

        let grants = self
            .authorization
            .authorize_commit_query(&request.base.iss, &compiled.owner, &page.results)
            .await?;
        if grants.is_empty() {
            return Err(HubError::PermissionsRequired);
        }

        Ok(CommitQueryResponse::new(page.results, page.skip_token).into())
    }
}
