//! Store trait: the abstract interface for commit persistence.
//!
//! This trait keeps the hub storage-agnostic. The in-memory implementation
//! ships here; durable backends implement the same contract.

use async_trait::async_trait;
use holdfast_hub_core::{Commit, Did, EqFilter, ObjectMetadata};

use crate::error::Result;

/// One page of query results.
///
/// `skip_token` is an opaque cursor minted by the store. Callers hand it
/// back unmodified to continue; `None` means the results are exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub skip_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, skip_token: Option<String>) -> Self {
        Self {
            results,
            skip_token,
        }
    }

    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            skip_token: None,
        }
    }
}

/// Result of applying a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResponse {
    /// Every revision known for the written object, oldest first, with the
    /// just-applied revision included.
    pub known_revisions: Vec<String>,
}

/// The Store trait: async interface for commit persistence.
///
/// Data is partitioned by owner DID; a query never sees another owner's
/// partition. All methods are async to support network-backed stores.
///
/// # Design Notes
///
/// - **Idempotent commits**: re-applying a previously accepted commit is a
///   no-op returning the same known revisions, never an error. Revisions
///   are content-addressed, so "same" is byte-exact.
/// - **Deleted objects**: an object whose newest commit is a delete is
///   invisible to `query_objects`; its commit history stays queryable.
/// - **Filters**: equality-only, against the metadata fields of objects or
///   the `object_id`/`rev` of commits. Unknown fields match nothing.
#[async_trait]
pub trait Store: Send + Sync {
    /// Apply a commit to an owner's partition.
    async fn commit(&self, owner: &Did, commit: &Commit) -> Result<CommitResponse>;

    /// Query object metadata in an owner's partition.
    async fn query_objects(
        &self,
        owner: &Did,
        filters: &[EqFilter],
        skip_token: Option<&str>,
    ) -> Result<Page<ObjectMetadata>>;

    /// Query commits in an owner's partition.
    async fn query_commits(
        &self,
        owner: &Did,
        filters: &[EqFilter],
        skip_token: Option<&str>,
    ) -> Result<Page<Commit>>;
}
