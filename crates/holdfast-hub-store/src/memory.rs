//! In-memory implementation of the Store trait.
//!
//! Primarily for tests and single-process deployments. Same contract as a
//! durable backend, no persistence.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use holdfast_hub_core::{Commit, Did, EqFilter, ObjectMetadata, Operation};

use crate::error::{Result, StoreError};
use crate::traits::{CommitResponse, Page, Store};

const DEFAULT_PAGE_SIZE: usize = 100;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
/// Skip tokens are stringified offsets into the filtered result set.
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Partition>>,
    page_size: usize,
}

/// One owner's slice of the store.
#[derive(Default)]
struct Partition {
    /// Commits in arrival order.
    commits: Vec<Commit>,

    /// Revisions already applied, for idempotence.
    revisions: HashSet<String>,

    /// Object metadata in creation order.
    objects: Vec<ObjectMetadata>,
}

impl Partition {
    /// The newest commit for an object, ordered by (committed_at, rev).
    fn latest_commit(&self, object_id: &str) -> Option<&Commit> {
        self.commits
            .iter()
            .filter(|c| c.object_id() == object_id)
            .max_by(|a, b| {
                (a.protected_headers().committed_at.as_str(), a.revision())
                    .cmp(&(b.protected_headers().committed_at.as_str(), b.revision()))
            })
    }

    fn is_deleted(&self, object_id: &str) -> bool {
        self.latest_commit(object_id)
            .map(|c| c.operation() == Operation::Delete)
            .unwrap_or(false)
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size. Small sizes make pagination testable.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn commit(&self, owner: &Did, commit: &Commit) -> Result<CommitResponse> {
        let mut inner = self.inner.write().unwrap();
        let partition = inner.entry(owner.as_str().to_string()).or_default();

        // Revisions are content-addressed, so a seen revision means this
        // exact commit was already applied.
        if partition.revisions.insert(commit.revision().to_string()) {
            if let Some(meta) = ObjectMetadata::from_create_commit(commit) {
                partition.objects.push(meta);
            }
            partition.commits.push(commit.clone());
            debug!(
                owner = owner.as_str(),
                revision = commit.revision(),
                "commit applied"
            );
        }

        let mut known: Vec<&Commit> = partition
            .commits
            .iter()
            .filter(|c| c.object_id() == commit.object_id())
            .collect();
        known.sort_by(|a, b| {
            (a.protected_headers().committed_at.as_str(), a.revision())
                .cmp(&(b.protected_headers().committed_at.as_str(), b.revision()))
        });
        let known_revisions = known.iter().map(|c| c.revision().to_string()).collect();

        Ok(CommitResponse { known_revisions })
    }

    async fn query_objects(
        &self,
        owner: &Did,
        filters: &[EqFilter],
        skip_token: Option<&str>,
    ) -> Result<Page<ObjectMetadata>> {
        let inner = self.inner.read().unwrap();
        let Some(partition) = inner.get(owner.as_str()) else {
            return Ok(Page::empty());
        };

        let matches: Vec<ObjectMetadata> = partition
            .objects
            .iter()
            .filter(|meta| filters.iter().all(|f| matches_object(meta, f)))
            .filter(|meta| !partition.is_deleted(&meta.id))
            .cloned()
            .collect();

        paginate(matches, skip_token, self.page_size)
    }

    async fn query_commits(
        &self,
        owner: &Did,
        filters: &[EqFilter],
        skip_token: Option<&str>,
    ) -> Result<Page<Commit>> {
        let inner = self.inner.read().unwrap();
        let Some(partition) = inner.get(owner.as_str()) else {
            return Ok(Page::empty());
        };

        let matches: Vec<Commit> = partition
            .commits
            .iter()
            .filter(|commit| filters.iter().all(|f| matches_commit(commit, f)))
            .cloned()
            .collect();

        paginate(matches, skip_token, self.page_size)
    }
}

fn matches_object(meta: &ObjectMetadata, filter: &EqFilter) -> bool {
    meta.field(&filter.field)
        .map(|value| filter.value.matches(value))
        .unwrap_or(false)
}

fn matches_commit(commit: &Commit, filter: &EqFilter) -> bool {
    let value = match filter.field.as_str() {
        "object_id" => Some(commit.object_id()),
        "rev" | "revision" => Some(commit.revision()),
        _ => None,
    };
    value
        .map(|value| filter.value.matches(value))
        .unwrap_or(false)
}

fn paginate<T>(all: Vec<T>, skip_token: Option<&str>, page_size: usize) -> Result<Page<T>> {
    let offset = match skip_token {
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| StoreError::InvalidSkipToken(token.to_string()))?,
        None => 0,
    };

    let total = all.len();
    let results: Vec<T> = all.into_iter().skip(offset).take(page_size).collect();
    let next = offset + results.len();
    let skip_token = (next < total).then(|| next.to_string());

    Ok(Page::new(results, skip_token))
}
