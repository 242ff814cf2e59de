//! # Holdfast Hub Store
//!
//! Storage abstraction for the Holdfast Hub. Provides a trait-based
//! interface for commit persistence with an in-memory implementation.
//!
//! ## Overview
//!
//! The store module abstracts commit storage behind the [`Store`] trait,
//! keeping the hub storage-agnostic. Data is partitioned by owner DID.
//! [`MemoryStore`] is the in-process implementation; durable backends
//! implement the same contract.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`MemoryStore`] - In-memory, owner-partitioned storage
//! - [`CommitResponse`] - Known revisions after a write
//! - [`Page`] - One page of query results with an opaque skip token
//!
//! ## Usage
//!
//! ```rust,no_run
//! use holdfast_hub_store::{MemoryStore, Store};
//! use holdfast_hub_core::{Did, EqFilter};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     let owner = Did::new("did:example:alice");
//!
//!     // let commit: Commit = ...;
//!     // let response = store.commit(&owner, &commit).await.unwrap();
//!
//!     let filters = [EqFilter::one("interface", "Collections")];
//!     let page = store.query_objects(&owner, &filters, None).await.unwrap();
//!     println!("{} objects", page.results.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent commits**: re-applying an accepted commit is a no-op
//! - **Owner partitions**: a query never sees another owner's data
//! - **Delete semantics**: an object whose newest commit is a delete is
//!   hidden from object queries; its history stays queryable
//! - **Skip tokens**: opaque to callers, minted and consumed by the store

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{CommitResponse, Page, Store};
