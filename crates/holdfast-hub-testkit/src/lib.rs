//! # Holdfast Hub Testkit
//!
//! Testing utilities for the Holdfast Hub.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known commits with expected encodings and revisions
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Identities, resolvers, and a query-recording store
//! - **Client helpers**: The remote side of the envelope protocol
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the revision computation across releases:
//!
//! ```rust
//! use holdfast_hub_testkit::vectors::{all_vectors, build_commit_from_vector};
//!
//! for vector in all_vectors() {
//!     let commit = build_commit_from_vector(&vector);
//!     assert_eq!(commit.revision(), vector.expected_revision);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use holdfast_hub_testkit::generators::{commit_from_params, CommitParams};
//!
//! proptest! {
//!     #[test]
//!     fn revision_is_deterministic(params: CommitParams) {
//!         let a = commit_from_params(&params);
//!         let b = commit_from_params(&params);
//!         prop_assert_eq!(a.revision(), b.revision());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use holdfast_hub_testkit::fixtures::{resolver_for, TestIdentity};
//!
//! let alice = TestIdentity::new("did:example:alice");
//! let hub = TestIdentity::new("did:example:hub");
//! let resolver = resolver_for(&[&alice]);
//! let keys = hub.hub_keys();
//! ```

pub mod client;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use client::{
    commit_query_request, fetch_token, object_query_request, open_reply, roundtrip, seal_request,
    write_request, OpenedReply,
};
pub use fixtures::{grant_commit, resolver_for, RecordedQuery, RecordingStore, StaticResolver, TestIdentity};
pub use generators::{commit_from_params, CommitParams};
pub use vectors::{all_vectors, build_commit_from_vector, verify_all_vectors, GoldenVector};
