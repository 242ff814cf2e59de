//! # Holdfast Hub
//!
//! The unified API for the Holdfast Hub - a personal data store addressed
//! by DID, holding signed commits behind an authenticated envelope.
//!
//! ## Overview
//!
//! The Holdfast Hub provides a transport-agnostic request pipeline for:
//!
//! - **Commits**: Signed, content-addressed mutations of JSON objects
//! - **Interfaces**: Collections, Actions, Permissions, and Profile views
//! - **Permissions**: Access control expressed as stored grant objects
//! - **Envelopes**: Encrypt-and-sign framing with bearer-token bootstrap
//!
//! ## Key Concepts
//!
//! - **Commit**: Immutable. Never edited. Changes are new commits.
//! - **Revision**: The SHA-256 of a commit's wire form. Doubles as the
//!   object id of a create.
//! - **Grant**: A stored object naming who may do what to which schema.
//! - **Rejection**: The single opaque answer to anything unauthenticated.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use holdfast_hub::{Hub, HubConfig};
//! use holdfast_hub::core::{Did, Keypair};
//! use holdfast_hub::envelope::{HubKeys, X25519StaticSecret};
//! use holdfast_hub::store::MemoryStore;
//!
//! async fn example(resolver: Arc<impl holdfast_hub::core::Resolver>) {
//!     // The hub's own identity and key material
//!     let did = Did::new("did:example:hub");
//!     let kid = did.key_id("sign-1");
//!     let keys = HubKeys::new(
//!         did,
//!         kid,
//!         Keypair::generate(),
//!         X25519StaticSecret::generate(),
//!     );
//!
//!     // Open storage and assemble the hub
//!     let store = Arc::new(MemoryStore::new());
//!     let hub = Hub::new(keys, store, resolver, HubConfig::default());
//!
//!     // One sealed buffer in, one sealed buffer out
//!     // let reply = hub.handle(&buffer).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `holdfast_hub::core` - Commits, requests, responses, DID resolution
//! - `holdfast_hub::store` - Storage abstraction and the in-memory store
//! - `holdfast_hub::envelope` - Sealing, JWS, and bearer tokens
//! - `holdfast_hub::perms` - Permission grants and authorization

pub mod controller;
pub mod hub;
pub mod query;
pub mod router;

// Re-export component crates
pub use holdfast_hub_core as core;
pub use holdfast_hub_envelope as envelope;
pub use holdfast_hub_perms as perms;
pub use holdfast_hub_store as store;

// Re-export main types for convenience
pub use controller::{CommitQueryController, ObjectController};
pub use hub::{Hub, HubConfig};
pub use query::{compile_commit_query, compile_object_query, CompiledQuery};
pub use router::Interface;

// Re-export commonly used component types
pub use holdfast_hub_core::{
    Commit, CommitBuilder, Did, DidDocument, ErrorCode, HubError, Keypair, Operation, Request,
    Resolver, Response, Result,
};
pub use holdfast_hub_envelope::{HubKeys, Rejection};
pub use holdfast_hub_store::MemoryStore;
