//! # Holdfast Hub Core
//!
//! Pure primitives for the Holdfast Hub: commits, requests, responses, and the
//! revision computation that content-addresses every mutation.
//!
//! This crate contains no I/O and no storage. The only outward-facing seam is
//! [`Resolver`], which callers implement to fetch key material for a DID.
//!
//! ## Key Types
//!
//! - [`Commit`] - A signed mutation (create, update, delete) of one object
//! - [`Request`] - The three request kinds a hub accepts
//! - [`HubError`] - Request-path failures, each naming the offending field
//! - [`Did`] / [`DidDocument`] - Identity namespace and resolved key material
//!
//! ## Revisions
//!
//! Every commit is content-addressed: its revision is the hex SHA-256 of
//! `protected + "." + payload` over the base64url strings exactly as they
//! arrived. See the [`commit`] module.

pub mod commit;
pub mod crypto;
pub mod did;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod object;
pub mod request;
pub mod response;
pub mod verify;

pub use commit::{Commit, CommitBuilder, CommitHeaders, Operation, ProtectedHeaders};
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Keypair, Sha256Hash, X25519PublicKey};
pub use did::{Did, DidDocument, PublicKeyEntry, Resolver, ResolverError};
pub use error::{CryptoError, ErrorCode, HubError, Result};
pub use filter::{EqFilter, FilterValue};
pub use object::ObjectMetadata;
pub use request::{
    BaseRequest, CommitQueryRequest, ObjectQueryRequest, Request, WriteRequest, SCHEMA_CONTEXT,
};
pub use response::{
    CommitQueryResponse, ErrorResponse, ObjectQueryResponse, Response, WriteResponse,
};
pub use verify::{CommitVerifier, SignatureVerifier};
