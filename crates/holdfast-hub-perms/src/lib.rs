//! # Holdfast Hub Permissions
//!
//! Permission grants and authorization for the Holdfast Hub.
//!
//! ## Overview
//!
//! Access control is data. A grant is an ordinary hub object under the
//! Permissions interface, created, updated, and revoked through signed
//! commits like everything else. Authorization replays each grant object's
//! commit history to its latest state and keeps the grants that apply to
//! the requester.
//!
//! ## Key Concepts
//!
//! - **PermissionGrant**: who may do what to which (context, type) pair
//! - **Capability**: one of create, read, update, delete; the letters of
//!   a grant's `allow` string
//! - **AuthorizationController**: resolves applicable grants through the
//!   store; an empty result is the authorization failure
//!
//! ## Gating Model
//!
//! Gating is all-or-nothing per query: a grant applies to a read only when
//! it covers every candidate item, and to a write only when it permits the
//! commit's operation over the commit's (context, type). Owners hold an
//! implicit all-access grant and never touch the store.

pub mod controller;
pub mod grant;

pub use controller::AuthorizationController;
pub use grant::{Capability, PermissionGrant, GRANT_INTERFACE, GRANT_OBJECT_TYPE, WILDCARD};
