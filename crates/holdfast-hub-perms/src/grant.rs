//! Permission grants: hub objects naming who may touch an owner's data.
//!
//! Grants are not a side table. Each grant is an ordinary object under the
//! Permissions interface, written and revoked through commits like any
//! other data, and resolved by folding its commit history to the latest
//! state.

use serde::{Deserialize, Serialize};

use holdfast_hub_core::{Did, Operation};

/// The interface grant objects live under.
pub const GRANT_INTERFACE: &str = "Permissions";

/// The object type grant objects are stored as.
pub const GRANT_OBJECT_TYPE: &str = "PermissionGrant";

/// Matches any value in a grant's `context` or `type` field.
pub const WILDCARD: &str = "*";

/// One of the four capabilities a grant can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Create,
    Read,
    Update,
    Delete,
}

impl Capability {
    /// The letter this capability contributes to an `allow` string.
    pub fn letter(self) -> char {
        match self {
            Capability::Create => 'C',
            Capability::Read => 'R',
            Capability::Update => 'U',
            Capability::Delete => 'D',
        }
    }

    /// The capability a commit operation requires.
    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::Create => Capability::Create,
            Operation::Update => Capability::Update,
            Operation::Delete => Capability::Delete,
        }
    }
}

/// A permission grant payload.
///
/// `allow` is a string of capability letters over {C, R, U, D}, e.g. `"R"`
/// or `"CRUD"`. `context` and `type` scope the grant to objects with the
/// same pair; the `"*"` wildcard covers any value and is how the implicit
/// owner grant covers everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// The data owner.
    pub owner: Did,

    /// The identity being granted access.
    pub grantee: Did,

    /// Capability letters, uppercase.
    pub allow: String,

    /// Context the grant covers.
    pub context: String,

    /// Object type the grant covers.
    #[serde(rename = "type")]
    pub object_type: String,

    /// Who created the grant, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Did>,
}

impl PermissionGrant {
    pub fn new(
        owner: impl Into<Did>,
        grantee: impl Into<Did>,
        allow: impl Into<String>,
        context: impl Into<String>,
        object_type: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            grantee: grantee.into(),
            allow: allow.into(),
            context: context.into(),
            object_type: object_type.into(),
            created_by: None,
        }
    }

    /// The implicit all-access grant an owner holds over their own hub.
    pub fn owner_grant(owner: &Did) -> Self {
        Self {
            owner: owner.clone(),
            grantee: owner.clone(),
            allow: "CRUD".to_string(),
            context: WILDCARD.to_string(),
            object_type: WILDCARD.to_string(),
            created_by: None,
        }
    }

    /// Whether this grant carries the given capability.
    pub fn permits(&self, capability: Capability) -> bool {
        self.allow.contains(capability.letter())
    }

    /// Whether this grant covers an object's (context, type) pair.
    pub fn covers(&self, context: &str, object_type: &str) -> bool {
        (self.context == WILDCARD || self.context == context)
            && (self.object_type == WILDCARD || self.object_type == object_type)
    }
}
