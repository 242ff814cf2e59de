//! Object metadata surfaced by object queries.

use serde::{Deserialize, Serialize};

use crate::commit::{Commit, Operation};
use crate::did::Did;

/// Descriptive metadata for a stored object.
///
/// An object is the chain of commits sharing an object id; its metadata is
/// fixed by the create commit that started the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub interface: String,
    pub context: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    pub sub: Did,
    pub created_by: Did,
    pub created_at: String,
    pub commit_strategy: String,
}

impl ObjectMetadata {
    /// Derive metadata from a create commit. Returns `None` for update and
    /// delete commits, which never start an object.
    pub fn from_create_commit(commit: &Commit) -> Option<Self> {
        if commit.operation() != Operation::Create {
            return None;
        }
        let protected = commit.protected_headers();
        Some(Self {
            interface: protected.interface.clone(),
            context: protected.context.clone(),
            object_type: protected.object_type.clone(),
            id: commit.object_id().to_string(),
            sub: protected.sub.clone(),
            created_by: commit.headers().iss.clone(),
            created_at: protected.committed_at.clone(),
            commit_strategy: protected.commit_strategy.clone(),
        })
    }

    /// Look up a metadata field by the name a query filter uses.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "interface" => Some(&self.interface),
            "context" => Some(&self.context),
            "type" => Some(&self.object_type),
            "id" | "object_id" => Some(&self.id),
            "sub" => Some(self.sub.as_str()),
            "created_by" => Some(self.created_by.as_str()),
            "commit_strategy" => Some(&self.commit_strategy),
            _ => None,
        }
    }
}
