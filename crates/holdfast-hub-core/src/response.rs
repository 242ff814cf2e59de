//! Response bodies returned by the hub.
//!
//! Responses mirror the request schema: each carries the schema `@context`
//! and a `@type` naming its kind. Errors are responses too; they travel back
//! through the same signed and sealed envelope as successes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commit::Commit;
use crate::error::HubError;
use crate::object::ObjectMetadata;
use crate::request::SCHEMA_CONTEXT;

/// Response to a write: every revision the hub now knows for the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub response_type: String,
    pub revisions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_message: Option<String>,
}

impl WriteResponse {
    pub fn new(revisions: Vec<String>) -> Self {
        Self {
            context: SCHEMA_CONTEXT.to_string(),
            response_type: "WriteResponse".to_string(),
            revisions,
            developer_message: None,
        }
    }
}

/// Response to an object query: one metadata entry per matching object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectQueryResponse {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub response_type: String,
    pub objects: Vec<ObjectMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_message: Option<String>,
}

impl ObjectQueryResponse {
    pub fn new(objects: Vec<ObjectMetadata>, skip_token: Option<String>) -> Self {
        Self {
            context: SCHEMA_CONTEXT.to_string(),
            response_type: "ObjectQueryResponse".to_string(),
            objects,
            skip_token,
            developer_message: None,
        }
    }
}

/// Response to a commit query: the matching commits, byte for byte as they
/// were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitQueryResponse {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub response_type: String,
    pub commits: Vec<Commit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_message: Option<String>,
}

impl CommitQueryResponse {
    pub fn new(commits: Vec<Commit>, skip_token: Option<String>) -> Self {
        Self {
            context: SCHEMA_CONTEXT.to_string(),
            response_type: "CommitQueryResponse".to_string(),
            commits,
            skip_token,
            developer_message: None,
        }
    }
}

/// A request failure in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub response_type: String,
    pub error_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    /// The JSON path of the request member that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<Value>,
    pub developer_message: String,
}

impl ErrorResponse {
    pub fn from_error(error: &HubError) -> Self {
        Self {
            context: SCHEMA_CONTEXT.to_string(),
            response_type: "ErrorResponse".to_string(),
            error_code: error.code().as_str().to_string(),
            error_url: None,
            user_message: None,
            target: error.path().map(str::to_string),
            inner_error: None,
            developer_message: error.to_string(),
        }
    }
}

/// Any response the hub can return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Write(WriteResponse),
    ObjectQuery(ObjectQueryResponse),
    CommitQuery(CommitQueryResponse),
    Error(ErrorResponse),
}

impl Response {
    /// Serialize to the JSON bytes that get signed and sealed.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl From<WriteResponse> for Response {
    fn from(response: WriteResponse) -> Self {
        Response::Write(response)
    }
}

impl From<ObjectQueryResponse> for Response {
    fn from(response: ObjectQueryResponse) -> Self {
        Response::ObjectQuery(response)
    }
}

impl From<CommitQueryResponse> for Response {
    fn from(response: CommitQueryResponse) -> Self {
        Response::CommitQuery(response)
    }
}

impl From<ErrorResponse> for Response {
    fn from(response: ErrorResponse) -> Self {
        Response::Error(response)
    }
}

impl From<&HubError> for Response {
    fn from(error: &HubError) -> Self {
        Response::Error(ErrorResponse::from_error(error))
    }
}
