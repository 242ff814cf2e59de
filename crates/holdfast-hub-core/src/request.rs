//! Request bodies and their validation.
//!
//! Every request names the same base members: the schema `@context`, a
//! `@type` selecting one of the three request kinds, and the `iss`/`aud`/
//! `sub` triple of issuer, hub, and hub owner. Validation reports the first
//! offending member by its JSON path, e.g. `query.filters[0].value`.

use serde_json::Value;

use crate::commit::Commit;
use crate::did::Did;
use crate::error::{HubError, Result};
use crate::filter::{EqFilter, FilterValue};

/// The schema context every request must carry.
pub const SCHEMA_CONTEXT: &str = "https://schema.identity.foundation/0.1";

/// The members shared by all request types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRequest {
    /// Who sent the request.
    pub iss: Did,
    /// The hub the request is addressed to.
    pub aud: Did,
    /// Whose hub the request operates on.
    pub sub: Did,
}

impl BaseRequest {
    /// Validate the base members, returning them along with the `@type`.
    pub fn from_value(value: &Value) -> Result<(Self, String)> {
        let request = value
            .as_object()
            .ok_or_else(|| HubError::incorrect_parameter("request"))?;

        let context = required_string(request, "@context", "@context")?;
        let request_type = required_string(request, "@type", "@type")?.to_string();
        let iss = required_string(request, "iss", "iss")?;
        let aud = required_string(request, "aud", "aud")?;
        let sub = required_string(request, "sub", "sub")?;

        if context != SCHEMA_CONTEXT {
            return Err(HubError::bad_request(
                "@context",
                format!("'@context' must be '{SCHEMA_CONTEXT}'"),
            ));
        }

        Ok((
            Self {
                iss: Did::new(iss),
                aud: Did::new(aud),
                sub: Did::new(sub),
            },
            request_type,
        ))
    }
}

/// A validated request of any type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Write(WriteRequest),
    ObjectQuery(ObjectQueryRequest),
    CommitQuery(CommitQueryRequest),
}

impl Request {
    /// Validate a request from its wire JSON form, dispatching on `@type`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let (base, request_type) = BaseRequest::from_value(value)?;
        // Checked above; from_value only returns Ok for objects.
        let request = match value.as_object() {
            Some(request) => request,
            None => return Err(HubError::incorrect_parameter("request")),
        };

        match request_type.as_str() {
            "WriteRequest" => Ok(Self::Write(WriteRequest::from_parts(base, request)?)),
            "ObjectQueryRequest" => Ok(Self::ObjectQuery(ObjectQueryRequest::from_parts(
                base, request,
            )?)),
            "CommitQueryRequest" => Ok(Self::CommitQuery(CommitQueryRequest::from_parts(
                base, request,
            )?)),
            other => Err(HubError::bad_request(
                "@type",
                format!("unsupported request type '{other}'"),
            )),
        }
    }

    /// The base members of the request.
    pub fn base(&self) -> &BaseRequest {
        match self {
            Request::Write(request) => &request.base,
            Request::ObjectQuery(request) => &request.base,
            Request::CommitQuery(request) => &request.base,
        }
    }
}

/// A request to write one commit to the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub base: BaseRequest,
    pub commit: Commit,
}

impl WriteRequest {
    fn from_parts(base: BaseRequest, request: &serde_json::Map<String, Value>) -> Result<Self> {
        let value = match request.get("commit") {
            None => return Err(HubError::missing_parameter("commit")),
            Some(value @ Value::Object(_)) => value,
            Some(_) => return Err(HubError::incorrect_parameter("commit")),
        };

        let commit = Commit::from_value(value)?;

        if base.iss != commit.headers().iss {
            return Err(HubError::bad_request(
                "commit",
                "The commit must be signed by the request issuer",
            ));
        }

        Ok(Self { base, commit })
    }
}

/// A request for the objects visible under an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectQueryRequest {
    pub base: BaseRequest,
    /// The interface queried, e.g. `Collections`.
    pub interface: String,
    /// Schema context to restrict to. Present iff `object_type` is.
    pub context: Option<String>,
    /// Schema type to restrict to. Present iff `context` is.
    pub object_type: Option<String>,
    /// Specific object ids to restrict to.
    pub object_ids: Vec<String>,
    /// Additional equality filters over object metadata.
    pub filters: Vec<EqFilter>,
    /// Continuation token from a previous page.
    pub skip_token: Option<String>,
}

impl ObjectQueryRequest {
    fn from_parts(base: BaseRequest, request: &serde_json::Map<String, Value>) -> Result<Self> {
        let query = match request.get("query") {
            None => return Err(HubError::missing_parameter("query")),
            Some(Value::Object(query)) => query,
            Some(_) => return Err(HubError::incorrect_parameter("query")),
        };

        let interface = required_string(query, "interface", "query.interface")?.to_string();
        let context = optional_string(query, "context", "query.context")?;
        let object_type = optional_string(query, "type", "query.type")?;

        // context and type travel together: filtering by one without the
        // other names objects that cannot exist.
        match (&context, &object_type) {
            (Some(_), None) => return Err(HubError::incorrect_parameter("query.type")),
            (None, Some(_)) => return Err(HubError::incorrect_parameter("query.context")),
            _ => {}
        }

        let object_ids = match query.get("object_id") {
            Some(value) => string_array(value, "query.object_id")?,
            None => Vec::new(),
        };

        let filters = match query.get("filters") {
            Some(value) => parse_filters(value)?,
            None => Vec::new(),
        };

        let skip_token = optional_string(query, "skip_token", "query.skip_token")?;

        Ok(Self {
            base,
            interface,
            context,
            object_type,
            object_ids,
            filters,
            skip_token,
        })
    }
}

/// A request for the raw commits of one or more objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitQueryRequest {
    pub base: BaseRequest,
    /// Objects whose complete commit history should be returned.
    pub object_ids: Vec<String>,
    /// Specific commit revisions to return.
    pub revisions: Vec<String>,
    /// Metadata fields to restrict the response to.
    pub fields: Vec<String>,
    /// Continuation token from a previous page.
    pub skip_token: Option<String>,
}

impl CommitQueryRequest {
    fn from_parts(base: BaseRequest, request: &serde_json::Map<String, Value>) -> Result<Self> {
        let mut object_ids = Vec::new();
        let mut revisions = Vec::new();
        let mut skip_token = None;

        if let Some(query) = request.get("query") {
            let query = query
                .as_object()
                .ok_or_else(|| HubError::incorrect_parameter("query"))?;

            if query.contains_key("object_id") && query.contains_key("revision") {
                return Err(HubError::not_implemented(
                    "query.object_id, query.revision",
                    "object_id and revision are mutually exclusive",
                ));
            }

            if let Some(value) = query.get("object_id") {
                object_ids = string_array(value, "query.object_id")?;
            }
            if let Some(value) = query.get("revision") {
                revisions = string_array(value, "query.revision")?;
            }
            skip_token = optional_string(query, "skip_token", "query.skip_token")?;
        }

        let fields = match request.get("fields") {
            Some(value) => string_array(value, "fields")?,
            None => Vec::new(),
        };

        Ok(Self {
            base,
            object_ids,
            revisions,
            fields,
            skip_token,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation helpers
// ─────────────────────────────────────────────────────────────────────────────

fn required_string<'a>(
    object: &'a serde_json::Map<String, Value>,
    name: &str,
    path: &str,
) -> Result<&'a str> {
    match object.get(name) {
        None => Err(HubError::missing_parameter(path)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(HubError::incorrect_parameter(path)),
    }
}

fn optional_string(
    object: &serde_json::Map<String, Value>,
    name: &str,
    path: &str,
) -> Result<Option<String>> {
    match object.get(name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(HubError::incorrect_parameter(path)),
    }
}

/// Validate an array of strings, reporting bad elements by index.
fn string_array(value: &Value, path: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| HubError::incorrect_parameter(path))?;

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => out.push(s.clone()),
            _ => return Err(HubError::incorrect_parameter(format!("{path}[{index}]"))),
        }
    }
    Ok(out)
}

fn parse_filters(value: &Value) -> Result<Vec<EqFilter>> {
    let items = value
        .as_array()
        .ok_or_else(|| HubError::incorrect_parameter("query.filters"))?;

    let mut filters = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let filter = item
            .as_object()
            .ok_or_else(|| HubError::incorrect_parameter(format!("query.filters[{index}]")))?;

        let field = match filter.get("field") {
            None => {
                return Err(HubError::missing_parameter(format!(
                    "query.filters[{index}].field"
                )))
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(HubError::incorrect_parameter(format!(
                    "query.filters[{index}].field"
                )))
            }
        };

        let value = match filter.get("value") {
            None => {
                return Err(HubError::missing_parameter(format!(
                    "query.filters[{index}].value"
                )))
            }
            Some(Value::String(s)) => FilterValue::One(s.clone()),
            Some(array @ Value::Array(_)) => {
                FilterValue::Many(string_array(array, &format!("query.filters[{index}].value"))?)
            }
            Some(_) => {
                return Err(HubError::incorrect_parameter(format!(
                    "query.filters[{index}].value"
                )))
            }
        };

        let kind = match filter.get("type") {
            None => {
                return Err(HubError::missing_parameter(format!(
                    "query.filters[{index}].type"
                )))
            }
            Some(Value::String(s)) if s == "eq" => s.clone(),
            Some(_) => {
                return Err(HubError::incorrect_parameter(format!(
                    "query.filters[{index}].type"
                )))
            }
        };

        filters.push(EqFilter { field, kind, value });
    }
    Ok(filters)
}
