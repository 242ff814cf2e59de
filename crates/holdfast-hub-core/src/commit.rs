//! Commit: the atomic unit of object state.
//!
//! A commit is an immutable, signed change to an object. Once written, it
//! cannot be edited; updates and deletes are represented as new commits
//! against the same object id. A commit travels as a JWS in flattened JSON
//! form: base64url-encoded protected headers, a base64url-encoded payload,
//! a signature over `protected + "." + payload`, and a small unprotected
//! header the hub derives itself.
//!
//! The revision of a commit is the hex SHA-256 digest of its signing input,
//! so a commit's identity is fixed by its exact encoded bytes. The create
//! commit's revision doubles as the object id for the whole chain.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::crypto::{Keypair, Sha256Hash};
use crate::did::Did;
use crate::encoding;
use crate::error::{HubError, Result};

/// The operation a commit performs on its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Start a new object. The commit's revision becomes the object id.
    Create,
    /// Replace the state of an existing object.
    Update,
    /// Mark an existing object as deleted.
    Delete,
}

impl Operation {
    /// Parse from the wire string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// The wire string for this operation.
    pub fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The signed, immutable headers of a commit, decoded from the protected
/// member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHeaders {
    /// The hub interface the object lives under, e.g. `Collections`.
    pub interface: String,

    /// Schema context of the payload, e.g. `https://schema.org`.
    pub context: String,

    /// Schema type of the payload within the context.
    #[serde(rename = "type")]
    pub object_type: String,

    /// What this commit does to its object.
    pub operation: Operation,

    /// Author-claimed commit time, an ISO-8601 string. Untrusted, but fixes
    /// the ordering of commits within an object.
    pub committed_at: String,

    /// How readers fold this object's commits into state.
    pub commit_strategy: String,

    /// The identity whose hub the object belongs to.
    pub sub: Did,

    /// The key identifier that signed the commit, e.g.
    /// `did:example:alice#key-1`.
    pub kid: String,

    /// The object being changed. Present for update and delete; forbidden
    /// for create, where the revision becomes the object id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// The unprotected headers of a commit, derived by the hub rather than
/// taken from input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitHeaders {
    /// The issuer, extracted from the signing kid.
    pub iss: Did,

    /// The object this commit belongs to.
    pub object_id: String,

    /// The commit's revision: hex SHA-256 of the signing input.
    pub rev: String,
}

/// A validated commit in JWS form.
///
/// The encoded protected and payload strings are kept verbatim; the
/// signature and the revision are both bound to those exact bytes, so the
/// hub never re-encodes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    protected: String,
    payload: String,
    signature: Option<String>,
    protected_headers: ProtectedHeaders,
    headers: CommitHeaders,
}

impl Commit {
    /// Validate a commit from its wire JSON form.
    ///
    /// Checks the JWS members, the unprotected header allow-list, and every
    /// required protected header, then derives `iss`, `rev`, and `object_id`.
    /// Any `iss`, `object_id`, or `rev` supplied in the unprotected header is
    /// discarded in favour of the derived values.
    pub fn from_value(value: &Value) -> Result<Self> {
        let commit = value
            .as_object()
            .ok_or_else(|| HubError::incorrect_parameter("commit"))?;

        let protected = match commit.get("protected") {
            None => return Err(HubError::missing_parameter("commit.protected")),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(HubError::incorrect_parameter("commit.protected")),
        };

        let payload = match commit.get("payload") {
            None => return Err(HubError::missing_parameter("commit.payload")),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(HubError::incorrect_parameter("commit.payload")),
        };

        // A commit may arrive unsigned; the verifier rejects it later. What
        // it may not do is carry a non-string signature.
        let signature = match commit.get("signature") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(HubError::incorrect_parameter("commit.signature")),
        };

        // The unprotected header only admits iss, object_id, and rev, all
        // strings. Unknown members are ignored; the admitted values are
        // themselves discarded below once the derived ones are computed.
        if let Some(header) = commit.get("header") {
            let header = header
                .as_object()
                .ok_or_else(|| HubError::incorrect_parameter("commit.header"))?;
            for field in ["iss", "object_id", "rev"] {
                if let Some(value) = header.get(field) {
                    if !value.is_string() {
                        return Err(HubError::incorrect_parameter(format!(
                            "commit.header.{field}"
                        )));
                    }
                }
            }
        }

        let decoded = encoding::decode_json(&protected)
            .ok_or_else(|| HubError::incorrect_parameter("commit.protected"))?;
        let protected_map = decoded
            .as_object()
            .ok_or_else(|| HubError::incorrect_parameter("commit.protected"))?;

        let interface = required_string(protected_map, "interface")?;
        let context = required_string(protected_map, "context")?;
        let object_type = required_string(protected_map, "type")?;
        let operation_name = required_string(protected_map, "operation")?;
        let committed_at = required_string(protected_map, "committed_at")?;
        let commit_strategy = required_string(protected_map, "commit_strategy")?;
        let sub = required_string(protected_map, "sub")?;
        let kid = required_string(protected_map, "kid")?;

        let revision = compute_revision(&protected, &payload);

        let operation = Operation::parse(operation_name)
            .ok_or_else(|| HubError::incorrect_parameter("commit.protected.operation"))?;

        let object_id = match operation {
            Operation::Create => {
                if let Some(declared) = protected_map.get("object_id") {
                    if declared.as_str() == Some(revision.as_str()) {
                        tracing::warn!(%revision, "sha256 has been broken");
                    }
                    return Err(HubError::bad_request(
                        "commit.protected.object_id",
                        "object_id cannot be included in the protected headers for a 'create' commit",
                    ));
                }
                None
            }
            Operation::Update | Operation::Delete => {
                Some(required_string(protected_map, "object_id")?.to_string())
            }
        };

        if let Some(declared) = protected_map.get("rev") {
            if declared.as_str() == Some(revision.as_str()) {
                tracing::warn!(%revision, "sha256 has been broken");
            }
            return Err(HubError::bad_request(
                "commit.protected.rev",
                "'rev' cannot be included in protected headers",
            ));
        }

        let protected_headers = ProtectedHeaders {
            interface: interface.to_string(),
            context: context.to_string(),
            object_type: object_type.to_string(),
            operation,
            committed_at: committed_at.to_string(),
            commit_strategy: commit_strategy.to_string(),
            sub: Did::new(sub),
            kid: kid.to_string(),
            object_id: object_id.clone(),
        };

        let headers = CommitHeaders {
            iss: Did::from_key_id(kid),
            object_id: object_id.unwrap_or_else(|| revision.clone()),
            rev: revision,
        };

        Ok(Self {
            protected,
            payload,
            signature,
            protected_headers,
            headers,
        })
    }

    /// The derived unprotected headers.
    pub fn headers(&self) -> &CommitHeaders {
        &self.headers
    }

    /// The decoded protected headers.
    pub fn protected_headers(&self) -> &ProtectedHeaders {
        &self.protected_headers
    }

    /// What this commit does to its object.
    pub fn operation(&self) -> Operation {
        self.protected_headers.operation
    }

    /// The id of the object this commit belongs to.
    pub fn object_id(&self) -> &str {
        &self.headers.object_id
    }

    /// The revision of this commit.
    pub fn revision(&self) -> &str {
        &self.headers.rev
    }

    /// The verbatim base64url-encoded protected headers.
    pub fn encoded_protected(&self) -> &str {
        &self.protected
    }

    /// The verbatim base64url-encoded payload.
    pub fn encoded_payload(&self) -> &str {
        &self.payload
    }

    /// The base64url-encoded signature, if the commit carries one.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The bytes the signature covers: `protected + "." + payload`.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.protected, self.payload)
    }

    /// Decode the payload as JSON.
    pub fn decode_payload(&self) -> Result<Value> {
        encoding::decode_json(&self.payload)
            .ok_or_else(|| HubError::incorrect_parameter("commit.payload"))
    }

    /// The wire JSON form of this commit.
    pub fn to_value(&self) -> Value {
        let mut header = serde_json::Map::new();
        header.insert(
            "iss".to_string(),
            Value::String(self.headers.iss.as_str().to_string()),
        );
        header.insert("rev".to_string(), Value::String(self.headers.rev.clone()));
        if self.operation() == Operation::Create {
            header.insert(
                "object_id".to_string(),
                Value::String(self.headers.object_id.clone()),
            );
        }

        let mut commit = serde_json::Map::new();
        commit.insert("protected".to_string(), Value::String(self.protected.clone()));
        commit.insert("header".to_string(), Value::Object(header));
        commit.insert("payload".to_string(), Value::String(self.payload.clone()));
        if let Some(signature) = &self.signature {
            commit.insert("signature".to_string(), Value::String(signature.clone()));
        }
        Value::Object(commit)
    }
}

impl Serialize for Commit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Commit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Commit::from_value(&value).map_err(D::Error::custom)
    }
}

/// hex SHA-256 over the signing input.
fn compute_revision(protected: &str, payload: &str) -> String {
    Sha256Hash::hash(format!("{protected}.{payload}").as_bytes()).to_hex()
}

fn required_string<'a>(
    protected: &'a serde_json::Map<String, Value>,
    name: &str,
) -> Result<&'a str> {
    match protected.get(name) {
        None => Err(HubError::missing_parameter(format!(
            "commit.protected.{name}"
        ))),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(HubError::incorrect_parameter(format!(
            "commit.protected.{name}"
        ))),
    }
}

/// Builder for creating signed commits.
pub struct CommitBuilder {
    operation: Operation,
    sub: Did,
    kid: String,
    interface: String,
    context: Option<String>,
    object_type: Option<String>,
    committed_at: Option<String>,
    commit_strategy: String,
    object_id: Option<String>,
    payload: Value,
}

impl CommitBuilder {
    /// Start building a commit signed by `kid` against `sub`'s hub.
    pub fn new(operation: Operation, sub: impl Into<Did>, kid: impl Into<String>) -> Self {
        Self {
            operation,
            sub: sub.into(),
            kid: kid.into(),
            interface: "Collections".to_string(),
            context: None,
            object_type: None,
            committed_at: None,
            commit_strategy: "basic".to_string(),
            object_id: None,
            payload: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the interface (defaults to `Collections`).
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    /// Set the schema context.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the schema type.
    pub fn object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    /// Set the commit time, an ISO-8601 string.
    pub fn committed_at(mut self, committed_at: impl Into<String>) -> Self {
        self.committed_at = Some(committed_at.into());
        self
    }

    /// Set the commit strategy (defaults to `basic`).
    pub fn commit_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.commit_strategy = strategy.into();
        self
    }

    /// Set the object id. Required for update and delete.
    pub fn object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    /// Set the JSON payload (defaults to an empty object).
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Encode, sign, and validate the commit.
    pub fn sign(self, keypair: &Keypair) -> Result<Commit> {
        let mut protected = serde_json::Map::new();
        protected.insert("interface".to_string(), Value::String(self.interface));
        if let Some(context) = self.context {
            protected.insert("context".to_string(), Value::String(context));
        }
        if let Some(object_type) = self.object_type {
            protected.insert("type".to_string(), Value::String(object_type));
        }
        protected.insert(
            "operation".to_string(),
            Value::String(self.operation.name().to_string()),
        );
        if let Some(committed_at) = self.committed_at {
            protected.insert("committed_at".to_string(), Value::String(committed_at));
        }
        protected.insert(
            "commit_strategy".to_string(),
            Value::String(self.commit_strategy),
        );
        protected.insert(
            "sub".to_string(),
            Value::String(self.sub.as_str().to_string()),
        );
        protected.insert("kid".to_string(), Value::String(self.kid));
        if let Some(object_id) = self.object_id {
            protected.insert("object_id".to_string(), Value::String(object_id));
        }

        let protected = encoding::encode_json(&Value::Object(protected));
        let payload = encoding::encode_json(&self.payload);
        let signing_input = format!("{protected}.{payload}");
        let signature = keypair.sign(signing_input.as_bytes());

        // Route the built form back through validation so a builder misuse
        // surfaces the same error a malformed wire commit would.
        Commit::from_value(&serde_json::json!({
            "protected": protected,
            "payload": payload,
            "signature": encoding::encode(signature.as_bytes()),
        }))
    }
}
