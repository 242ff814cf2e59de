//! Client-side helpers for driving a hub end to end.
//!
//! These helpers play the remote side of the protocol: sign a request body,
//! seal it to the hub, hand the hub's sealed reply back as plain JSON. They
//! panic on malformed replies; a test that got one has already failed.

use serde_json::{json, Value};

use holdfast_hub::{Hub, Resolver};
use holdfast_hub_core::{encoding, Commit, Did, X25519PublicKey, SCHEMA_CONTEXT};
use holdfast_hub_envelope::{sign_compact, JwsHeader, SealedEnvelope};
use holdfast_hub_store::Store;

use crate::fixtures::TestIdentity;

/// A sealed reply after decryption: the JWS header's token member and the
/// decoded body.
#[derive(Debug)]
pub struct OpenedReply {
    pub token: Option<String>,
    pub body: Vec<u8>,
}

/// Sign `body` as `identity` and seal it to the hub's agreement key.
pub fn seal_request(
    identity: &TestIdentity,
    hub_seal_key: &X25519PublicKey,
    body: &[u8],
    token: Option<&str>,
) -> Vec<u8> {
    let mut header = JwsHeader::new(&identity.kid);
    if let Some(token) = token {
        header = header.with_token(token.to_string());
    }
    let compact = sign_compact(&header, body, &identity.signing).expect("request signs");
    SealedEnvelope::seal(compact.as_bytes(), hub_seal_key)
        .expect("request seals")
        .to_bytes()
}

/// Open a sealed reply addressed to `identity`.
pub fn open_reply(identity: &TestIdentity, buffer: &[u8]) -> OpenedReply {
    let plaintext = SealedEnvelope::from_bytes(buffer)
        .expect("reply is a sealed envelope")
        .open(&identity.agreement())
        .expect("reply opens with the requester's key");
    let compact = String::from_utf8(plaintext).expect("reply is a compact JWS");

    let parts: Vec<&str> = compact.split('.').collect();
    assert_eq!(parts.len(), 3, "reply JWS has three segments");
    let header: JwsHeader =
        serde_json::from_slice(&encoding::decode(parts[0]).expect("reply header decodes"))
            .expect("reply header is a JWS header");
    let body = encoding::decode(parts[1]).expect("reply payload decodes");

    OpenedReply {
        token: header.tok,
        body,
    }
}

/// Fetch a bearer token from the hub: the empty-body bootstrap leg.
pub async fn fetch_token<S: Store, R: Resolver>(
    hub: &Hub<S, R>,
    identity: &TestIdentity,
    hub_seal_key: &X25519PublicKey,
) -> String {
    let buffer = seal_request(identity, hub_seal_key, b"{}", None);
    let reply = hub.handle(&buffer).await.expect("bootstrap leg succeeds");
    open_reply(identity, &reply)
        .token
        .expect("bootstrap reply carries a token")
}

/// Send one request body and return the decoded JSON response body.
pub async fn roundtrip<S: Store, R: Resolver>(
    hub: &Hub<S, R>,
    identity: &TestIdentity,
    hub_seal_key: &X25519PublicKey,
    token: &str,
    body: &Value,
) -> Value {
    let buffer = seal_request(
        identity,
        hub_seal_key,
        body.to_string().as_bytes(),
        Some(token),
    );
    let reply = hub
        .handle(&buffer)
        .await
        .expect("authenticated requests get sealed replies");
    serde_json::from_slice(&open_reply(identity, &reply).body).expect("reply body is JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// Request bodies
// ─────────────────────────────────────────────────────────────────────────────

fn base_request(request_type: &str, iss: &Did, aud: &Did, sub: &Did) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": request_type,
        "iss": iss.as_str(),
        "aud": aud.as_str(),
        "sub": sub.as_str(),
    })
}

/// A WriteRequest body carrying one commit.
pub fn write_request(iss: &Did, aud: &Did, sub: &Did, commit: &Commit) -> Value {
    let mut request = base_request("WriteRequest", iss, aud, sub);
    request["commit"] = commit.to_value();
    request
}

/// An ObjectQueryRequest body with the given query members.
pub fn object_query_request(iss: &Did, aud: &Did, sub: &Did, query: Value) -> Value {
    let mut request = base_request("ObjectQueryRequest", iss, aud, sub);
    request["query"] = query;
    request
}

/// A CommitQueryRequest body with the given query members.
pub fn commit_query_request(iss: &Did, aud: &Did, sub: &Did, query: Value) -> Value {
    let mut request = base_request("CommitQueryRequest", iss, aud, sub);
    request["query"] = query;
    request
}
