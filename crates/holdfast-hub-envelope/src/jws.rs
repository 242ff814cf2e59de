//! The signed layer of the envelope: compact JWS with Ed25519.
//!
//! A signed payload travels as `header.payload.signature`, each part
//! base64url without padding. The header names the signing key by kid; the
//! verifier resolves the signer's DID document and checks the signature
//! against the key listed there. No key material is ever embedded in the
//! header itself.

use serde::{Deserialize, Serialize};

use holdfast_hub_core::encoding;
use holdfast_hub_core::{Did, DidDocument, Ed25519Signature, Keypair, Resolver};

use crate::error::{EnvelopeError, Result};

/// The JWS protected header used for envelope payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm. Always `EdDSA`.
    pub alg: String,

    /// Key identifier of the signing key, e.g. `did:example:alice#key-1`.
    pub kid: String,

    /// Bearer token for this hub. Absent on the first leg of a session,
    /// which asks the hub to issue one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tok: Option<String>,
}

impl JwsHeader {
    /// A header for the given signing kid.
    pub fn new(kid: impl Into<String>) -> Self {
        Self {
            alg: "EdDSA".to_string(),
            kid: kid.into(),
            tok: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.tok = Some(token.into());
        self
    }
}

/// A verified JWS: its header, raw payload, and the identity that signed it.
///
/// The signer's resolved document rides along so callers can look up the
/// key-agreement key for the reply without resolving twice.
#[derive(Debug, Clone)]
pub struct VerifiedJws {
    pub header: JwsHeader,
    pub payload: Vec<u8>,
    pub signer: Did,
    pub document: DidDocument,
}

/// Sign payload bytes into compact JWS form.
pub fn sign_compact(header: &JwsHeader, payload: &[u8], keypair: &Keypair) -> Result<String> {
    let header_json =
        serde_json::to_vec(header).map_err(|e| EnvelopeError::MalformedJws(e.to_string()))?;

    let header_b64 = encoding::encode(header_json);
    let payload_b64 = encoding::encode(payload);
    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = keypair.sign(signing_input.as_bytes());

    Ok(format!(
        "{signing_input}.{}",
        encoding::encode(signature.as_bytes())
    ))
}

/// Verify a compact JWS, resolving the signer's keys by the header kid.
pub async fn verify_compact<R: Resolver>(compact: &str, resolver: &R) -> Result<VerifiedJws> {
    let parts: Vec<&str> = compact.split('.').collect();
    if parts.len() != 3 {
        return Err(EnvelopeError::MalformedJws(format!(
            "expected 3 parts (header.payload.signature), got {}",
            parts.len()
        )));
    }
    let (header_b64, payload_b64, signature_b64) = (parts[0], parts[1], parts[2]);

    let header_bytes = encoding::decode(header_b64)
        .map_err(|e| EnvelopeError::MalformedJws(format!("header: {e}")))?;
    let header: JwsHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| EnvelopeError::MalformedJws(format!("header: {e}")))?;

    if header.alg != "EdDSA" {
        return Err(EnvelopeError::MalformedJws(format!(
            "unsupported alg '{}'",
            header.alg
        )));
    }

    let signature_bytes = encoding::decode(signature_b64)
        .map_err(|e| EnvelopeError::MalformedJws(format!("signature: {e}")))?;
    let signature =
        Ed25519Signature::from_slice(&signature_bytes).map_err(|_| EnvelopeError::BadSignature)?;

    let signer = Did::from_key_id(&header.kid);
    let document = resolver
        .resolve(&signer)
        .await
        .map_err(|_| EnvelopeError::Resolution(signer.as_str().to_string()))?;
    let key = document
        .signing_key(&header.kid)
        .ok_or_else(|| EnvelopeError::Resolution(header.kid.clone()))?;

    let signing_input = format!("{header_b64}.{payload_b64}");
    key.verify(signing_input.as_bytes(), &signature)
        .map_err(|_| EnvelopeError::BadSignature)?;

    let payload = encoding::decode(payload_b64)
        .map_err(|e| EnvelopeError::MalformedJws(format!("payload: {e}")))?;

    Ok(VerifiedJws {
        header,
        payload,
        signer,
        document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use holdfast_hub_core::ResolverError;
    use std::collections::HashMap;

    struct StaticResolver {
        documents: HashMap<String, DidDocument>,
    }

    impl StaticResolver {
        fn with(document: DidDocument) -> Self {
            let mut documents = HashMap::new();
            documents.insert(document.did.as_str().to_string(), document);
            Self { documents }
        }
    }

    #[async_trait]
    impl Resolver for StaticResolver {
        async fn resolve(&self, did: &Did) -> std::result::Result<DidDocument, ResolverError> {
            self.documents
                .get(did.as_str())
                .cloned()
                .ok_or_else(|| ResolverError::NotFound(did.clone()))
        }
    }

    fn alice() -> (Keypair, StaticResolver) {
        let keypair = Keypair::generate();
        let document = DidDocument::new(Did::new("did:example:alice"))
            .with_signing_key("key-1", keypair.public_key());
        (keypair, StaticResolver::with(document))
    }

    #[tokio::test]
    async fn test_sign_verify_roundtrip() {
        let (keypair, resolver) = alice();
        let header = JwsHeader::new("did:example:alice#key-1");
        let compact = sign_compact(&header, b"{\"hello\":true}", &keypair).unwrap();

        let verified = verify_compact(&compact, &resolver).await.unwrap();
        assert_eq!(verified.payload, b"{\"hello\":true}");
        assert_eq!(verified.signer.as_str(), "did:example:alice");
        assert_eq!(verified.header.tok, None);
    }

    #[tokio::test]
    async fn test_token_rides_in_header() {
        let (keypair, resolver) = alice();
        let header = JwsHeader::new("did:example:alice#key-1").with_token("the-token");
        let compact = sign_compact(&header, b"payload", &keypair).unwrap();

        let verified = verify_compact(&compact, &resolver).await.unwrap();
        assert_eq!(verified.header.tok.as_deref(), Some("the-token"));
    }

    #[tokio::test]
    async fn test_two_parts_rejected() {
        let (_, resolver) = alice();
        let err = verify_compact("only.two", &resolver).await.unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedJws(_)));
    }

    #[tokio::test]
    async fn test_wrong_alg_rejected() {
        let (keypair, resolver) = alice();
        let header = JwsHeader {
            alg: "RS256".to_string(),
            kid: "did:example:alice#key-1".to_string(),
            tok: None,
        };
        let compact = sign_compact(&header, b"payload", &keypair).unwrap();

        let err = verify_compact(&compact, &resolver).await.unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedJws(_)));
    }

    #[tokio::test]
    async fn test_unknown_kid_rejected() {
        let (keypair, resolver) = alice();
        let header = JwsHeader::new("did:example:alice#key-9");
        let compact = sign_compact(&header, b"payload", &keypair).unwrap();

        let err = verify_compact(&compact, &resolver).await.unwrap_err();
        assert!(matches!(err, EnvelopeError::Resolution(_)));
    }

    #[tokio::test]
    async fn test_unresolvable_signer_rejected() {
        let (keypair, _) = alice();
        let resolver = StaticResolver {
            documents: HashMap::new(),
        };
        let header = JwsHeader::new("did:example:alice#key-1");
        let compact = sign_compact(&header, b"payload", &keypair).unwrap();

        let err = verify_compact(&compact, &resolver).await.unwrap_err();
        assert!(matches!(err, EnvelopeError::Resolution(_)));
    }

    #[tokio::test]
    async fn test_tampered_payload_rejected() {
        let (keypair, resolver) = alice();
        let header = JwsHeader::new("did:example:alice#key-1");
        let compact = sign_compact(&header, b"payload", &keypair).unwrap();

        let mut parts: Vec<&str> = compact.split('.').collect();
        let forged = encoding::encode(b"forged!");
        parts[1] = &forged;
        let tampered = parts.join(".");

        let err = verify_compact(&tampered, &resolver).await.unwrap_err();
        assert!(matches!(err, EnvelopeError::BadSignature));
    }
}
