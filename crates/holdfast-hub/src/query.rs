//! Query compilation: validated requests into the store's filter contract.
//!
//! Identifying filters lead, so a store that indexes on them can prune
//! early. The request's own filters go last, verbatim.

use holdfast_hub_core::{CommitQueryRequest, Did, EqFilter, ObjectQueryRequest};

/// Store arguments compiled from a query request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub owner: Did,
    pub filters: Vec<EqFilter>,
    pub skip_token: Option<String>,
}

/// Compile an object query: interface, then context and type when present,
/// then object ids, then the request's generic filters.
pub fn compile_object_query(request: &ObjectQueryRequest) -> CompiledQuery {
    let mut filters = vec![EqFilter::one("interface", request.interface.as_str())];

    if let (Some(context), Some(object_type)) = (&request.context, &request.object_type) {
        filters.push(EqFilter::one("context", context.as_str()));
        filters.push(EqFilter::one("type", object_type.as_str()));
    }
    if !request.object_ids.is_empty() {
        filters.push(EqFilter::many("object_id", request.object_ids.clone()));
    }
    filters.extend(request.filters.iter().cloned());

    CompiledQuery {
        owner: request.base.sub.clone(),
        filters,
        skip_token: request.skip_token.clone(),
    }
}

/// Compile a commit query: the object id and revision lists become
/// equality filters. Validation has already ruled out both at once.
pub fn compile_commit_query(request: &CommitQueryRequest) -> CompiledQuery {
    let mut filters = Vec::new();

    if !request.object_ids.is_empty() {
        filters.push(EqFilter::many("object_id", request.object_ids.clone()));
    }
    if !request.revisions.is_empty() {
        filters.push(EqFilter::many("rev", request.revisions.clone()));
    }

    CompiledQuery {
        owner: request.base.sub.clone(),
        filters,
        skip_token: request.skip_token.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdfast_hub_core::{FilterValue, Request};

    fn parse(value: serde_json::Value) -> Request {
        Request::from_value(&value).unwrap()
    }

    fn base_members() -> serde_json::Value {
        serde_json::json!({
            "@context": "https://schema.identity.foundation/0.1",
            "iss": "did:example:alice",
            "aud": "did:example:hub",
            "sub": "did:example:alice",
        })
    }

    #[test]
    fn test_object_query_filter_order() {
        let mut value = base_members();
        value["@type"] = "ObjectQueryRequest".into();
        value["query"] = serde_json::json!({
            "interface": "Collections",
            "context": "https://schema.org",
            "type": "Note",
            "object_id": ["abc", "def"],
            "filters": [{"field": "created_by", "type": "eq", "value": "did:example:bob"}],
        });

        let Request::ObjectQuery(request) = parse(value) else {
            panic!("expected an object query");
        };
        let compiled = compile_object_query(&request);

        assert_eq!(compiled.owner.as_str(), "did:example:alice");
        assert_eq!(
            compiled.filters,
            vec![
                EqFilter::one("interface", "Collections"),
                EqFilter::one("context", "https://schema.org"),
                EqFilter::one("type", "Note"),
                EqFilter::many("object_id", vec!["abc".into(), "def".into()]),
                EqFilter::one("created_by", "did:example:bob"),
            ]
        );
    }

    #[test]
    fn test_object_query_minimal() {
        let mut value = base_members();
        value["@type"] = "ObjectQueryRequest".into();
        value["query"] = serde_json::json!({"interface": "Profile"});

        let Request::ObjectQuery(request) = parse(value) else {
            panic!("expected an object query");
        };
        let compiled = compile_object_query(&request);

        assert_eq!(compiled.filters, vec![EqFilter::one("interface", "Profile")]);
        assert_eq!(compiled.skip_token, None);
    }

    #[test]
    fn test_commit_query_object_ids_become_one_filter() {
        let mut value = base_members();
        value["@type"] = "CommitQueryRequest".into();
        value["query"] = serde_json::json!({"object_id": ["abc"]});

        let Request::CommitQuery(request) = parse(value) else {
            panic!("expected a commit query");
        };
        let compiled = compile_commit_query(&request);

        assert_eq!(compiled.owner.as_str(), "did:example:alice");
        assert_eq!(compiled.filters.len(), 1);
        assert_eq!(compiled.filters[0].field, "object_id");
        assert_eq!(compiled.filters[0].kind, "eq");
        assert_eq!(
            compiled.filters[0].value,
            FilterValue::Many(vec!["abc".into()])
        );
    }

    #[test]
    fn test_commit_query_revisions() {
        let mut value = base_members();
        value["@type"] = "CommitQueryRequest".into();
        value["query"] = serde_json::json!({"revision": ["r1", "r2"], "skip_token": "10"});

        let Request::CommitQuery(request) = parse(value) else {
            panic!("expected a commit query");
        };
        let compiled = compile_commit_query(&request);

        assert_eq!(
            compiled.filters,
            vec![EqFilter::many("rev", vec!["r1".into(), "r2".into()])]
        );
        assert_eq!(compiled.skip_token.as_deref(), Some("10"));
    }

    #[test]
    fn test_commit_query_without_query_compiles_unfiltered() {
        let mut value = base_members();
        value["@type"] = "CommitQueryRequest".into();

        let Request::CommitQuery(request) = parse(value) else {
            panic!("expected a commit query");
        };
        let compiled = compile_commit_query(&request);
        assert!(compiled.filters.is_empty());
    }
}
