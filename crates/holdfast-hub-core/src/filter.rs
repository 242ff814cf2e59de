//! Equality filters applied by queries against stored metadata.

use serde::{Deserialize, Serialize};

/// The value side of an equality filter: a single string or a set of
/// alternatives, any one of which satisfies the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// Whether the given field value satisfies this filter.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            FilterValue::One(v) => v == value,
            FilterValue::Many(vs) => vs.iter().any(|v| v == value),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::One(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::One(s)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(vs: Vec<String>) -> Self {
        FilterValue::Many(vs)
    }
}

/// An equality filter over one metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqFilter {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: FilterValue,
}

impl EqFilter {
    /// Filter on a field equalling one value.
    pub fn one(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: "eq".to_string(),
            value: FilterValue::One(value.into()),
        }
    }

    /// Filter on a field equalling any of several values.
    pub fn many(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            kind: "eq".to_string(),
            value: FilterValue::Many(values),
        }
    }
}
