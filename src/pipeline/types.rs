//! Loan pipeline request and item types

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the loan pipeline
///
/// `fields` holds the projected values keyed by canonical field name, all
/// rendered as strings by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPipelineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_guid: Option<String>,

    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl LoanPipelineData {
    /// Value of a projected field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort on a single canonical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortCriterion {
    pub canonical_name: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortCriterion {
    pub fn new(canonical_name: impl Into<String>, order: SortOrder) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            order,
        }
    }
}

/// Query describing which loans a pipeline view or cursor covers
///
/// `filter` is passed through untouched; the service defines its grammar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_order: Vec<SortCriterion>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl PipelineParameters {
    /// Parameters selecting every row with no projection
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: JsonValue) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn sort(mut self, canonical_name: impl Into<String>, order: SortOrder) -> Self {
        self.sort_order.push(SortCriterion::new(canonical_name, order));
        self
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}
