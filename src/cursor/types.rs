//! Cursor request types
//!
//! A [`PageRequest`] is the pure result of validating a page lookup against
//! a cursor. Rendering it into a query string and body involves no I/O, so
//! identical inputs always produce identical requests.

use crate::query::QueryParameters;
use crate::types::JsonValue;
use serde_json::json;

/// Which fields to request for each item
///
/// `Default` falls back to the cursor's own field list. `Explicit` always
/// wins, even when the list is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSelection {
    /// Use the cursor's default fields
    #[default]
    Default,
    /// Use exactly these fields
    Explicit(Vec<String>),
}

impl FieldSelection {
    /// Select an explicit list of fields
    pub fn explicit<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Explicit(fields.into_iter().map(Into::into).collect())
    }

    /// Resolve against the cursor's default fields
    pub fn resolve<'a>(&'a self, defaults: &'a [String]) -> &'a [String] {
        match self {
            Self::Default => defaults,
            Self::Explicit(fields) => fields,
        }
    }
}

impl From<Option<Vec<String>>> for FieldSelection {
    fn from(fields: Option<Vec<String>>) -> Self {
        fields.map_or(Self::Default, Self::Explicit)
    }
}

impl From<Vec<String>> for FieldSelection {
    fn from(fields: Vec<String>) -> Self {
        Self::Explicit(fields)
    }
}

impl From<&[&str]> for FieldSelection {
    fn from(fields: &[&str]) -> Self {
        Self::explicit(fields.iter().copied())
    }
}

/// A validated page lookup against a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Server-issued cursor id
    pub cursor_id: String,
    /// Zero-based offset of the first item
    pub start: i64,
    /// Maximum number of items, server default when absent
    pub limit: Option<i64>,
    /// Effective field list
    pub fields: Vec<String>,
}

impl PageRequest {
    /// Query parameters: `cursor`, `start`, then `limit` when present
    pub fn query(&self) -> QueryParameters {
        QueryParameters::new()
            .with("cursor", &self.cursor_id)
            .with("start", self.start)
            .with_opt("limit", self.limit)
    }

    /// Request body carrying the field projection
    pub fn body(&self) -> JsonValue {
        json!({ "fields": self.fields })
    }
}
