//! Ordered query parameters
//!
//! Unlike a map, the parameter list keeps insertion order so that the
//! rendered query string is deterministic.

use std::fmt;
use url::form_urlencoded;

/// An ordered list of URL query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    params: Vec<(String, String)>,
}

impl QueryParameters {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn add(&mut self, key: impl Into<String>, value: impl ToString) {
        self.params.push((key.into(), value.to_string()));
    }

    /// Append a parameter, builder style
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.add(key, value);
        self
    }

    /// Append a parameter only when a value is present
    #[must_use]
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.add(key, value);
        }
        self
    }

    /// Look up the first value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over the parameters in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Render as an `application/x-www-form-urlencoded` string (no leading `?`)
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.add(k, v);
        }
        params
    }
}
