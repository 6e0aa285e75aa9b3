//! Transport contract between domain objects and the wire
//!
//! An [`ApiTransport`] sends a fully built [`ApiRequest`] and hands back the
//! response. Domain code never talks to a transport directly; it goes through
//! an [`ApiObject`], which binds a shared transport to one collection's base
//! path (e.g. `encompass/v1/loanPipeline`).

use crate::error::{Error, Result};
use crate::query::QueryParameters;
use crate::types::{JsonValue, StringMap};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A POST request against an API collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    /// Path relative to the transport's base URL
    pub path: String,
    /// Query parameters, rendered in insertion order
    pub query: QueryParameters,
    /// JSON request body
    pub body: Option<JsonValue>,
    /// Name of the calling operation, used for logging
    pub operation: String,
    /// Request-specific headers
    pub headers: StringMap,
}

impl ApiRequest {
    /// Create a request for a path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the query parameters
    #[must_use]
    pub fn query(mut self, query: QueryParameters) -> Self {
        self.query = query;
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the operation name
    #[must_use]
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// The rendered query string, without the leading `?`
    pub fn query_string(&self) -> String {
        self.query.to_query_string()
    }

    /// Path and query joined as they appear on the wire
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }
}

/// A successful response from the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lower-cased
    pub headers: StringMap,
    /// Unparsed response body
    pub body: String,
}

impl ApiResponse {
    /// Look up a header by name, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Sends API requests
///
/// Implementors must honour the cancellation token: once it fires, the
/// in-flight call is abandoned and [`Error::Cancelled`] is returned.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Send a request and return the raw response
    async fn send(
        &self,
        request: ApiRequest,
        cancellation: &CancellationToken,
    ) -> Result<ApiResponse>;

    /// Send a request and return the unparsed body
    async fn post_raw(
        &self,
        request: ApiRequest,
        cancellation: &CancellationToken,
    ) -> Result<String> {
        Ok(self.send(request, cancellation).await?.body)
    }

    /// Send a request and deserialize the JSON body
    async fn post<T>(&self, request: ApiRequest, cancellation: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let body = self.post_raw(request, cancellation).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// A shared transport bound to one API collection
pub struct ApiObject<C> {
    client: Arc<C>,
    base_path: String,
}

impl<C: ApiTransport> ApiObject<C> {
    /// Bind a transport to a base path
    pub fn new(client: Arc<C>, base_path: impl Into<String>) -> Self {
        Self {
            client,
            base_path: base_path.into(),
        }
    }

    /// The shared transport
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Start a request against the base path, or a path below it
    pub fn request(&self, path: Option<&str>) -> ApiRequest {
        let path = match path {
            Some(p) if !p.is_empty() => format!(
                "{}/{}",
                self.base_path.trim_end_matches('/'),
                p.trim_start_matches('/')
            ),
            _ => self.base_path.clone(),
        };
        ApiRequest::new(path)
    }

    /// Send a request, failing fast if `cancellation` already fired
    pub async fn send(
        &self,
        request: ApiRequest,
        cancellation: &CancellationToken,
    ) -> Result<ApiResponse> {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.client.send(request, cancellation).await
    }

    /// Send a request and return the unparsed body
    pub async fn post_raw(
        &self,
        request: ApiRequest,
        cancellation: &CancellationToken,
    ) -> Result<String> {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.client.post_raw(request, cancellation).await
    }

    /// Send a request and deserialize the JSON body
    pub async fn post<T>(&self, request: ApiRequest, cancellation: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.client.post(request, cancellation).await
    }
}

impl<C> Clone for ApiObject<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            base_path: self.base_path.clone(),
        }
    }
}

impl<C> fmt::Debug for ApiObject<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiObject")
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}
