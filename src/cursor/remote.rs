//! Index-addressable cursor over a server-materialized result set

use super::types::{FieldSelection, PageRequest};
use crate::api::{ApiObject, ApiRequest, ApiTransport};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A read-only view over `count` items held server-side under `cursor_id`
///
/// The cursor keeps no client-side state beyond its identity: every lookup
/// is an independent request, so a cursor can be shared freely between
/// tasks. Dropping it does not release the server-side cursor.
///
/// Each operation comes in three forms:
/// - `get_items(start, limit, &token)` uses the cursor's default fields,
/// - `get_items_fields(start, limit, ["A", "B"])` overrides the fields,
/// - `get_items_with(start, limit, selection, &token)` is fully explicit.
pub struct Cursor<Item, C = HttpClient> {
    api: ApiObject<C>,
    cursor_id: String,
    count: u64,
    fields: Vec<String>,
    _item: PhantomData<fn() -> Item>,
}

impl<Item, C> Cursor<Item, C>
where
    Item: DeserializeOwned + Send,
    C: ApiTransport,
{
    /// Wrap a cursor id issued by the service
    pub fn new(
        api: ApiObject<C>,
        cursor_id: impl Into<String>,
        count: u64,
        fields: Option<Vec<String>>,
    ) -> Self {
        Self {
            api,
            cursor_id: cursor_id.into(),
            count,
            fields: fields.unwrap_or_default(),
            _item: PhantomData,
        }
    }

    /// Server-issued cursor id
    pub fn cursor_id(&self) -> &str {
        &self.cursor_id
    }

    /// Total number of items reachable through this cursor
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Fields requested when a call does not override them
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The shared transport
    pub fn client(&self) -> &Arc<C> {
        self.api.client()
    }

    pub fn api(&self) -> &ApiObject<C> {
        &self.api
    }

    /// Validate a page lookup and build its request
    ///
    /// Fails with [`Error::OutOfRange`] unless `0 <= start < count`, and with
    /// [`Error::InvalidArgument`] when `limit` is given and not positive.
    pub fn page_request(
        &self,
        start: i64,
        limit: Option<i64>,
        fields: &FieldSelection,
    ) -> Result<PageRequest> {
        check_index("start", start, self.count)?;
        check_limit(limit)?;

        Ok(PageRequest {
            cursor_id: self.cursor_id.clone(),
            start,
            limit,
            fields: fields.resolve(&self.fields).to_vec(),
        })
    }

    // ------------------------------------------------------------------------
    // Single item
    // ------------------------------------------------------------------------

    /// Fetch the item at `index` with the default fields
    pub async fn get_item(&self, index: i64, cancellation: &CancellationToken) -> Result<Item> {
        self.get_item_with(index, FieldSelection::Default, cancellation)
            .await
    }

    /// Fetch the item at `index` with the given fields
    pub async fn get_item_fields<I, S>(&self, index: i64, fields: I) -> Result<Item>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.get_item_with(
            index,
            FieldSelection::explicit(fields),
            &CancellationToken::new(),
        )
        .await
    }

    /// Fetch the item at `index`
    ///
    /// An in-range index whose page comes back empty is a [`Error::Decode`].
    pub async fn get_item_with(
        &self,
        index: i64,
        fields: impl Into<FieldSelection>,
        cancellation: &CancellationToken,
    ) -> Result<Item> {
        check_index("index", index, self.count)?;

        self.get_items_with(index, Some(1), fields, cancellation)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::decode(format!(
                    "cursor {} returned no item at index {index}",
                    self.cursor_id
                ))
            })
    }

    // ------------------------------------------------------------------------
    // Typed pages
    // ------------------------------------------------------------------------

    /// Fetch up to `limit` items starting at `start` with the default fields
    pub async fn get_items(
        &self,
        start: i64,
        limit: Option<i64>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<Item>> {
        self.get_items_with(start, limit, FieldSelection::Default, cancellation)
            .await
    }

    /// Fetch up to `limit` items starting at `start` with the given fields
    pub async fn get_items_fields<I, S>(
        &self,
        start: i64,
        limit: Option<i64>,
        fields: I,
    ) -> Result<Vec<Item>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.get_items_with(
            start,
            limit,
            FieldSelection::explicit(fields),
            &CancellationToken::new(),
        )
        .await
    }

    /// Fetch up to `limit` items starting at `start`
    pub async fn get_items_with(
        &self,
        start: i64,
        limit: Option<i64>,
        fields: impl Into<FieldSelection>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<Item>> {
        let page = self.page_request(start, limit, &fields.into())?;
        let request = self.api_request(&page, "get_items");
        self.api.post(request, cancellation).await
    }

    // ------------------------------------------------------------------------
    // Raw pages
    // ------------------------------------------------------------------------

    /// Fetch a page as unparsed response text with the default fields
    pub async fn get_items_raw(
        &self,
        start: i64,
        limit: Option<i64>,
        cancellation: &CancellationToken,
    ) -> Result<String> {
        self.get_items_raw_with(start, limit, FieldSelection::Default, cancellation)
            .await
    }

    /// Fetch a page as unparsed response text with the given fields
    pub async fn get_items_raw_fields<I, S>(
        &self,
        start: i64,
        limit: Option<i64>,
        fields: I,
    ) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.get_items_raw_with(
            start,
            limit,
            FieldSelection::explicit(fields),
            &CancellationToken::new(),
        )
        .await
    }

    /// Fetch a page as unparsed response text
    ///
    /// The text is returned exactly as the service sent it and is not
    /// guaranteed to match the schema `Item` deserializes from.
    pub async fn get_items_raw_with(
        &self,
        start: i64,
        limit: Option<i64>,
        fields: impl Into<FieldSelection>,
        cancellation: &CancellationToken,
    ) -> Result<String> {
        let page = self.page_request(start, limit, &fields.into())?;
        let request = self.api_request(&page, "get_items_raw");
        self.api.post_raw(request, cancellation).await
    }

    // ------------------------------------------------------------------------
    // Walking the whole set
    // ------------------------------------------------------------------------

    /// Stream consecutive pages of `page_size` items from the start
    ///
    /// Ends after the last item or on the first empty page. An error ends
    /// the stream after it is yielded.
    pub fn pages<'a>(
        &'a self,
        page_size: i64,
        fields: FieldSelection,
        cancellation: &'a CancellationToken,
    ) -> Result<impl Stream<Item = Result<Vec<Item>>> + 'a> {
        check_limit(Some(page_size))?;

        Ok(futures::stream::try_unfold(0_i64, move |start| {
            let fields = fields.clone();
            async move {
                if !in_range(start, self.count) {
                    return Ok::<_, Error>(None);
                }
                let items = self
                    .get_items_with(start, Some(page_size), fields, cancellation)
                    .await?;
                if items.is_empty() {
                    return Ok(None);
                }
                let next = start + items.len() as i64;
                Ok(Some((items, next)))
            }
        }))
    }

    fn api_request(&self, page: &PageRequest, operation: &str) -> ApiRequest {
        debug!(
            cursor = %page.cursor_id,
            start = page.start,
            limit = ?page.limit,
            fields = page.fields.len(),
            "{operation}"
        );

        self.api
            .request(None)
            .query(page.query())
            .json(page.body())
            .operation(operation)
    }
}

impl<Item, C> Clone for Cursor<Item, C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            cursor_id: self.cursor_id.clone(),
            count: self.count,
            fields: self.fields.clone(),
            _item: PhantomData,
        }
    }
}

impl<Item, C> fmt::Debug for Cursor<Item, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("api", &self.api)
            .field("cursor_id", &self.cursor_id)
            .field("count", &self.count)
            .field("fields", &self.fields)
            .finish()
    }
}

fn in_range(value: i64, count: u64) -> bool {
    u64::try_from(value).is_ok_and(|v| v < count)
}

fn check_index(name: &str, value: i64, count: u64) -> Result<()> {
    if in_range(value, count) {
        Ok(())
    } else {
        Err(Error::out_of_range(name, value, count))
    }
}

fn check_limit(limit: Option<i64>) -> Result<()> {
    match limit {
        Some(limit) if limit <= 0 => Err(Error::invalid_argument(
            "limit",
            format!("must be greater than 0, got {limit}"),
        )),
        _ => Ok(()),
    }
}
