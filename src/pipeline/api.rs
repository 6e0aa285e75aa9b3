//! Loan pipeline API object and cursor factory

use super::types::{LoanPipelineData, PipelineParameters};
use crate::api::{ApiObject, ApiRequest, ApiResponse, ApiTransport};
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::query::QueryParameters;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Base path of the loan pipeline collection
pub const LOAN_PIPELINE_PATH: &str = "encompass/v1/loanPipeline";

/// Response header carrying a newly created cursor id
pub const CURSOR_HEADER: &str = "x-cursor";

/// Response header carrying the number of items behind a cursor
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Cursor over loan pipeline rows
pub type LoanPipelineCursor<C = HttpClient> = Cursor<LoanPipelineData, C>;

/// Bind an existing pipeline cursor id to a client
pub fn new_loan_pipeline_cursor<C: ApiTransport>(
    client: Arc<C>,
    cursor_id: impl Into<String>,
    count: u64,
    fields: Option<Vec<String>>,
) -> LoanPipelineCursor<C> {
    Cursor::new(
        ApiObject::new(client, LOAN_PIPELINE_PATH),
        cursor_id,
        count,
        fields,
    )
}

/// The loan pipeline collection
#[derive(Debug)]
pub struct LoanPipeline<C = HttpClient> {
    api: ApiObject<C>,
}

impl<C: ApiTransport> LoanPipeline<C> {
    /// Bind the pipeline collection to a client
    pub fn new(client: Arc<C>) -> Self {
        Self {
            api: ApiObject::new(client, LOAN_PIPELINE_PATH),
        }
    }

    /// Run a pipeline query and return up to `limit` rows
    pub async fn view(
        &self,
        parameters: &PipelineParameters,
        limit: Option<i64>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<LoanPipelineData>> {
        let request = self.view_request(parameters, limit, "view")?;
        self.api.post(request, cancellation).await
    }

    /// Run a pipeline query and return the unparsed response text
    pub async fn view_raw(
        &self,
        parameters: &PipelineParameters,
        limit: Option<i64>,
        cancellation: &CancellationToken,
    ) -> Result<String> {
        let request = self.view_request(parameters, limit, "view_raw")?;
        self.api.post_raw(request, cancellation).await
    }

    /// Materialize a random-access cursor for a pipeline query
    ///
    /// The cursor's default fields are the query's fields.
    pub async fn create_cursor(
        &self,
        parameters: &PipelineParameters,
        cancellation: &CancellationToken,
    ) -> Result<LoanPipelineCursor<C>> {
        let query = QueryParameters::new()
            .with("cursorType", "randomAccess")
            .with("limit", 1);
        let request = self
            .api
            .request(None)
            .query(query)
            .json(serde_json::to_value(parameters)?)
            .operation("create_cursor");

        let response = self.api.send(request, cancellation).await?;
        let (cursor_id, count) = cursor_headers(&response)?;
        debug!(cursor = %cursor_id, count, "Created pipeline cursor");

        Ok(Cursor::new(
            self.api.clone(),
            cursor_id,
            count,
            Some(parameters.fields.clone()),
        ))
    }

    fn view_request(
        &self,
        parameters: &PipelineParameters,
        limit: Option<i64>,
        operation: &str,
    ) -> Result<ApiRequest> {
        if let Some(limit) = limit.filter(|l| *l <= 0) {
            return Err(Error::invalid_argument(
                "limit",
                format!("must be greater than 0, got {limit}"),
            ));
        }

        Ok(self
            .api
            .request(None)
            .query(QueryParameters::new().with_opt("limit", limit))
            .json(serde_json::to_value(parameters)?)
            .operation(operation))
    }
}

impl<C> Clone for LoanPipeline<C> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

fn cursor_headers(response: &ApiResponse) -> Result<(String, u64)> {
    let cursor_id = response
        .header(CURSOR_HEADER)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::decode(format!("missing {CURSOR_HEADER} response header")))?;

    let count = response
        .header(TOTAL_COUNT_HEADER)
        .ok_or_else(|| Error::decode(format!("missing {TOTAL_COUNT_HEADER} response header")))?;
    let count = count.trim().parse::<u64>().map_err(|e| {
        Error::decode(format!(
            "invalid {TOTAL_COUNT_HEADER} header '{count}': {e}"
        ))
    })?;

    Ok((cursor_id.to_string(), count))
}
