//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, CursorArgs, OutputFormat};
use crate::config::ClientConfig;
use crate::cursor::FieldSelection;
use crate::error::{Result, ResultExt};
use crate::http::HttpClient;
use crate::pipeline::{
    new_loan_pipeline_cursor, LoanPipeline, LoanPipelineCursor, PipelineParameters,
};
use crate::types::split_list;
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
    cancellation: CancellationToken,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            cancellation: CancellationToken::new(),
        }
    }

    /// Token that aborts the running command when cancelled
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = Arc::new(self.build_client()?);

        match &self.cli.command {
            Commands::Create {
                fields,
                filter_json,
            } => {
                self.create(client, fields.as_deref(), filter_json.as_deref())
                    .await
            }
            Commands::Item { cursor, index } => self.item(client, cursor, *index).await,
            Commands::Items {
                cursor,
                start,
                limit,
                raw,
            } => self.items(client, cursor, *start, *limit, *raw).await,
            Commands::Dump { cursor, page_size } => self.dump(client, cursor, *page_size).await,
        }
    }

    /// Load the config file (if any) and apply command-line overrides
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.cli.base_url {
            config.base_url = Some(url.clone());
        }
        config.validate()?;
        Ok(config)
    }

    fn build_client(&self) -> Result<HttpClient> {
        let config = self.load_config()?;
        HttpClient::with_config(config.to_http_config()?)
    }

    async fn create(
        &self,
        client: Arc<HttpClient>,
        fields: Option<&str>,
        filter_json: Option<&str>,
    ) -> Result<()> {
        let mut params = PipelineParameters::new();
        if let Some(fields) = fields {
            params = params.fields(split_list(fields));
        }
        if let Some(filter) = filter_json {
            params = params.filter(serde_json::from_str(filter).context("parsing --filter-json")?);
        }

        let cursor = LoanPipeline::new(client)
            .create_cursor(&params, &self.cancellation)
            .await?;
        info!(cursor = cursor.cursor_id(), count = cursor.count(), "Cursor created");

        self.output(&json!({
            "cursorId": cursor.cursor_id(),
            "count": cursor.count(),
        }))
    }

    async fn item(&self, client: Arc<HttpClient>, args: &CursorArgs, index: i64) -> Result<()> {
        let cursor = Self::open_cursor(client, args);
        let item = cursor
            .get_item_with(index, Self::selection(args), &self.cancellation)
            .await?;
        self.output(&item)
    }

    async fn items(
        &self,
        client: Arc<HttpClient>,
        args: &CursorArgs,
        start: i64,
        limit: Option<i64>,
        raw: bool,
    ) -> Result<()> {
        let cursor = Self::open_cursor(client, args);
        let fields = Self::selection(args);

        if raw {
            let body = cursor
                .get_items_raw_with(start, limit, fields, &self.cancellation)
                .await?;
            println!("{body}");
            return Ok(());
        }

        let items = cursor
            .get_items_with(start, limit, fields, &self.cancellation)
            .await?;
        self.output(&items)
    }

    async fn dump(&self, client: Arc<HttpClient>, args: &CursorArgs, page_size: i64) -> Result<()> {
        let cursor = Self::open_cursor(client, args);
        let pages = cursor.pages(page_size, Self::selection(args), &self.cancellation)?;
        let mut pages = Box::pin(pages);

        let mut total = 0usize;
        while let Some(page) = pages.next().await {
            for item in page? {
                self.output(&item)?;
                total += 1;
            }
        }
        info!(cursor = cursor.cursor_id(), total, "Dump complete");
        Ok(())
    }

    fn open_cursor(client: Arc<HttpClient>, args: &CursorArgs) -> LoanPipelineCursor {
        new_loan_pipeline_cursor(client, args.cursor_id.clone(), args.count, None)
    }

    /// `--fields` given (even empty) is an explicit selection
    fn selection(args: &CursorArgs) -> FieldSelection {
        args.fields
            .as_deref()
            .map_or(FieldSelection::Default, |f| FieldSelection::Explicit(split_list(f)))
    }

    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_items_command() {
        let cli = Cli::try_parse_from([
            "remote-cursor",
            "items",
            "--cursor",
            "abc",
            "--count",
            "10",
            "--start",
            "0",
            "--limit",
            "5",
            "--fields",
            "LoanNumber",
        ])
        .unwrap();

        match cli.command {
            Commands::Items {
                cursor,
                start,
                limit,
                raw,
            } => {
                assert_eq!(cursor.cursor_id, "abc");
                assert_eq!(cursor.count, 10);
                assert_eq!(start, 0);
                assert_eq!(limit, Some(5));
                assert!(!raw);
                assert_eq!(
                    Runner::selection(&cursor),
                    FieldSelection::explicit(["LoanNumber"])
                );
            }
            other => panic!("Expected Items, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_negative_index() {
        let cli = Cli::try_parse_from([
            "remote-cursor",
            "item",
            "--cursor",
            "abc",
            "--count",
            "3",
            "--index",
            "-1",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Item { index: -1, .. }));
    }

    #[test]
    fn test_field_selection_from_args() {
        let mut args = CursorArgs {
            cursor_id: "abc".to_string(),
            count: 1,
            fields: None,
        };
        assert_eq!(Runner::selection(&args), FieldSelection::Default);

        args.fields = Some(String::new());
        assert_eq!(Runner::selection(&args), FieldSelection::Explicit(vec![]));
    }

    #[tokio::test]
    async fn test_run_items_against_server() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/encompass/v1/loanPipeline"))
            .and(query_param("cursor", "abc"))
            .and(query_param("start", "2"))
            .and(body_json(json!({ "fields": [] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let cli = Cli::try_parse_from([
            "remote-cursor",
            "--base-url",
            uri.as_str(),
            "items",
            "--cursor",
            "abc",
            "--count",
            "4",
            "--start",
            "2",
        ])
        .unwrap();

        Runner::new(cli).run().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_create_rejects_bad_filter_json() {
        let cli = Cli::try_parse_from([
            "remote-cursor",
            "--base-url",
            "http://127.0.0.1:9",
            "create",
            "--filter-json",
            "{not json",
        ])
        .unwrap();

        let err = Runner::new(cli).run().await.unwrap_err();
        assert!(err.to_string().starts_with("parsing --filter-json: "));
    }

    #[tokio::test]
    async fn test_run_rejects_out_of_range_start() {
        let cli = Cli::try_parse_from([
            "remote-cursor",
            "--base-url",
            "http://127.0.0.1:9",
            "items",
            "--cursor",
            "abc",
            "--count",
            "4",
            "--start",
            "4",
        ])
        .unwrap();

        let err = Runner::new(cli).run().await.unwrap_err();
        assert!(err.is_validation());
    }
}
