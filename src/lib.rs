//! # remote-cursor
//!
//! Typed, index-addressable cursors over result sets that a remote API has
//! already materialized server-side.
//!
//! ## Features
//!
//! - **Random access**: fetch any item or page of a cursor by index
//! - **Field projection**: per-cursor default fields, overridable per call
//! - **Typed or raw**: deserialize pages into your item type, or keep the text
//! - **Cancellation**: every call takes a `CancellationToken`
//! - **HTTP transport**: retries, backoff and rate limiting built in
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use remote_cursor::http::{HttpClient, HttpClientConfig};
//! use remote_cursor::pipeline::{LoanPipeline, PipelineParameters};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> remote_cursor::Result<()> {
//!     let config = HttpClientConfig::builder()
//!         .base_url("https://api.elliemae.com")
//!         .header("Authorization", "Bearer ...")
//!         .build();
//!     let client = Arc::new(HttpClient::with_config(config)?);
//!     let token = CancellationToken::new();
//!
//!     let params = PipelineParameters::new().fields(["Loan.LoanNumber"]);
//!     let cursor = LoanPipeline::new(client).create_cursor(&params, &token).await?;
//!
//!     let first_page = cursor.get_items(0, Some(100), &token).await?;
//!     let last = cursor.get_item(cursor.count() as i64 - 1, &token).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  pipeline: LoanPipeline, new_loan_pipeline_cursor        │
//! └──────────────────────────────┬───────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴───────────────────────────┐
//! │  cursor: Cursor<Item>  → validate → PageRequest          │
//! └──────────────────────────────┬───────────────────────────┘
//!                                │ ApiRequest
//! ┌──────────────────────────────┴───────────────────────────┐
//! │  api: ApiObject → ApiTransport (HttpClient, or a fake)   │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Ordered query parameters
pub mod query;

/// Transport contract and API objects
pub mod api;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Server-backed cursors
pub mod cursor;

/// Loan pipeline domain
pub mod pipeline;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use api::{ApiObject, ApiRequest, ApiResponse, ApiTransport};
pub use cursor::{Cursor, FieldSelection, PageRequest};
pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
