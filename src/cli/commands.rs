//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page through server-side loan pipeline cursors
#[derive(Parser, Debug)]
#[command(name = "remote-cursor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the API (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a random-access pipeline cursor
    Create {
        /// Fields to project (comma-separated)
        #[arg(long)]
        fields: Option<String>,

        /// Pipeline filter as inline JSON
        #[arg(long)]
        filter_json: Option<String>,
    },

    /// Fetch a single item from a cursor
    Item {
        #[command(flatten)]
        cursor: CursorArgs,

        /// Zero-based item index
        #[arg(long, allow_negative_numbers = true)]
        index: i64,
    },

    /// Fetch a page of items from a cursor
    Items {
        #[command(flatten)]
        cursor: CursorArgs,

        /// Zero-based offset of the first item
        #[arg(long, allow_negative_numbers = true)]
        start: i64,

        /// Maximum number of items (server default when omitted)
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Print the response body exactly as received
        #[arg(long)]
        raw: bool,
    },

    /// Fetch every item of a cursor, one page at a time
    Dump {
        #[command(flatten)]
        cursor: CursorArgs,

        /// Items per request
        #[arg(long, default_value = "100")]
        page_size: i64,
    },
}

/// Identifies an existing cursor
#[derive(clap::Args, Debug, Clone)]
pub struct CursorArgs {
    /// Cursor id returned by `create`
    #[arg(long = "cursor")]
    pub cursor_id: String,

    /// Number of items behind the cursor
    #[arg(long)]
    pub count: u64,

    /// Fields to project (comma-separated); the empty string requests none
    #[arg(long)]
    pub fields: Option<String>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}
