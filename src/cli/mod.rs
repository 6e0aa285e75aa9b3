//! CLI module
//!
//! Command-line interface for loan pipeline cursors.
//!
//! # Commands
//!
//! - `create` - Materialize a random-access cursor for a pipeline query
//! - `item` - Fetch one item by index
//! - `items` - Fetch a page (typed JSON or raw server text)
//! - `dump` - Fetch every item, page by page

mod commands;
mod runner;

pub use commands::{Cli, Commands, CursorArgs, OutputFormat};
pub use runner::Runner;
