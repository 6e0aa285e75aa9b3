//! Server-backed cursors
//!
//! A cursor is an opaque id for a result set the service has already
//! materialized, plus the number of items in it. [`Cursor`] turns index
//! based lookups into paged requests against that set.
//!
//! # Request shape
//!
//! ```text
//! POST <collection>?cursor=<id>&start=<n>[&limit=<n>]
//! {"fields": ["LoanNumber", ...]}
//! ```
//!
//! Argument checks happen before anything is sent: a bad index is
//! [`Error::OutOfRange`](crate::Error::OutOfRange), a non-positive limit is
//! [`Error::InvalidArgument`](crate::Error::InvalidArgument). Transport
//! failures are returned as the transport reported them.

mod remote;
mod types;

pub use remote::Cursor;
pub use types::{FieldSelection, PageRequest};
