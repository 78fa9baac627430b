//! Change log for model-config
//!
//! Every cell an update actually changes produces one `ChangeLogEntry` with
//! the old and new value. Entries are appended to a dedicated sheet and are
//! never rewritten.
//!
//! # Architecture
//!
//! - `ChangeLogEntry`: one changed cell, stored positionally under `LOG_HEADER`.
//! - `ChangeLogWriter`: appends entries to the log sheet through a `SheetStore`.
//! - `cell_changed`: decides whether an incoming number differs from a cell.
//!
//! # Example
//!
//! ```rust,ignore
//! use model_config::audit::ChangeLogWriter;
//!
//! let writer = ChangeLogWriter::new("ChangeLog");
//! writer.record(store.as_ref(), &outcome.entries).await?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::{cell_changed, describe_change};
pub use entry::{format_timestamp, ChangeLogEntry, LOG_HEADER};
pub use logger::ChangeLogWriter;
