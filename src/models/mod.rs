//! Core data models for model-config
//!
//! Table snapshots, typed cells, selection keys and validated update requests.

pub mod cell;
pub mod request;
pub mod selection;
pub mod table;

pub use cell::{coerce_request_value, CellValue};
pub use request::{UpdateBody, UpdatePayload, UpdateRequest, INVALID_PAYLOAD};
pub use selection::{SelectionKey, Segment, ALL_SEGMENTS, FALLBACK_SEGMENT};
pub use table::{fold_header, KeyColumns, Table, SEGMENT_COLUMN, TACTIC_COLUMN, VERTICAL_COLUMN};
