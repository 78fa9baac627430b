//! Update requests
//!
//! `UpdateBody` is the wire shape posted to `/api/update`; `UpdateRequest` is
//! the validated form handed to the updater.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::selection::{SelectionKey, Segment};
use crate::error::{ModelConfigError, ModelConfigResult};

/// Message returned for any structurally invalid update
pub const INVALID_PAYLOAD: &str = "Invalid payload";

/// Body of an update call
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    #[serde(default)]
    pub payload: Option<UpdatePayload>,
    #[serde(default)]
    pub is_all_segments: Option<bool>,
}

/// Selection and values as sent by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePayload {
    #[serde(default)]
    pub tactic: Option<String>,
    #[serde(default)]
    pub vertical: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub values: Option<Map<String, Value>>,
}

/// A validated update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub key: SelectionKey,
    /// Column name to raw value, in insertion order
    pub values: Map<String, Value>,
}

impl UpdateRequest {
    /// Create an update request directly
    pub fn new(key: SelectionKey, values: Map<String, Value>) -> Self {
        Self { key, values }
    }

    /// Validate a wire body
    ///
    /// Tactic and vertical must be present and non-empty and a values map must
    /// be supplied. `isAllSegments` or a literal `ALL` segment select every
    /// segment; otherwise a missing segment matches the empty segment.
    pub fn from_body(body: UpdateBody) -> ModelConfigResult<Self> {
        let invalid = || ModelConfigError::Validation(INVALID_PAYLOAD.to_string());

        let payload = body.payload.ok_or_else(invalid)?;
        let tactic = payload.tactic.filter(|t| !t.is_empty()).ok_or_else(invalid)?;
        let vertical = payload
            .vertical
            .filter(|v| !v.is_empty())
            .ok_or_else(invalid)?;
        let values = payload.values.ok_or_else(invalid)?;

        let segment = if body.is_all_segments.unwrap_or(false) {
            Segment::All
        } else {
            Segment::parse(payload.segment.as_deref().unwrap_or(""))
        };

        Ok(Self {
            key: SelectionKey::new(tactic, vertical, segment),
            values,
        })
    }
}
