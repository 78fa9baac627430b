//! Change log entry data structures

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CellValue;

/// Header row written to an empty change log table
pub const LOG_HEADER: [&str; 8] = [
    "Timestamp",
    "User",
    "Tactic",
    "Vertical",
    "Segment",
    "Parameter",
    "Old Value",
    "New Value",
];

/// Format a timestamp the way change log rows store it
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A single cell change
///
/// Created only when the old and new values differ; never modified after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// ISO-8601 UTC time of the update call
    pub timestamp: String,
    pub user: String,
    pub tactic: String,
    pub vertical: String,
    /// The matched row's own segment, never the `ALL` sentinel
    pub segment: String,
    /// Column header in its original case
    pub parameter: String,
    pub old_value: CellValue,
    pub new_value: CellValue,
}

impl ChangeLogEntry {
    /// Positional row for the change log table
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::from_text(self.timestamp.clone()),
            CellValue::from_text(self.user.clone()),
            CellValue::from_text(self.tactic.clone()),
            CellValue::from_text(self.vertical.clone()),
            CellValue::from_text(self.segment.clone()),
            CellValue::from_text(self.parameter.clone()),
            self.old_value.clone(),
            self.new_value.clone(),
        ]
    }

    /// Rebuild an entry from a change log row; short rows pad with blanks
    pub fn from_row(row: &[CellValue]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        let text = |i: usize| cell(i).to_string();
        Self {
            timestamp: text(0),
            user: text(1),
            tactic: text(2),
            vertical: text(3),
            segment: text(4),
            parameter: text(5),
            old_value: cell(6),
            new_value: cell(7),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        format!(
            "[{}] {} {}/{}/{} {}: {}",
            self.timestamp,
            self.user,
            self.tactic,
            self.vertical,
            self.segment,
            self.parameter,
            super::diff::describe_change(&self.old_value, &self.new_value)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> ChangeLogEntry {
        ChangeLogEntry {
            timestamp: "2025-01-02T03:04:05.006Z".into(),
            user: "alice".into(),
            tactic: "A".into(),
            vertical: "V1".into(),
            segment: "S1".into(),
            parameter: "Cost".into(),
            old_value: CellValue::Number(1000.0),
            new_value: CellValue::Number(1200.5),
        }
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(at), "2025-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_row_layout_matches_header() {
        let row = entry().to_row();
        assert_eq!(row.len(), LOG_HEADER.len());
        assert_eq!(row[5], CellValue::Text("Cost".into()));
        assert_eq!(row[6], CellValue::Number(1000.0));
        assert_eq!(row[7], CellValue::Number(1200.5));
    }

    #[test]
    fn test_from_row() {
        let original = entry();
        assert_eq!(ChangeLogEntry::from_row(&original.to_row()), original);

        let short = ChangeLogEntry::from_row(&[CellValue::from("ts")]);
        assert_eq!(short.timestamp, "ts");
        assert_eq!(short.new_value, CellValue::Empty);
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let json = serde_json::to_value(entry()).unwrap();
        assert_eq!(json["oldValue"], 1000);
        assert_eq!(json["newValue"], 1200.5);
    }

    #[test]
    fn test_human_readable_format() {
        let formatted = entry().format_human_readable();
        assert!(formatted.contains("alice"));
        assert!(formatted.contains("A/V1/S1"));
        assert!(formatted.contains("Cost: 1000 -> 1200.5"));
    }
}
