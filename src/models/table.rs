//! Rectangular table snapshot
//!
//! Row 0 is the header row. Header names keep their original case for display
//! and are folded (trimmed, lowercased) for lookup.

use serde::{Deserialize, Serialize};

use super::cell::CellValue;

/// Folded name of the tactic key column
pub const TACTIC_COLUMN: &str = "tactic";
/// Folded name of the vertical key column
pub const VERTICAL_COLUMN: &str = "vertical";
/// Folded name of the segment key column
pub const SEGMENT_COLUMN: &str = "segment";

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Fold a header name for case-insensitive lookup
pub fn fold_header(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Positions of the three key columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyColumns {
    pub tactic: usize,
    pub vertical: usize,
    pub segment: usize,
}

/// A table loaded from the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create a table from raw rows (header first)
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// All rows including the header
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Consume the table, returning its rows
    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }

    /// True when the table has no rows at all, not even a header
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows including the header
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Header names, trimmed but with their original case
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|header| header.iter().map(CellValue::trimmed).collect())
            .unwrap_or_default()
    }

    /// Resolve a column position by case-insensitive name
    ///
    /// The first matching header wins.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = fold_header(name);
        self.rows
            .first()?
            .iter()
            .position(|h| fold_header(&h.to_string()) == wanted)
    }

    /// Resolve tactic, vertical and segment; `None` if any is missing
    pub fn key_columns(&self) -> Option<KeyColumns> {
        Some(KeyColumns {
            tactic: self.column_index(TACTIC_COLUMN)?,
            vertical: self.column_index(VERTICAL_COLUMN)?,
            segment: self.column_index(SEGMENT_COLUMN)?,
        })
    }

    /// Data rows with their table index (the header is index 0)
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[CellValue])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, row)| (idx, row.as_slice()))
    }

    /// Cell at `(row, col)`; missing cells of ragged rows read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Overwrite a cell, padding a short row with empty cells first
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if let Some(r) = self.rows.get_mut(row) {
            if r.len() <= col {
                r.resize(col + 1, CellValue::Empty);
            }
            r[col] = value;
        }
    }
}

impl From<Vec<Vec<CellValue>>> for Table {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            vec![" Tactic ".into(), "VERTICAL".into(), "Segment".into(), "Cost".into()],
            vec!["A".into(), "V1".into(), "S1".into(), 10.0.into()],
            vec!["A".into(), "V1".into()],
        ])
    }

    #[test]
    fn test_headers_keep_case() {
        assert_eq!(sample().headers(), vec!["Tactic", "VERTICAL", "Segment", "Cost"]);
    }

    #[test]
    fn test_column_index_is_case_insensitive() {
        let table = sample();
        assert_eq!(table.column_index("tactic"), Some(0));
        assert_eq!(table.column_index("COST"), Some(3));
        assert_eq!(table.column_index(" vertical "), Some(1));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn test_key_columns() {
        let cols = sample().key_columns().unwrap();
        assert_eq!(cols, KeyColumns { tactic: 0, vertical: 1, segment: 2 });

        let no_segment = Table::new(vec![vec!["tactic".into(), "vertical".into()]]);
        assert!(no_segment.key_columns().is_none());
    }

    #[test]
    fn test_ragged_rows() {
        let mut table = sample();
        assert_eq!(table.cell(2, 3), &CellValue::Empty);
        assert_eq!(table.cell(9, 0), &CellValue::Empty);

        table.set_cell(2, 3, CellValue::Number(5.0));
        assert_eq!(table.rows()[2].len(), 4);
        assert_eq!(table.cell(2, 2), &CellValue::Empty);
        assert_eq!(table.cell(2, 3), &CellValue::Number(5.0));
    }

    #[test]
    fn test_data_rows_skip_header() {
        let indices: Vec<usize> = sample().data_rows().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::default();
        assert!(table.is_empty());
        assert!(table.headers().is_empty());
        assert_eq!(table.column_index("tactic"), None);
    }
}
