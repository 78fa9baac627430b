//! Row matching and in-place table updates
//!
//! The updater works on a table snapshot only; loading and persisting is the
//! caller's job. Each changed cell yields one change log entry, in row order
//! and then in the insertion order of the request's values.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::audit::{cell_changed, format_timestamp, ChangeLogEntry};
use crate::models::{coerce_request_value, CellValue, KeyColumns, Segment, SelectionKey, Table, UpdateRequest};

/// Tunables for `apply_update`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Count only rows with at least one changed cell
    pub strict_row_count: bool,
}

/// Result of applying an update to a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    /// Matched rows (or changed rows, with `strict_row_count`)
    pub rows_updated: usize,
    pub entries: Vec<ChangeLogEntry>,
}

impl UpdateOutcome {
    /// True when the snapshot must be written back
    pub fn has_changes(&self) -> bool {
        !self.entries.is_empty()
    }
}

fn row_matches(table: &Table, cols: KeyColumns, row: usize, key: &SelectionKey) -> bool {
    if table.cell(row, cols.tactic).trimmed() != key.tactic.trim() {
        return false;
    }
    if table.cell(row, cols.vertical).trimmed() != key.vertical.trim() {
        return false;
    }
    match &key.segment {
        Segment::All => true,
        Segment::Named(segment) => table.cell(row, cols.segment).trimmed() == segment.trim(),
    }
}

/// Indices of every data row matching `key`
///
/// Empty when a key column is missing from the header.
pub fn locate_rows(table: &Table, key: &SelectionKey) -> Vec<usize> {
    let Some(cols) = table.key_columns() else {
        return Vec::new();
    };
    table
        .data_rows()
        .map(|(idx, _)| idx)
        .filter(|&idx| row_matches(table, cols, idx, key))
        .collect()
}

/// First data row matching `key`, reading `ALL` as the fallback segment
pub fn locate_single_row(table: &Table, key: &SelectionKey) -> Option<usize> {
    let single = SelectionKey::new(
        key.tactic.clone(),
        key.vertical.clone(),
        Segment::Named(key.segment.for_single_row().to_string()),
    );
    locate_rows(table, &single).into_iter().next()
}

/// Header name to cell for one row
pub fn row_as_object(table: &Table, row: usize) -> Map<String, Value> {
    table
        .headers()
        .into_iter()
        .enumerate()
        .map(|(col, header)| {
            let value = serde_json::to_value(table.cell(row, col)).unwrap_or(Value::Null);
            (header, value)
        })
        .collect()
}

/// Apply `request` to `table` in place
///
/// Unknown columns and values that do not coerce to a number are skipped.
/// A cell whose current value already equals the new number is left alone
/// and produces no entry.
pub fn apply_update(
    table: &mut Table,
    request: &UpdateRequest,
    actor: &str,
    now: DateTime<Utc>,
    options: UpdateOptions,
) -> UpdateOutcome {
    let matched = locate_rows(table, &request.key);
    if matched.is_empty() {
        return UpdateOutcome::default();
    }

    let headers = table.headers();
    let timestamp = format_timestamp(now);

    // Resolve and coerce once; the same targets apply to every matched row
    let targets: Vec<(usize, f64)> = request
        .values
        .iter()
        .filter_map(|(column, raw)| {
            let col = table.column_index(column)?;
            let value = coerce_request_value(raw)?;
            Some((col, value))
        })
        .collect();

    let segment_col = table.key_columns().map(|cols| cols.segment);
    let mut entries = Vec::new();
    let mut changed_rows = 0;

    for &row in &matched {
        let before = entries.len();
        for &(col, new_value) in &targets {
            let old = table.cell(row, col).clone();
            if !cell_changed(&old, new_value) {
                continue;
            }

            let segment = segment_col
                .map(|c| table.cell(row, c).to_string())
                .unwrap_or_default();
            entries.push(ChangeLogEntry {
                timestamp: timestamp.clone(),
                user: actor.to_string(),
                tactic: request.key.tactic.clone(),
                vertical: request.key.vertical.clone(),
                segment,
                parameter: headers.get(col).cloned().unwrap_or_default(),
                old_value: old,
                new_value: CellValue::Number(new_value),
            });
            table.set_cell(row, col, CellValue::Number(new_value));
        }
        if entries.len() > before {
            changed_rows += 1;
        }
    }

    let rows_updated = if options.strict_row_count {
        changed_rows
    } else {
        matched.len()
    };

    tracing::debug!(
        key = %request.key,
        matched = matched.len(),
        changes = entries.len(),
        "applied update to snapshot"
    );

    UpdateOutcome {
        rows_updated,
        entries,
    }
}
