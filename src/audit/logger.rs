//! Change log writer
//!
//! The change log is an append-only sheet. The first write to an empty sheet
//! lays down the header row; every later write only appends.

use crate::error::ModelConfigResult;
use crate::models::CellValue;
use crate::storage::SheetStore;

use super::entry::{ChangeLogEntry, LOG_HEADER};

/// Appends change log entries to a named sheet
#[derive(Debug, Clone)]
pub struct ChangeLogWriter {
    sheet: String,
}

impl ChangeLogWriter {
    /// Create a writer for the given sheet name
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Persist entries, creating the sheet and header if needed
    ///
    /// Does nothing for an empty slice. A failed read of the existing log is
    /// treated as an empty log, so the header may be written again.
    pub async fn record(
        &self,
        store: &dyn SheetStore,
        entries: &[ChangeLogEntry],
    ) -> ModelConfigResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        store.ensure_sheet(&self.sheet).await?;

        let is_empty = match store.read_sheet(&self.sheet).await {
            Ok(table) => table.is_empty(),
            Err(e) => {
                tracing::warn!(sheet = %self.sheet, error = %e, "could not read change log, treating as empty");
                true
            }
        };
        if is_empty {
            let header: Vec<CellValue> = LOG_HEADER.iter().map(|h| CellValue::from(*h)).collect();
            store.write_sheet(&self.sheet, &[header]).await?;
        }

        let rows: Vec<Vec<CellValue>> = entries.iter().map(ChangeLogEntry::to_row).collect();
        store.append_rows(&self.sheet, &rows).await?;

        tracing::debug!(sheet = %self.sheet, count = entries.len(), "recorded change log entries");
        Ok(())
    }

    /// Read the most recent `count` entries, oldest first
    pub async fn read_recent(
        &self,
        store: &dyn SheetStore,
        count: usize,
    ) -> ModelConfigResult<Vec<ChangeLogEntry>> {
        let table = store.read_sheet(&self.sheet).await?;
        let all: Vec<ChangeLogEntry> = table
            .data_rows()
            .map(|(_, row)| ChangeLogEntry::from_row(row))
            .collect();
        let start = all.len().saturating_sub(count);
        Ok(all[start..].to_vec())
    }
}
