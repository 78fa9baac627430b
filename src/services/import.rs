//! CSV import into a sheet
//!
//! Loads a CSV file (header row first) as table rows. Cells that read as a
//! plain decimal become numbers, empty cells become blanks, everything else
//! stays text. The rows are then written over the target sheet from `A1`.

use std::io::Read;

use csv::ReaderBuilder;

use crate::error::ModelConfigResult;
use crate::models::CellValue;
use crate::storage::SheetStore;

/// Result of an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub sheet: String,
    /// Rows written, header included
    pub rows: usize,
    pub columns: usize,
}

/// Convert one CSV field to a cell
pub fn import_cell(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

/// Parse CSV data into rows; rows may have different lengths
pub fn parse_csv_rows<R: Read>(reader: R) -> ModelConfigResult<Vec<Vec<CellValue>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(import_cell).collect());
    }
    Ok(rows)
}

/// Write parsed rows over `sheet`, creating it if needed
pub async fn import_rows(
    store: &dyn SheetStore,
    sheet: &str,
    rows: Vec<Vec<CellValue>>,
) -> ModelConfigResult<ImportResult> {
    store.ensure_sheet(sheet).await?;
    store.write_sheet(sheet, &rows).await?;

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    tracing::info!(sheet, rows = rows.len(), columns, "imported csv");
    Ok(ImportResult {
        sheet: sheet.to_string(),
        rows: rows.len(),
        columns,
    })
}
