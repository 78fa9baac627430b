//! Filter options and parameter legend
//!
//! Both are derived from whole sheets: the filter lists from the key columns
//! of the data table, the legend from the legend table (name, display name,
//! description per row).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::{CellValue, Table, SEGMENT_COLUMN, TACTIC_COLUMN, VERTICAL_COLUMN};

/// Description used when the legend row leaves it blank
pub const NO_DETAILS: &str = "No details available.";

/// Distinct values of each key column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub tactics: Vec<String>,
    pub verticals: Vec<String>,
    pub segments: Vec<String>,
}

/// How one parameter is presented
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub display_name: String,
    pub description: String,
}

/// Parameter name to legend entry
pub type Legend = BTreeMap<String, LegendEntry>;

/// Response of the initial data call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitialData {
    pub filters: Filters,
    pub legend: Legend,
}

fn distinct_sorted(table: &Table, column: &str) -> Vec<String> {
    let Some(col) = table.column_index(column) else {
        return Vec::new();
    };
    table
        .data_rows()
        .map(|(idx, _)| table.cell(idx, col))
        .filter(|cell| !cell.is_blank())
        .map(CellValue::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Filter lists; a missing key column yields an empty list
pub fn build_filters(table: &Table) -> Filters {
    Filters {
        tactics: distinct_sorted(table, TACTIC_COLUMN),
        verticals: distinct_sorted(table, VERTICAL_COLUMN),
        segments: distinct_sorted(table, SEGMENT_COLUMN),
    }
}

/// Legend keyed by the trimmed first column; later rows win on duplicates
pub fn build_legend(table: &Table) -> Legend {
    let mut legend = Legend::new();
    for (idx, _) in table.data_rows() {
        let key = table.cell(idx, 0).trimmed();
        if key.is_empty() {
            continue;
        }
        let display_name = table.cell(idx, 1);
        let description = table.cell(idx, 2);
        let entry = LegendEntry {
            display_name: if display_name.is_blank() {
                key.clone()
            } else {
                display_name.to_string()
            },
            description: if description.is_blank() {
                NO_DETAILS.to_string()
            } else {
                description.to_string()
            },
        };
        legend.insert(key, entry);
    }
    legend
}
