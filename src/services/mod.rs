//! Service layer for model-config
//!
//! `updater` and `catalog` are pure functions over table snapshots;
//! `ParameterService` wires them to a `SheetStore`. `import` loads CSV files
//! into a sheet for the CLI.

pub mod catalog;
pub mod import;
pub mod parameters;
pub mod updater;

pub use catalog::{build_filters, build_legend, Filters, InitialData, Legend, LegendEntry, NO_DETAILS};
pub use import::{import_cell, import_rows, parse_csv_rows, ImportResult};
pub use parameters::{ParameterService, UpdateSummary};
pub use updater::{
    apply_update, locate_rows, locate_single_row, row_as_object, UpdateOptions, UpdateOutcome,
};
