//! Parameter CLI commands
//!
//! Read rows, apply updates, show the change log and import CSV data through
//! the same service path the HTTP API uses.

use std::fs::File;
use std::path::Path;

use clap::Args;
use serde_json::{Map, Value};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::{ChangeLogEntry, ChangeLogWriter};
use crate::auth::login_user;
use crate::config::Settings;
use crate::error::{ModelConfigError, ModelConfigResult};
use crate::models::{UpdateBody, UpdatePayload, UpdateRequest};
use crate::services::{import_rows, parse_csv_rows, ParameterService, UpdateOptions};
use crate::storage::SheetStore;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Column")]
    column: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Parameter")]
    parameter: String,
    #[tabled(rename = "Old")]
    old: String,
    #[tabled(rename = "New")]
    new: String,
}

impl From<&ChangeLogEntry> for LogRow {
    fn from(entry: &ChangeLogEntry) -> Self {
        Self {
            timestamp: entry.timestamp.clone(),
            user: entry.user.clone(),
            key: format!("{}/{}/{}", entry.tactic, entry.vertical, entry.segment),
            parameter: entry.parameter.clone(),
            old: entry.old_value.to_string(),
            new: entry.new_value.to_string(),
        }
    }
}

/// Parse a `COLUMN=VALUE` argument
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", s))?;
    if column.trim().is_empty() {
        return Err(format!("missing column name in '{}'", s));
    }
    Ok((column.trim().to_string(), value.to_string()))
}

fn service<'a>(store: &'a dyn SheetStore, settings: &'a Settings) -> ParameterService<'a> {
    ParameterService::new(store, &settings.sheets).with_options(UpdateOptions {
        strict_row_count: settings.strict_row_count,
    })
}

/// Print the row selected by tactic, vertical and segment
pub async fn handle_row(
    store: &dyn SheetStore,
    settings: &Settings,
    tactic: &str,
    vertical: &str,
    segment: Option<&str>,
) -> ModelConfigResult<()> {
    let row = service(store, settings)
        .row_values(tactic, vertical, segment.unwrap_or(""))
        .await?;

    let Some(row) = row else {
        println!("No matching row.");
        return Ok(());
    };

    let fields: Vec<FieldRow> = row
        .into_iter()
        .map(|(column, value)| FieldRow {
            column,
            value: match value {
                Value::String(s) => s,
                other => other.to_string(),
            },
        })
        .collect();
    let mut table = Table::new(fields);
    table.with(Style::sharp());
    println!("{}", table);
    Ok(())
}

/// Arguments of the `update` command
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Tactic of the rows to update
    #[arg(short, long)]
    pub tactic: String,
    /// Vertical of the rows to update
    #[arg(short, long)]
    pub vertical: String,
    /// Segment of the row to update
    #[arg(short, long, conflicts_with = "all")]
    pub segment: Option<String>,
    /// Update every segment of the tactic/vertical pair
    #[arg(long)]
    pub all: bool,
    /// Column assignment, repeatable (e.g. --set "Cost=1,200.50")
    #[arg(long = "set", value_name = "COLUMN=VALUE", value_parser = parse_assignment, required = true)]
    pub assignments: Vec<(String, String)>,
    /// User recorded in the change log
    #[arg(short, long, env = "MODEL_CONFIG_USER")]
    pub user: Option<String>,
}

/// Apply `COLUMN=VALUE` assignments to the selected rows
pub async fn handle_update(
    store: &dyn SheetStore,
    settings: &Settings,
    args: UpdateArgs,
) -> ModelConfigResult<()> {
    let values: Map<String, Value> = args
        .assignments
        .into_iter()
        .map(|(column, value)| (column, Value::String(value)))
        .collect();
    let body = UpdateBody {
        payload: Some(UpdatePayload {
            tactic: Some(args.tactic),
            vertical: Some(args.vertical),
            segment: args.segment,
            values: Some(values),
        }),
        is_all_segments: Some(args.all),
    };
    let request = UpdateRequest::from_body(body)?;
    let actor = login_user(args.user.as_deref());

    let summary = service(store, settings).update(&request, &actor).await?;

    println!("Rows matched: {}", summary.rows_updated);
    if summary.entries.is_empty() {
        println!("No changes.");
    } else {
        for entry in &summary.entries {
            println!("  {}", entry.format_human_readable());
        }
    }
    Ok(())
}

/// Print the most recent change log entries
pub async fn handle_changelog(
    store: &dyn SheetStore,
    settings: &Settings,
    limit: usize,
) -> ModelConfigResult<()> {
    let entries = ChangeLogWriter::new(settings.sheets.log.clone())
        .read_recent(store, limit)
        .await?;

    if entries.is_empty() {
        println!("Change log is empty.");
        return Ok(());
    }

    let rows: Vec<LogRow> = entries.iter().map(LogRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);
    println!("\n{} entries", entries.len());
    Ok(())
}

/// Load a CSV file into a sheet (the data sheet by default)
pub async fn handle_import(
    store: &dyn SheetStore,
    settings: &Settings,
    file: &Path,
    sheet: Option<&str>,
) -> ModelConfigResult<()> {
    let reader = File::open(file).map_err(|e| {
        ModelConfigError::Io(format!("Failed to open {}: {}", file.display(), e))
    })?;
    let rows = parse_csv_rows(reader)?;
    let sheet = sheet.unwrap_or(&settings.sheets.data);

    let result = import_rows(store, sheet, rows).await?;
    println!(
        "Imported {} rows x {} columns into '{}'",
        result.rows, result.columns, result.sheet
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("Cost=1,200.50").unwrap(),
            ("Cost".to_string(), "1,200.50".to_string())
        );
        assert_eq!(
            parse_assignment(" reach =a=b").unwrap(),
            ("reach".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("cost").is_err());
        assert!(parse_assignment("=5").is_err());
    }
}
