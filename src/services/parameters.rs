//! Parameter service
//!
//! Per-call orchestration over the store: load the sheet fresh, run the
//! catalog or the updater on the snapshot, and persist when something
//! changed. There is no locking between calls; two concurrent updates are
//! last-writer-wins on the data sheet.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::audit::{ChangeLogEntry, ChangeLogWriter};
use crate::config::SheetNames;
use crate::error::ModelConfigResult;
use crate::models::{SelectionKey, Segment, Table, UpdateRequest};
use crate::storage::SheetStore;

use super::catalog::{build_filters, build_legend, InitialData, Legend};
use super::updater::{apply_update, locate_single_row, row_as_object, UpdateOptions};

/// What an update call did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    pub rows_updated: usize,
    pub entries: Vec<ChangeLogEntry>,
}

/// Service for reading and updating configuration parameters
pub struct ParameterService<'a> {
    store: &'a dyn SheetStore,
    sheets: &'a SheetNames,
    options: UpdateOptions,
}

impl<'a> ParameterService<'a> {
    /// Create a new parameter service
    pub fn new(store: &'a dyn SheetStore, sheets: &'a SheetNames) -> Self {
        Self {
            store,
            sheets,
            options: UpdateOptions::default(),
        }
    }

    /// Use the given update options
    pub fn with_options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    async fn data_table(&self) -> ModelConfigResult<Table> {
        self.store.read_sheet(&self.sheets.data).await
    }

    /// Filter lists and legend
    ///
    /// The legend sheet is optional: if it cannot be read the legend is empty.
    pub async fn initial_data(&self) -> ModelConfigResult<InitialData> {
        let data = self.data_table().await?;
        if data.is_empty() {
            return Ok(InitialData::default());
        }

        let legend = match self.store.read_sheet(&self.sheets.legend).await {
            Ok(table) => build_legend(&table),
            Err(e) => {
                tracing::warn!(sheet = %self.sheets.legend, error = %e, "legend unavailable");
                Legend::new()
            }
        };

        Ok(InitialData {
            filters: build_filters(&data),
            legend,
        })
    }

    /// The single row for a key, as header -> value
    ///
    /// A segment of `ALL` reads the fallback segment row.
    pub async fn row_values(
        &self,
        tactic: &str,
        vertical: &str,
        segment: &str,
    ) -> ModelConfigResult<Option<Map<String, Value>>> {
        let data = self.data_table().await?;
        if data.is_empty() {
            return Ok(None);
        }
        let key = SelectionKey::new(tactic, vertical, Segment::parse(segment));
        Ok(locate_single_row(&data, &key).map(|row| row_as_object(&data, row)))
    }

    /// Apply an update and persist the table and change log
    ///
    /// Nothing is written when no cell changed. The data sheet is written
    /// before the log, so a failed log append leaves the data updated.
    pub async fn update(
        &self,
        request: &UpdateRequest,
        actor: &str,
    ) -> ModelConfigResult<UpdateSummary> {
        let mut data = self.data_table().await?;
        if data.is_empty() {
            return Ok(UpdateSummary::default());
        }

        let outcome = apply_update(&mut data, request, actor, Utc::now(), self.options);
        if outcome.has_changes() {
            self.store.write_sheet(&self.sheets.data, data.rows()).await?;
            ChangeLogWriter::new(self.sheets.log.clone())
                .record(self.store, &outcome.entries)
                .await?;
        }

        tracing::info!(
            key = %request.key,
            user = actor,
            rows_updated = outcome.rows_updated,
            changes = outcome.entries.len(),
            "update applied"
        );

        Ok(UpdateSummary {
            rows_updated: outcome.rows_updated,
            entries: outcome.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::LOG_HEADER;
    use crate::models::CellValue;
    use crate::storage::LocalStore;
    use serde_json::json;

    fn sheets() -> SheetNames {
        SheetNames::default()
    }

    fn seeded_store() -> LocalStore {
        let names = sheets();
        LocalStore::in_memory()
            .with_sheet(
                &names.data,
                vec![
                    vec!["Tactic".into(), "Vertical".into(), "Segment".into(), "Cost".into()],
                    vec!["A".into(), "V1".into(), "S1".into(), CellValue::Number(10.0)],
                    vec!["A".into(), "V1".into(), "MCH".into(), CellValue::Number(20.0)],
                ],
            )
            .unwrap()
            .with_sheet(
                &names.legend,
                vec![
                    vec!["name".into(), "display".into(), "description".into()],
                    vec!["Cost".into(), "Cost per unit".into()],
                ],
            )
            .unwrap()
    }

    fn request(segment: Segment, values: Value) -> UpdateRequest {
        let Value::Object(values) = values else {
            panic!("values must be an object");
        };
        UpdateRequest::new(SelectionKey::new("A", "V1", segment), values)
    }

    #[tokio::test]
    async fn test_initial_data() {
        let store = seeded_store();
        let names = sheets();
        let service = ParameterService::new(&store, &names);

        let data = service.initial_data().await.unwrap();
        assert_eq!(data.filters.segments, vec!["MCH", "S1"]);
        assert_eq!(data.legend["Cost"].display_name, "Cost per unit");
    }

    #[tokio::test]
    async fn test_initial_data_without_legend_sheet() {
        let names = sheets();
        let store = LocalStore::in_memory()
            .with_sheet(&names.data, vec![vec!["Tactic".into()], vec!["A".into()]])
            .unwrap();
        let service = ParameterService::new(&store, &names);

        let data = service.initial_data().await.unwrap();
        assert_eq!(data.filters.tactics, vec!["A"]);
        assert!(data.legend.is_empty());
    }

    #[tokio::test]
    async fn test_empty_data_sheet() {
        let names = sheets();
        let store = LocalStore::in_memory().with_sheet(&names.data, vec![]).unwrap();
        let service = ParameterService::new(&store, &names);

        assert_eq!(service.initial_data().await.unwrap(), InitialData::default());
        assert_eq!(service.row_values("A", "V1", "S1").await.unwrap(), None);
        let summary = service
            .update(&request(Segment::All, json!({"cost": 1})), "alice")
            .await
            .unwrap();
        assert_eq!(summary.rows_updated, 0);
    }

    #[tokio::test]
    async fn test_row_values_all_reads_fallback() {
        let store = seeded_store();
        let names = sheets();
        let service = ParameterService::new(&store, &names);

        let row = service.row_values("A", "V1", "ALL").await.unwrap().unwrap();
        assert_eq!(row["Segment"], json!("MCH"));
        assert_eq!(row["Cost"], json!(20));

        assert!(service.row_values("A", "V1", "S9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_persists_table_and_log() {
        let store = seeded_store();
        let names = sheets();
        let service = ParameterService::new(&store, &names);

        let summary = service
            .update(&request(Segment::All, json!({"Cost": "$15"})), "alice")
            .await
            .unwrap();
        assert_eq!(summary.rows_updated, 2);
        assert_eq!(summary.entries.len(), 2);

        let data = store.read_sheet(&names.data).await.unwrap();
        assert_eq!(data.cell(1, 3), &CellValue::Number(15.0));
        assert_eq!(data.cell(2, 3), &CellValue::Number(15.0));

        let log = store.read_sheet(&names.log).await.unwrap();
        assert_eq!(log.headers(), LOG_HEADER.to_vec());
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_no_change_writes_nothing() {
        let store = seeded_store();
        let names = sheets();
        let service = ParameterService::new(&store, &names);

        let summary = service
            .update(&request(Segment::Named("S1".into()), json!({"cost": 10})), "alice")
            .await
            .unwrap();
        assert_eq!(summary.rows_updated, 1);
        assert!(summary.entries.is_empty());
        assert!(store.read_sheet(&names.log).await.is_err());
    }

    #[tokio::test]
    async fn test_strict_row_count() {
        let store = seeded_store();
        let names = sheets();
        let service = ParameterService::new(&store, &names).with_options(UpdateOptions {
            strict_row_count: true,
        });

        let summary = service
            .update(&request(Segment::All, json!({"cost": 10})), "alice")
            .await
            .unwrap();
        assert_eq!(summary.rows_updated, 1);
    }
}
