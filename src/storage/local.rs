//! Local sheet store
//!
//! Keeps named sheets in memory, optionally backed by a JSON snapshot file
//! that is rewritten atomically after every mutation. Used for development,
//! the CLI and tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use super::file_io::{read_json, write_json_atomic};
use super::SheetStore;
use crate::error::{ModelConfigError, ModelConfigResult};
use crate::models::{CellValue, Table};

type Sheets = BTreeMap<String, Vec<Vec<CellValue>>>;

/// Sheet store held in process, optionally persisted to a JSON file
pub struct LocalStore {
    path: Option<PathBuf>,
    sheets: RwLock<Sheets>,
}

impl LocalStore {
    /// Create an empty store that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            sheets: RwLock::new(Sheets::new()),
        }
    }

    /// Open (or start) a store backed by the given JSON file
    pub fn open(path: impl Into<PathBuf>) -> ModelConfigResult<Self> {
        let path = path.into();
        let sheets: Sheets = read_json(&path)?;
        tracing::debug!(path = %path.display(), sheets = sheets.len(), "opened local store");
        Ok(Self {
            path: Some(path),
            sheets: RwLock::new(sheets),
        })
    }

    /// Seed a sheet, replacing any existing content (test and import helper)
    pub fn with_sheet(self, name: &str, rows: Vec<Vec<CellValue>>) -> ModelConfigResult<Self> {
        self.mutate(|sheets| {
            sheets.insert(name.to_string(), rows);
            Ok(())
        })?;
        Ok(self)
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Names of all sheets
    pub fn sheet_names(&self) -> ModelConfigResult<Vec<String>> {
        let sheets = self.sheets.read().map_err(|e| {
            ModelConfigError::Store(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(sheets.keys().cloned().collect())
    }

    fn mutate<F>(&self, f: F) -> ModelConfigResult<()>
    where
        F: FnOnce(&mut Sheets) -> ModelConfigResult<()>,
    {
        let mut sheets = self.sheets.write().map_err(|e| {
            ModelConfigError::Store(format!("Failed to acquire write lock: {}", e))
        })?;
        f(&mut sheets)?;
        if let Some(path) = &self.path {
            write_json_atomic(path, &*sheets)?;
        }
        Ok(())
    }
}

fn missing_sheet(name: &str) -> ModelConfigError {
    ModelConfigError::Store(format!("Unable to parse range: {}", name))
}

#[async_trait]
impl SheetStore for LocalStore {
    async fn read_sheet(&self, name: &str) -> ModelConfigResult<Table> {
        let sheets = self.sheets.read().map_err(|e| {
            ModelConfigError::Store(format!("Failed to acquire read lock: {}", e))
        })?;
        sheets
            .get(name)
            .map(|rows| Table::new(rows.clone()))
            .ok_or_else(|| missing_sheet(name))
    }

    async fn write_sheet(&self, name: &str, rows: &[Vec<CellValue>]) -> ModelConfigResult<()> {
        self.mutate(|sheets| {
            let existing = sheets.get_mut(name).ok_or_else(|| missing_sheet(name))?;
            // Range semantics: written cells replace, everything else stays.
            for (i, row) in rows.iter().enumerate() {
                if existing.len() <= i {
                    existing.push(Vec::new());
                }
                let target = &mut existing[i];
                if target.len() < row.len() {
                    target.resize(row.len(), CellValue::Empty);
                }
                for (j, cell) in row.iter().enumerate() {
                    target[j] = cell.clone();
                }
            }
            Ok(())
        })
    }

    async fn append_rows(&self, name: &str, rows: &[Vec<CellValue>]) -> ModelConfigResult<()> {
        self.mutate(|sheets| {
            let existing = sheets.get_mut(name).ok_or_else(|| missing_sheet(name))?;
            existing.extend(rows.iter().cloned());
            Ok(())
        })
    }

    async fn ensure_sheet(&self, name: &str) -> ModelConfigResult<()> {
        let exists = {
            let sheets = self.sheets.read().map_err(|e| {
                ModelConfigError::Store(format!("Failed to acquire read lock: {}", e))
            })?;
            sheets.contains_key(name)
        };
        if exists {
            return Ok(());
        }
        tracing::info!(sheet = name, "creating sheet");
        self.mutate(|sheets| {
            sheets.entry(name.to_string()).or_default();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    #[tokio::test]
    async fn test_missing_sheet_is_an_error() {
        let store = LocalStore::in_memory();
        let err = store.read_sheet("nope").await.unwrap_err();
        assert!(matches!(err, ModelConfigError::Store(_)));
        assert!(store.append_rows("nope", &[]).await.is_err());
        assert!(store.write_sheet("nope", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_then_append() {
        let store = LocalStore::in_memory();
        store.ensure_sheet("log").await.unwrap();
        store.ensure_sheet("log").await.unwrap();
        assert!(store.read_sheet("log").await.unwrap().is_empty());

        store.append_rows("log", &[row(&["a"]), row(&["b"])]).await.unwrap();
        store.append_rows("log", &[row(&["c"])]).await.unwrap();
        let table = store.read_sheet("log").await.unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(2, 0), &CellValue::from("c"));
    }

    #[tokio::test]
    async fn test_write_overwrites_range_only() {
        let store = LocalStore::in_memory()
            .with_sheet("data", vec![row(&["a", "b", "c"]), row(&["d", "e", "f"])])
            .unwrap();

        store.write_sheet("data", &[row(&["x"])]).await.unwrap();
        let table = store.read_sheet("data").await.unwrap();
        assert_eq!(table.rows()[0], row(&["x", "b", "c"]));
        assert_eq!(table.rows()[1], row(&["d", "e", "f"]));

        store
            .write_sheet("data", &[row(&["1"]), row(&["2"]), row(&["3", "4"])])
            .await
            .unwrap();
        let table = store.read_sheet("data").await.unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[2], row(&["3", "4"]));
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        let store = LocalStore::open(&path).unwrap();
        store.ensure_sheet("data").await.unwrap();
        store.append_rows("data", &[row(&["tactic"])]).await.unwrap();
        drop(store);

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        assert_eq!(reopened.sheet_names().unwrap(), vec!["data".to_string()]);
        let table = reopened.read_sheet("data").await.unwrap();
        assert_eq!(table.headers(), vec!["tactic"]);
    }
}
