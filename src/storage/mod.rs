//! Tabular store layer for model-config
//!
//! Everything the service persists lives in named sheets of cells: the
//! parameter table, the legend and the changelog. `SheetStore` is the range
//! level contract; `LocalStore` keeps sheets in a JSON snapshot and
//! `SheetsStore` talks to the Google Sheets REST API.

pub mod credential;
pub mod file_io;
pub mod local;
pub mod sheets;

use std::sync::Arc;

use async_trait::async_trait;

pub use credential::{
    get_or_refresh, CommandCredential, CredentialCache, CredentialSource, IssuedCredential,
    StaticCredential,
};
pub use file_io::{read_json, write_json_atomic};
pub use local::LocalStore;
pub use sheets::{SheetsStore, DEFAULT_SHEETS_API_BASE};

use crate::config::{Settings, StoreBackend};
use crate::error::{ModelConfigError, ModelConfigResult};
use crate::models::{CellValue, Table};

/// Range-level access to named sheets
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read every populated row of a sheet; a missing sheet is an error
    async fn read_sheet(&self, name: &str) -> ModelConfigResult<Table>;

    /// Overwrite starting at the first cell; cells outside `rows` are kept
    async fn write_sheet(&self, name: &str, rows: &[Vec<CellValue>]) -> ModelConfigResult<()>;

    /// Append rows below the last populated row
    async fn append_rows(&self, name: &str, rows: &[Vec<CellValue>]) -> ModelConfigResult<()>;

    /// Create the sheet if it does not exist
    async fn ensure_sheet(&self, name: &str) -> ModelConfigResult<()>;
}

/// Build the store selected by the settings
pub fn open_store(settings: &Settings) -> ModelConfigResult<Arc<dyn SheetStore>> {
    settings.validate_store()?;

    match settings.backend() {
        StoreBackend::Local => {
            let store = match &settings.store_file {
                Some(path) => LocalStore::open(path)?,
                None => LocalStore::in_memory(),
            };
            Ok(Arc::new(store))
        }
        StoreBackend::Sheets => {
            let spreadsheet_id = settings.spreadsheet_id.clone().ok_or_else(|| {
                ModelConfigError::Config("SPREADSHEET_ID is required for the sheets backend".into())
            })?;
            let source: Box<dyn CredentialSource> = match (
                &settings.google_access_token,
                &settings.google_access_token_command,
            ) {
                (Some(token), _) => Box::new(StaticCredential::new(token.clone())),
                (None, Some(command)) => Box::new(CommandCredential::new(command.clone())),
                (None, None) => {
                    return Err(ModelConfigError::Config(
                        "No credential source for the sheets backend".into(),
                    ))
                }
            };
            tracing::info!(spreadsheet_id = %spreadsheet_id, "using sheets store");
            Ok(Arc::new(SheetsStore::new(
                &settings.sheets_api_base,
                spreadsheet_id,
                source,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SecretString;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_local_store_from_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            store_file: Some(temp_dir.path().join("store.json")),
            ..Settings::default()
        };

        let store = open_store(&settings).unwrap();
        store.ensure_sheet("data").await.unwrap();
        assert!(temp_dir.path().join("store.json").exists());
    }

    #[test]
    fn test_open_sheets_store_requires_credentials() {
        let mut settings = Settings {
            spreadsheet_id: Some("abc".into()),
            ..Settings::default()
        };
        assert!(open_store(&settings).is_err());

        settings.google_access_token = Some(SecretString::new("ya29.token"));
        assert!(open_store(&settings).is_ok());
    }
}
