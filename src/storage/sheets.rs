//! Google Sheets v4 REST store
//!
//! Reads whole sheets as `{sheet}!A:ZZ`, overwrites from `{sheet}!A1`,
//! appends below existing rows and creates missing sheets through
//! `batchUpdate`. Calls are never retried.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::credential::{get_or_refresh, CredentialCache, CredentialSource};
use super::SheetStore;
use crate::error::{ModelConfigError, ModelConfigResult};
use crate::models::{CellValue, Table};

/// Public Sheets API endpoint
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Written values are parsed as if typed into the sheet UI
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<CellValue>>,
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetMeta {
    #[serde(default)]
    properties: SheetProperties,
}

#[derive(Debug, Default, Deserialize)]
struct SheetProperties {
    #[serde(default)]
    title: String,
}

/// Sheet store backed by one spreadsheet
pub struct SheetsStore {
    client: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    source: Box<dyn CredentialSource>,
    cache: Mutex<CredentialCache>,
}

impl SheetsStore {
    /// Create a store for `spreadsheet_id` under `base_url`
    pub fn new(
        base_url: &str,
        spreadsheet_id: impl Into<String>,
        source: Box<dyn CredentialSource>,
    ) -> ModelConfigResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ModelConfigError::Config(format!("Invalid sheets API base {}: {}", base_url, e))
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            source,
            cache: Mutex::new(CredentialCache::default()),
        })
    }

    /// Build `{base}/v4/spreadsheets/{id}{suffix}/{segments...}`
    ///
    /// `suffix` is glued onto the id segment (used for `:batchUpdate`).
    fn url(&self, suffix: &str, segments: &[&str]) -> ModelConfigResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ModelConfigError::Config(format!("Sheets API base cannot be a base: {}", self.base_url))
            })?;
            path.pop_if_empty()
                .push("v4")
                .push("spreadsheets")
                .push(&format!("{}{}", self.spreadsheet_id, suffix))
                .extend(segments);
        }
        Ok(url)
    }

    async fn access_token(&self) -> ModelConfigResult<String> {
        let mut cache = self.cache.lock().await;
        let token = get_or_refresh(&mut cache, Utc::now().timestamp(), self.source.as_ref()).await?;
        Ok(token.expose().to_string())
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> ModelConfigResult<Value> {
        let token = self.access_token().await?;
        tracing::debug!(%method, path = url.path(), "sheets request");

        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let data: Value = response.json().await.unwrap_or_else(|_| json!({}));

        if !status.is_success() {
            let message = api_error_message(status, &data);
            tracing::warn!(%status, %message, "sheets request failed");
            return Err(ModelConfigError::Store(message));
        }
        Ok(data)
    }
}

/// Message for a failed call: the API's own message, else the status
fn api_error_message(status: StatusCode, body: &Value) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Sheets API error {}", status.as_u16()))
}

fn read_range(sheet: &str) -> String {
    format!("{}!A:ZZ", sheet)
}

#[async_trait]
impl SheetStore for SheetsStore {
    async fn read_sheet(&self, name: &str) -> ModelConfigResult<Table> {
        let url = self.url("", &["values", read_range(name).as_str()])?;
        let data = self.send(Method::GET, url, None).await?;
        let range: ValueRange = serde_json::from_value(data)?;
        Ok(Table::new(range.values))
    }

    async fn write_sheet(&self, name: &str, rows: &[Vec<CellValue>]) -> ModelConfigResult<()> {
        let mut url = self.url("", &["values", format!("{}!A1", name).as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);
        self.send(Method::PUT, url, Some(json!({ "values": rows })))
            .await
            .map(|_| ())
    }

    async fn append_rows(&self, name: &str, rows: &[Vec<CellValue>]) -> ModelConfigResult<()> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let range = format!("{}!A:{}:append", name, column_letter(width - 1));
        let mut url = self.url("", &["values", range.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION)
            .append_pair("insertDataOption", "INSERT_ROWS");
        self.send(Method::POST, url, Some(json!({ "values": rows })))
            .await
            .map(|_| ())
    }

    async fn ensure_sheet(&self, name: &str) -> ModelConfigResult<()> {
        let data = self.send(Method::GET, self.url("", &[])?, None).await?;
        let meta: SpreadsheetMeta = serde_json::from_value(data)?;
        if meta.sheets.iter().any(|s| s.properties.title.trim() == name) {
            return Ok(());
        }

        tracing::info!(sheet = name, "creating sheet");
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": name } } }]
        });
        self.send(Method::POST, self.url(":batchUpdate", &[])?, Some(body))
            .await
            .map(|_| ())
    }
}

/// Zero-based column index to A1 letters (0 -> A, 25 -> Z, 26 -> AA)
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}
