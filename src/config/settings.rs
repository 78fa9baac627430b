//! Runtime settings for model-config
//!
//! Settings come from `config.json` in the config directory (every field
//! optional) and are then overlaid with environment variables, which win.

use std::path::PathBuf;

use serde::Deserialize;

use super::paths::ConfigPaths;
use crate::auth::{SecretString, DEFAULT_TOKEN_TTL_SECS};
use crate::error::{ModelConfigError, ModelConfigResult};
use crate::storage::DEFAULT_SHEETS_API_BASE;

/// Port used when neither `PORT` nor `BIND_ADDR` is set
pub const DEFAULT_PORT: u16 = 3000;

/// Which tabular store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON snapshot file (or in-memory when no file is configured)
    Local,
    /// Google Sheets v4 REST API
    Sheets,
}

impl StoreBackend {
    fn parse(value: &str) -> ModelConfigResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "sheets" => Ok(Self::Sheets),
            other => Err(ModelConfigError::Config(format!(
                "Unknown store backend '{}' (expected local or sheets)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Sheets => write!(f, "sheets"),
        }
    }
}

/// Names of the three sheets the service touches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub data: String,
    pub legend: String,
    pub log: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            data: "LM model configuration".to_string(),
            legend: "legend".to_string(),
            log: "ChangeLog".to_string(),
        }
    }
}

/// Resolved settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shared login password
    pub app_password: SecretString,

    /// Token signing secret
    pub session_secret: SecretString,

    /// Spreadsheet holding the data, legend and log sheets
    pub spreadsheet_id: Option<String>,

    pub sheets: SheetNames,

    /// Listen address of the HTTP server
    pub bind_addr: String,

    /// Explicit backend; when unset, `sheets` if a spreadsheet id is configured
    pub store: Option<StoreBackend>,

    /// Snapshot file for the local backend; in-memory when unset
    pub store_file: Option<PathBuf>,

    pub google_access_token: Option<SecretString>,

    /// Command printing an access token on stdout
    pub google_access_token_command: Option<String>,

    pub sheets_api_base: String,

    /// Lifetime of issued login tokens
    pub token_ttl_secs: i64,

    /// Count only rows that actually changed in `rowsUpdated`
    pub strict_row_count: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_password: SecretString::default(),
            session_secret: SecretString::default(),
            spreadsheet_id: None,
            sheets: SheetNames::default(),
            bind_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            store: None,
            store_file: None,
            google_access_token: None,
            google_access_token_command: None,
            sheets_api_base: DEFAULT_SHEETS_API_BASE.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            strict_row_count: false,
        }
    }
}

impl Settings {
    /// Load `config.json` (if present) and overlay the process environment
    ///
    /// A local backend without an explicit file uses `store.json` in the
    /// config directory.
    pub fn load(paths: &ConfigPaths) -> ModelConfigResult<Self> {
        let settings_path = paths.settings_file();
        let mut settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ModelConfigError::Io(format!("Failed to read settings file: {}", e))
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                ModelConfigError::Config(format!("Failed to parse settings file: {}", e))
            })?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        if settings.store_file.is_none() {
            settings.store_file = Some(paths.store_file());
        }
        Ok(settings)
    }

    /// Overlay values from an environment lookup; empty values are ignored
    pub fn apply_env<F>(&mut self, lookup: F) -> ModelConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("APP_PASSWORD") {
            self.app_password = SecretString::new(v);
        }
        if let Some(v) = var("SESSION_SECRET") {
            self.session_secret = SecretString::new(v);
        }
        if let Some(v) = var("SPREADSHEET_ID") {
            self.spreadsheet_id = Some(v.trim().to_string());
        }
        if let Some(v) = var("DATA_SHEET_NAME") {
            self.sheets.data = v;
        }
        if let Some(v) = var("LEGEND_SHEET_NAME") {
            self.sheets.legend = v;
        }
        if let Some(v) = var("LOG_SHEET_NAME") {
            self.sheets.log = v;
        }
        if let Some(v) = var("PORT") {
            let port: u16 = v
                .trim()
                .parse()
                .map_err(|_| ModelConfigError::Config(format!("Invalid PORT: {}", v)))?;
            self.bind_addr = format!("0.0.0.0:{}", port);
        }
        if let Some(v) = var("BIND_ADDR") {
            self.bind_addr = v.trim().to_string();
        }
        if let Some(v) = var("MODEL_CONFIG_STORE") {
            self.store = Some(StoreBackend::parse(&v)?);
        }
        if let Some(v) = var("MODEL_CONFIG_STORE_FILE") {
            self.store_file = Some(PathBuf::from(v));
        }
        if let Some(v) = var("GOOGLE_ACCESS_TOKEN") {
            self.google_access_token = Some(SecretString::new(v.trim()));
        }
        if let Some(v) = var("GOOGLE_ACCESS_TOKEN_COMMAND") {
            self.google_access_token_command = Some(v);
        }
        if let Some(v) = var("SHEETS_API_BASE") {
            self.sheets_api_base = v.trim().to_string();
        }
        if let Some(v) = var("TOKEN_TTL_SECS") {
            self.token_ttl_secs = v
                .trim()
                .parse()
                .map_err(|_| ModelConfigError::Config(format!("Invalid TOKEN_TTL_SECS: {}", v)))?;
        }
        if let Some(v) = var("STRICT_ROW_COUNT") {
            self.strict_row_count = parse_flag("STRICT_ROW_COUNT", &v)?;
        }
        Ok(())
    }

    /// The backend in effect
    pub fn backend(&self) -> StoreBackend {
        match (self.store, &self.spreadsheet_id) {
            (Some(backend), _) => backend,
            (None, Some(_)) => StoreBackend::Sheets,
            (None, None) => StoreBackend::Local,
        }
    }

    /// The signing secret, or an error naming the missing variable
    pub fn session_secret(&self) -> ModelConfigResult<&SecretString> {
        if self.session_secret.is_empty() {
            return Err(ModelConfigError::Config("SESSION_SECRET is not set".into()));
        }
        Ok(&self.session_secret)
    }

    /// Check everything the HTTP server needs
    pub fn validate(&self) -> ModelConfigResult<()> {
        if self.app_password.is_empty() {
            return Err(ModelConfigError::Config("APP_PASSWORD is not set".into()));
        }
        self.session_secret()?;
        if self.token_ttl_secs <= 0 {
            return Err(ModelConfigError::Config(
                "TOKEN_TTL_SECS must be positive".into(),
            ));
        }
        self.validate_store()
    }

    /// Check the store configuration alone (CLI data commands)
    pub fn validate_store(&self) -> ModelConfigResult<()> {
        if self.backend() == StoreBackend::Sheets {
            if self.spreadsheet_id.as_deref().map_or(true, str::is_empty) {
                return Err(ModelConfigError::Config(
                    "SPREADSHEET_ID is required for the sheets backend".into(),
                ));
            }
            if self.google_access_token.is_none() && self.google_access_token_command.is_none() {
                return Err(ModelConfigError::Config(
                    "Set GOOGLE_ACCESS_TOKEN or GOOGLE_ACCESS_TOKEN_COMMAND for the sheets backend"
                        .into(),
                ));
            }
        }
        Ok(())
    }
}

fn parse_flag(name: &str, value: &str) -> ModelConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ModelConfigError::Config(format!(
            "Invalid {}: {}",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.sheets.data, "LM model configuration");
        assert_eq!(settings.sheets.legend, "legend");
        assert_eq!(settings.sheets.log, "ChangeLog");
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.token_ttl_secs, 43200);
        assert_eq!(settings.backend(), StoreBackend::Local);
        assert!(!settings.strict_row_count);
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                ("APP_PASSWORD", "pw"),
                ("SESSION_SECRET", "s3cret"),
                ("SPREADSHEET_ID", " abc "),
                ("LOG_SHEET_NAME", "Audit"),
                ("PORT", "8080"),
                ("TOKEN_TTL_SECS", "60"),
                ("STRICT_ROW_COUNT", "true"),
            ]))
            .unwrap();

        assert_eq!(settings.app_password.expose(), "pw");
        assert_eq!(settings.spreadsheet_id.as_deref(), Some("abc"));
        assert_eq!(settings.sheets.log, "Audit");
        assert_eq!(settings.sheets.data, "LM model configuration");
        assert_eq!(settings.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.token_ttl_secs, 60);
        assert!(settings.strict_row_count);
        assert_eq!(settings.backend(), StoreBackend::Sheets);
    }

    #[test]
    fn test_bind_addr_wins_over_port() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[("PORT", "8080"), ("BIND_ADDR", "127.0.0.1:9000")]))
            .unwrap();
        assert_eq!(settings.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut settings = Settings::default();
        assert!(settings.apply_env(env(&[("PORT", "http")])).is_err());
        assert!(settings
            .apply_env(env(&[("MODEL_CONFIG_STORE", "postgres")]))
            .is_err());
        assert!(settings
            .apply_env(env(&[("STRICT_ROW_COUNT", "maybe")]))
            .is_err());
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[("DATA_SHEET_NAME", "  "), ("PORT", "")]))
            .unwrap();
        assert_eq!(settings.sheets.data, "LM model configuration");
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_err());

        settings.app_password = SecretString::new("pw");
        assert!(settings.validate().is_err());

        settings.session_secret = SecretString::new("secret");
        settings.validate().unwrap();

        settings.store = Some(StoreBackend::Sheets);
        assert!(settings.validate_store().is_err());
        settings.spreadsheet_id = Some("abc".into());
        assert!(settings.validate_store().is_err());
        settings.google_access_token_command = Some("gcloud auth print-access-token".into());
        settings.validate().unwrap();
    }

    #[test]
    fn test_explicit_local_backend_with_spreadsheet() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[("SPREADSHEET_ID", "abc"), ("MODEL_CONFIG_STORE", "LOCAL")]))
            .unwrap();
        assert_eq!(settings.backend(), StoreBackend::Local);
    }

    #[test]
    fn test_settings_file_parsed() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConfigPaths::with_base_dir(temp_dir.path());
        std::fs::write(
            paths.settings_file(),
            r#"{"sheets": {"legend": "Glossary"}, "store": "local", "token_ttl_secs": 120}"#,
        )
        .unwrap();

        let contents = std::fs::read_to_string(paths.settings_file()).unwrap();
        let settings: Settings = serde_json::from_str(&contents).unwrap();
        assert_eq!(settings.sheets.legend, "Glossary");
        assert_eq!(settings.sheets.data, "LM model configuration");
        assert_eq!(settings.store, Some(StoreBackend::Local));
        assert_eq!(settings.token_ttl_secs, 120);
    }

    #[test]
    fn test_secrets_not_in_debug_output() {
        let mut settings = Settings::default();
        settings.app_password = SecretString::new("hunter2");
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
