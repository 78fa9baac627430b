//! Path management for model-config
//!
//! ## Path Resolution Order
//!
//! 1. `MODEL_CONFIG_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/model-config` or `~/.config/model-config`
//! 3. Windows: `%APPDATA%\model-config`

use std::path::{Path, PathBuf};

use crate::error::{ModelConfigError, ModelConfigResult};

/// Directory name under the platform config root
const APP_DIR: &str = "model-config";

/// Resolves the files model-config reads and writes
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    base_dir: PathBuf,
}

impl ConfigPaths {
    /// Resolve from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home or config directory can be determined.
    pub fn new() -> ModelConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using an explicit variable lookup
    pub fn from_lookup<F>(lookup: F) -> ModelConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_dir = match lookup("MODEL_CONFIG_DIR").filter(|v| !v.is_empty()) {
            Some(custom) => PathBuf::from(custom),
            None => resolve_default_path(&lookup)?,
        };
        Ok(Self { base_dir })
    }

    /// Use a fixed base directory (tests)
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `config.json`
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Default snapshot file of the local store
    pub fn store_file(&self) -> PathBuf {
        self.base_dir.join("store.json")
    }

    pub fn ensure_directories(&self) -> ModelConfigResult<()> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            ModelConfigError::Config(format!(
                "Failed to create config directory {}: {}",
                self.base_dir.display(),
                e
            ))
        })
    }
}

#[cfg(not(windows))]
fn resolve_default_path<F>(lookup: &F) -> ModelConfigResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let config_base = match lookup("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => {
            let home = lookup("HOME").ok_or_else(|| {
                ModelConfigError::Config("Could not determine home directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join(APP_DIR))
}

#[cfg(windows)]
fn resolve_default_path<F>(lookup: &F) -> ModelConfigResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let appdata = lookup("APPDATA")
        .ok_or_else(|| ModelConfigError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join(APP_DIR))
}
