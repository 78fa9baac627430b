//! JSON snapshot files with atomic replacement
//!
//! The local store keeps every sheet in one JSON document. A write goes to a
//! sibling temp file which is synced and then renamed over the original, so
//! a crash leaves either the old or the new snapshot.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ModelConfigError, ModelConfigResult};

/// Read a JSON document, or `T::default()` when the file does not exist yet
pub fn read_json<T, P>(path: P) -> ModelConfigResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| {
        ModelConfigError::Store(format!("Failed to open {}: {}", path.display(), e))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        ModelConfigError::Store(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Replace a JSON document atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> ModelConfigResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ModelConfigError::Store(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| ModelConfigError::Store(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| ModelConfigError::Store(format!("Failed to serialize snapshot: {}", e)))?;
    writer
        .flush()
        .map_err(|e| ModelConfigError::Store(format!("Failed to flush snapshot: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| ModelConfigError::Store(format!("Failed to sync snapshot: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ModelConfigError::Store(format!("Failed to replace {}: {}", path.display(), e))
    })
}
