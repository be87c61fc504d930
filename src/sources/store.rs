//! JSON-file backed [`ValueStore`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::{SourceError, ValueStore};

/// One persisted value with the time it was written.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    updated_at: DateTime<Utc>,
}

/// Session store persisted as a single JSON object on disk.
///
/// The preview binary uses it so the stock and reservation metrics resume
/// across runs. Writes go to a sibling temp file that is renamed over the
/// target, so readers see either the old or the new object.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// What: Create a store writing to `path` (created on first write).
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What: Load all entries from disk.
    ///
    /// Output:
    /// - Empty map when the file does not exist yet
    ///
    /// # Errors
    /// - `SourceError::Unavailable` when the file cannot be read
    /// - `SourceError::Decode` when it is not a JSON object
    fn load(&self) -> Result<Map<String, serde_json::Value>, SourceError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(SourceError::Unavailable(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    /// What: Time the value under `key` was last written.
    ///
    /// # Errors
    /// - Same as reading the value
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, SourceError> {
        Ok(self.stored(key)?.map(|s| s.updated_at))
    }

    /// Sibling file each write goes through.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn stored(&self, key: &str) -> Result<Option<StoredValue>, SourceError> {
        let map = {
            let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.load()?
        };
        match map.get(key) {
            Some(raw) => Ok(Some(serde_json::from_value(raw.clone())?)),
            None => Ok(None),
        }
    }
}

impl ValueStore for JsonFileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.stored(key)?.map(|s| s.value))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), SourceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load()?;
        let entry = StoredValue {
            value,
            updated_at: Utc::now(),
        };
        map.insert(key.to_string(), serde_json::to_value(entry)?);
        let text = serde_json::to_string_pretty(&map)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SourceError::Unavailable(format!("{}: {e}", parent.display())))?;
        }
        let temp = self.temp_path();
        fs::write(&temp, text)
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", temp.display())))?;
        fs::rename(&temp, &self.path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", self.path.display())))?;
        tracing::trace!(path = %self.path.display(), key, "[Store] Value persisted");
        Ok(())
    }
}
