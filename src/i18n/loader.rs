//! Translation file loading and parsing.
//!
//! Offline counterpart of the metaobject fetch: a directory of
//! `{COUNTRY}.yml` (or `.json`) files, each a mapping of handle to text.

use std::fs;
use std::path::{Path, PathBuf};

use crate::i18n::catalog::TranslationCatalog;
use crate::sources::{SourceError, TranslationSource};

/// What: Load a translation file and parse it into a `TranslationCatalog`.
///
/// Inputs:
/// - `country`: Country code (e.g., "DE")
/// - `dir`: Directory holding `{country}.yml` / `{country}.json`
///
/// Output:
/// - `Result<TranslationCatalog, String>` containing translations or error
///
/// # Errors
/// - Returns `Err` when the country code is empty or not alphanumeric
/// - Returns `Err` when no file exists for the country
/// - Returns `Err` when the file cannot be read, is empty, or cannot be parsed
///
/// Details:
/// - YAML is preferred when both files exist
/// - Nested mappings flatten into dot-notation handles (`upsell.remove`)
pub fn load_catalog_file(country: &str, dir: &Path) -> Result<TranslationCatalog, String> {
    if country.is_empty() {
        return Err("Country code cannot be empty".to_string());
    }
    if !country.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(format!(
            "Invalid country code format: '{country}'. Expected letters, digits or '-' (e.g., 'US', 'en-GB')"
        ));
    }

    let yaml_path = dir.join(format!("{country}.yml"));
    let json_path = dir.join(format!("{country}.json"));
    let file_path = if yaml_path.exists() {
        yaml_path
    } else if json_path.exists() {
        json_path
    } else {
        return Err(format!(
            "Translation file not found for '{country}' in {}",
            dir.display()
        ));
    };

    parse_catalog_file(&file_path)
}

/// What: Parse one translation file, YAML or JSON by extension.
///
/// Inputs:
/// - `file_path`: `.yml`/`.yaml` or `.json` file
///
/// # Errors
/// - Returns `Err` when the file cannot be read, is empty, or cannot be parsed
pub fn parse_catalog_file(file_path: &Path) -> Result<TranslationCatalog, String> {
    let is_yaml = file_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"));

    let contents = fs::read_to_string(file_path)
        .map_err(|e| format!("Failed to read translation file {}: {e}", file_path.display()))?;

    if contents.trim().is_empty() {
        return Err(format!("Translation file is empty: {}", file_path.display()));
    }

    let value: serde_json::Value = if is_yaml {
        serde_norway::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML {}: {e}", file_path.display()))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON {}: {e}", file_path.display()))?
    };

    let mut pairs = Vec::new();
    flatten_value(&value, "", &mut pairs);
    tracing::debug!(path = %file_path.display(), entries = pairs.len(), "[I18n] Parsed translation file");
    Ok(TranslationCatalog::from_entries(pairs))
}

/// What: Recursively flatten a mapping into dot-notation handles.
///
/// Inputs:
/// - `value`: Current value
/// - `prefix`: Current handle prefix (e.g., "upsell")
/// - `pairs`: Output list in document order
///
/// Details:
/// - Strings, numbers and booleans become text; lists and nulls are skipped
fn flatten_value(value: &serde_json::Value, prefix: &str, pairs: &mut Vec<(String, String)>) {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let handle = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_value(val, &handle, pairs);
            }
        }
        Value::String(s) => pairs.push((prefix.to_string(), s.clone())),
        Value::Number(n) => pairs.push((prefix.to_string(), n.to_string())),
        Value::Bool(b) => pairs.push((prefix.to_string(), b.to_string())),
        Value::Array(_) | Value::Null => {
            tracing::debug!(handle = prefix, "[I18n] Skipping non-text translation value");
        }
    }
}

/// Translation source backed by a directory of translation files.
///
/// Serves the same metaobject payload shape as the host so it can be plugged
/// into [`crate::i18n::TranslationCache::refresh`].
#[derive(Clone, Debug)]
pub struct DirectoryTranslations {
    dir: PathBuf,
}

impl DirectoryTranslations {
    /// What: Create a source reading from `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// What: Directory the files are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TranslationSource for DirectoryTranslations {
    async fn fetch_translations(&self, country: &str) -> Result<serde_json::Value, SourceError> {
        let catalog = load_catalog_file(country, &self.dir).map_err(SourceError::Unavailable)?;
        Ok(catalog.to_metaobjects())
    }
}
