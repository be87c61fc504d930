//! Merchant settings for every block.
//!
//! Settings arrive either as one TOML document with a table per block
//! (`[progress_bar]`, `[stock_bar]`, ...) or as a flat `key = value` export
//! for a single block. Unset fields take the block's documented default.
//! Settings are immutable once loaded and passed explicitly to each render.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::util::config::{parse_key_value, skip_comment_or_empty};

mod widgets;

pub use widgets::{
    CheckboxUpsellSettings, CountdownSettings, GenericImageSettings, MetafieldUpsellsSettings,
    PaymentIconsSettings, ProgressBarSettings, RemoveLineSettings, ReviewsSettings,
    SavingsSettings, StockBarSettings, UpsellListSettings, UspSettings, WidgetSettings,
};

/// What: Failure while loading settings.
#[derive(Debug)]
pub enum SettingsError {
    /// The file could not be read.
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The document is not valid TOML or does not match the settings shape.
    Parse(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(_) => None,
        }
    }
}

impl From<toml::de::Error> for SettingsError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

/// Settings of every block, one table each.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockSettings {
    /// Free-shipping progress bar.
    pub progress_bar: ProgressBarSettings,
    /// Live stock bar.
    pub stock_bar: StockBarSettings,
    /// Checkbox upsell.
    pub checkbox_upsell: CheckboxUpsellSettings,
    /// Upsell product list.
    pub upsell_list: UpsellListSettings,
    /// Reservation countdown.
    pub countdown: CountdownSettings,
    /// Compare-at savings.
    pub savings: SavingsSettings,
    /// Remove-line link.
    pub remove_line: RemoveLineSettings,
    /// Metafield upsells; only mounted when the table is present.
    pub metafield_upsells: Option<MetafieldUpsellsSettings>,
    /// Review carousel; only mounted when the table is present.
    pub reviews: Option<ReviewsSettings>,
    /// Selling points; only mounted when the table is present.
    pub info_usps: Option<UspSettings>,
    /// Payment icons; only mounted when the table is present.
    pub payment_icons: Option<PaymentIconsSettings>,
    /// Generic image; only mounted when the table is present.
    pub generic_image: Option<GenericImageSettings>,
}

impl BlockSettings {
    /// What: Parse a TOML settings document.
    ///
    /// # Errors
    /// - `SettingsError::Parse` on invalid TOML or mistyped fields
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    /// What: Load a TOML settings document from disk.
    ///
    /// # Errors
    /// - `SettingsError::Io` when the file cannot be read
    /// - `SettingsError::Parse` on invalid content
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = read(path)?;
        let settings = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "[Settings] Loaded block settings");
        Ok(settings)
    }
}

/// What: Parse a flat `key = value` export into one block's settings.
///
/// Inputs:
/// - `text`: Conf content; comments and blank lines are ignored
///
/// Output:
/// - The typed settings, defaults filling unset keys
///
/// # Errors
/// - `SettingsError::Parse` when a value does not fit its field
///
/// Details:
/// - Integers, floats and booleans are recognised; everything else is text.
///   Quote a value (`"123"`) to keep it as text.
/// - Unknown keys are ignored; the last occurrence of a key wins.
pub fn parse_conf<T: DeserializeOwned>(text: &str) -> Result<T, SettingsError> {
    let mut table = toml::Table::new();
    for line in text.lines() {
        if skip_comment_or_empty(line) {
            continue;
        }
        match parse_key_value(line) {
            Some((key, value)) => {
                table.insert(key, infer_value(&value));
            }
            None => {
                tracing::debug!(line, "[Settings] Ignoring malformed settings line");
            }
        }
    }
    Ok(toml::Value::Table(table).try_into()?)
}

/// What: Load one block's settings from a flat conf file.
///
/// # Errors
/// - `SettingsError::Io` when the file cannot be read
/// - `SettingsError::Parse` when a value does not fit its field
pub fn load_conf<T: DeserializeOwned + WidgetSettings>(path: &Path) -> Result<T, SettingsError> {
    let text = read(path)?;
    let settings = parse_conf(&text)?;
    tracing::info!(
        path = %path.display(),
        block = T::TABLE,
        "[Settings] Loaded block settings from conf"
    );
    Ok(settings)
}

fn read(path: &Path) -> Result<String, SettingsError> {
    fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// What: Map a conf value onto the closest TOML scalar.
///
/// Details:
/// - A value wrapped in double quotes is always text, quotes removed.
fn infer_value(raw: &str) -> toml::Value {
    if let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return toml::Value::String(inner.to_string());
    }
    if let Ok(i) = raw.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>()
        && f.is_finite()
    {
        return toml::Value::Float(f);
    }
    match raw {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => toml::Value::String(raw.to_string()),
    }
}

/// Checkout attributes set by the host or other apps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutAttributes(HashMap<String, String>);

impl CheckoutAttributes {
    /// What: Wrap an attribute map.
    #[must_use]
    pub const fn new(values: HashMap<String, String>) -> Self {
        Self(values)
    }

    /// Attribute value, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// What: Whether the block with settings type `T` may render.
    ///
    /// Details:
    /// - Only the exact value `"false"` hides a block.
    #[must_use]
    pub fn is_visible<T: WidgetSettings>(&self) -> bool {
        let visible = self.get(T::VISIBILITY_ATTRIBUTE) != Some("false");
        if !visible {
            tracing::debug!(attribute = T::VISIBILITY_ATTRIBUTE, "[Settings] Block hidden by attribute");
        }
        visible
    }
}
