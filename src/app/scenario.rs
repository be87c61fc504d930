//! Scenario files for the preview binary.
//!
//! A scenario describes one checkout: shopper country, cart, catalog
//! fixtures, checkout attributes, block settings and the interactions to
//! replay before rendering.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::cart::CartLine;
use crate::settings::{BlockSettings, CheckoutAttributes, SettingsError};
use crate::sources::Product;
use crate::util::money::{from_cents, to_cents};

/// One checkout to render.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Shipping country.
    pub country: Option<String>,
    /// Checkout currency.
    pub currency: String,
    /// Cart subtotal; summed from line totals when unset.
    pub subtotal: Option<f64>,
    /// Checkout attributes (visibility gates).
    pub attributes: HashMap<String, String>,
    /// Block settings, one table per block.
    pub settings: BlockSettings,
    /// Cart lines.
    pub cart: Vec<CartLine>,
    /// Catalog fixtures.
    pub products: Vec<Product>,
    /// Upsell metafield values (JSON arrays of product ids).
    pub metafields: Vec<String>,
    /// Interactions replayed in order before rendering.
    pub actions: Vec<Action>,
}

impl Scenario {
    /// What: Parse a TOML scenario.
    ///
    /// # Errors
    /// - `SettingsError::Parse` on invalid TOML, unknown actions or mistyped fields
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let mut scenario: Self = toml::from_str(text)?;
        if scenario.currency.is_empty() {
            scenario.currency = "USD".to_string();
        }
        Ok(scenario)
    }

    /// What: Load a scenario file.
    ///
    /// # Errors
    /// - `SettingsError::Io` when the file cannot be read
    /// - `SettingsError::Parse` on invalid content
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_toml_str(&text)?;
        tracing::info!(
            path = %path.display(),
            lines = scenario.cart.len(),
            products = scenario.products.len(),
            actions = scenario.actions.len(),
            "[Scenario] Loaded scenario"
        );
        Ok(scenario)
    }

    /// Checkout attributes as a visibility gate.
    #[must_use]
    pub fn checkout_attributes(&self) -> CheckoutAttributes {
        CheckoutAttributes::new(self.attributes.clone())
    }

    /// What: Sum of the reported line totals.
    ///
    /// Details:
    /// - Lines without a reported total count as zero.
    #[must_use]
    pub fn sum_lines(lines: &[CartLine]) -> f64 {
        from_cents(
            lines
                .iter()
                .filter_map(|l| l.total_amount.as_ref())
                .map(|m| to_cents(m.amount))
                .sum(),
        )
    }
}

/// A shopper interaction, written as a short string in the scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// `toggle_checkbox`: press the checkbox upsell.
    ToggleCheckbox,
    /// `toggle_upsell:<pos>`: press add or remove on a list position.
    ToggleUpsell(usize),
    /// `select_variant:<pos>:<variant id>`: change a list position's variant.
    SelectVariant(usize, String),
    /// `remove_line`: press the remove link of the configured line.
    RemoveLine,
    /// `add_offer:<pos>`: press add on a metafield upsell.
    AddOffer(usize),
    /// `select_offer:<pos>:<variant id>`: change a metafield upsell's variant.
    SelectOffer(usize, String),
}

/// Unparseable action string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionParseError(String);

impl fmt::Display for ActionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action '{}'", self.0)
    }
}

impl std::error::Error for ActionParseError {}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ActionParseError(s.to_string());
        let mut parts = s.trim().splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("toggle_checkbox"), None, None) => Ok(Self::ToggleCheckbox),
            (Some("remove_line"), None, None) => Ok(Self::RemoveLine),
            (Some("toggle_upsell"), Some(pos), None) => {
                pos.trim().parse().map(Self::ToggleUpsell).map_err(|_| err())
            }
            (Some("add_offer"), Some(pos), None) => {
                pos.trim().parse().map(Self::AddOffer).map_err(|_| err())
            }
            (Some("select_variant"), Some(pos), Some(id)) if !id.trim().is_empty() => {
                let pos = pos.trim().parse().map_err(|_| err())?;
                Ok(Self::SelectVariant(pos, id.trim().to_string()))
            }
            (Some("select_offer"), Some(pos), Some(id)) if !id.trim().is_empty() => {
                let pos = pos.trim().parse().map_err(|_| err())?;
                Ok(Self::SelectOffer(pos, id.trim().to_string()))
            }
            _ => Err(err()),
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
