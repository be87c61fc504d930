//! Typed settings for each block, with the defaults merchants get when a field is unset.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metrics::StockConfig;

/// Settings type of one block.
pub trait WidgetSettings {
    /// Checkout attribute whose value `"false"` hides the block.
    const VISIBILITY_ATTRIBUTE: &'static str;
    /// Table name in a settings document.
    const TABLE: &'static str;
}

/// Free-shipping progress bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressBarSettings {
    /// `COUNTRY=AMOUNT` lines.
    pub country_thresholds: String,
    /// Text once the threshold is reached.
    pub free_shipping_reached_text: Option<String>,
    /// Text while below the threshold.
    pub free_shipping_not_reached_text: Option<String>,
    /// Text tone below the threshold.
    pub text_appearance: String,
    /// Text tone once reached; falls back to `text_appearance`.
    pub text_appearance_reached: Option<String>,
}

impl Default for ProgressBarSettings {
    fn default() -> Self {
        Self {
            country_thresholds: String::new(),
            free_shipping_reached_text: None,
            free_shipping_not_reached_text: None,
            text_appearance: "info".to_string(),
            text_appearance_reached: None,
        }
    }
}

impl WidgetSettings for ProgressBarSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonProgressBar";
    const TABLE: &'static str = "progress_bar";
}

/// Live stock bar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockBarSettings {
    /// Stock shown on first visit.
    pub initial_stock: u32,
    /// Seconds between decrements.
    pub update_interval: u64,
    /// Smallest decrement.
    pub min_decrease: u32,
    /// Largest decrement.
    pub max_decrease: u32,
    /// Text with a `{stock}` placeholder.
    pub stock_text: String,
    /// Text tone.
    pub text_appearance: String,
}

impl Default for StockBarSettings {
    fn default() -> Self {
        Self {
            initial_stock: 50,
            update_interval: 45,
            min_decrease: 1,
            max_decrease: 3,
            stock_text: "LIVE STOCK UPDATES: {stock} left in stock".to_string(),
            text_appearance: "info".to_string(),
        }
    }
}

impl StockBarSettings {
    /// What: Normalised decay configuration.
    #[must_use]
    pub fn stock_config(&self) -> StockConfig {
        StockConfig::new(
            self.initial_stock,
            Duration::from_secs(self.update_interval),
            self.min_decrease,
            self.max_decrease,
        )
    }
}

impl WidgetSettings for StockBarSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonStockBar";
    const TABLE: &'static str = "stock_bar";
}

/// Single-item checkbox upsell (e.g. shipping insurance).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckboxUpsellSettings {
    /// Variant offered by the checkbox; the block is hidden without one.
    pub variant_reference: Option<String>,
    /// Bold heading above the box.
    pub upsell_text: Option<String>,
    /// Title line next to the checkbox; hidden when unset.
    pub text1: Option<String>,
    /// Subtitle line.
    pub text2: Option<String>,
    /// Long description; hidden when unset.
    pub text3: Option<String>,
    /// Amount bound to `{guaranteePriceFmt}`.
    pub guarantee_price: f64,
    /// Add the item once on mount when it is not in the cart.
    pub ensure_present: bool,
}

impl WidgetSettings for CheckboxUpsellSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonCheckboxUpsellWithAmount";
    const TABLE: &'static str = "checkbox_upsell";
}

/// Metafield-driven upsell product list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpsellListSettings {
    /// Heading; hidden when unset.
    pub header_text: Option<String>,
    /// Add button label.
    pub add_to_cart: String,
    /// Discount shown on list prices, in percent.
    pub discount_percentage: Option<f64>,
    /// Remove link label.
    pub remove_text: Option<String>,
    /// Maximum number of products; `0` means the default.
    pub number_of_upsells: usize,
}

impl Default for UpsellListSettings {
    fn default() -> Self {
        Self {
            header_text: None,
            add_to_cart: "Add".to_string(),
            discount_percentage: None,
            remove_text: None,
            number_of_upsells: 3,
        }
    }
}

impl UpsellListSettings {
    /// What: Effective maximum list length.
    #[must_use]
    pub const fn max_upsells(&self) -> usize {
        if self.number_of_upsells == 0 {
            3
        } else {
            self.number_of_upsells
        }
    }

    /// What: Multiplier applied to prices, `None` when no discount is shown.
    ///
    /// Details:
    /// - Percentages above 100 are capped.
    #[must_use]
    pub fn discount_multiplier(&self) -> Option<f64> {
        self.discount_percentage
            .filter(|pct| pct.is_finite() && *pct > 0.0)
            .map(|pct| (100.0 - pct.min(100.0)) / 100.0)
    }
}

impl WidgetSettings for UpsellListSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonUpsellList";
    const TABLE: &'static str = "upsell_list";
}

/// Order reservation countdown banner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownSettings {
    /// Text once the reservation ended.
    pub banner_expired: Option<String>,
    /// Countdown text, optionally with `{min}` and `{sec}`.
    pub banner_countdown: Option<String>,
    /// Banner tone.
    pub banner_status: String,
    /// Banner title; hidden when unset.
    pub banner_title: Option<String>,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            banner_expired: None,
            banner_countdown: None,
            banner_status: "success".to_string(),
            banner_title: None,
        }
    }
}

impl WidgetSettings for CountdownSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonCountdownTimer";
    const TABLE: &'static str = "countdown";
}

/// Compare-at savings line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingsSettings {
    /// Label in front of the amount.
    pub text: Option<String>,
}

impl WidgetSettings for SavingsSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonCompareAtPriceDiscount";
    const TABLE: &'static str = "savings";
}

/// Remove link rendered under one cart line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveLineSettings {
    /// Variant whose line gets the link.
    pub variant_reference: Option<String>,
    /// Link label.
    pub remove_line_item: Option<String>,
}

impl WidgetSettings for RemoveLineSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonRemoveShippingItem";
    const TABLE: &'static str = "remove_line";
}

/// Upsell list fed by the product metafield, hidden once one of its products is bought.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetafieldUpsellsSettings {
    /// Add button label.
    pub add_text: Option<String>,
}

impl WidgetSettings for MetafieldUpsellsSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonMetafieldUpsells";
    const TABLE: &'static str = "metafield_upsells";
}

/// Customer review carousel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewsSettings {
    /// `title:body:name:time ago:rating` lines; built-in reviews when unset.
    pub reviews_json: Option<String>,
    /// Text under the carousel.
    pub footer_text: Option<String>,
    /// Logo above the carousel.
    pub logo_image_url: Option<String>,
}

impl WidgetSettings for ReviewsSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonTrustpilotWidget";
    const TABLE: &'static str = "reviews";
}

/// Selling points with icons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UspSettings {
    /// Heading; hidden when unset.
    pub heading: Option<String>,
    /// Heading tone.
    pub heading_appearance: String,
    /// `title:body` lines; the body is optional.
    pub usps_text: String,
    /// Icon of the first item.
    pub img_url1: Option<String>,
    /// Icon of the second item.
    pub img_url2: Option<String>,
    /// Icon of the third item.
    pub img_url3: Option<String>,
    /// `start` or `end`.
    pub icon_position: String,
    /// Title tone.
    pub title_appearance: String,
    /// Body tone.
    pub body_appearance: String,
}

impl Default for UspSettings {
    fn default() -> Self {
        Self {
            heading: None,
            heading_appearance: "info".to_string(),
            usps_text: String::new(),
            img_url1: None,
            img_url2: None,
            img_url3: None,
            icon_position: "start".to_string(),
            title_appearance: "info".to_string(),
            body_appearance: "info".to_string(),
        }
    }
}

impl UspSettings {
    /// Configured icons in item order.
    #[must_use]
    pub fn icons(&self) -> [Option<&str>; 3] {
        [
            self.img_url1.as_deref(),
            self.img_url2.as_deref(),
            self.img_url3.as_deref(),
        ]
    }
}

impl WidgetSettings for UspSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonInfoUsps";
    const TABLE: &'static str = "info_usps";
}

/// Row of accepted payment method icons.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentIconsSettings {
    /// Comma separated method names; translatable.
    pub methods: Option<String>,
}

impl WidgetSettings for PaymentIconsSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonPaymentIcons";
    const TABLE: &'static str = "payment_icons";
}

/// Single merchant image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericImageSettings {
    /// Image URL.
    pub image: Option<String>,
}

impl WidgetSettings for GenericImageSettings {
    const VISIBILITY_ATTRIBUTE: &'static str = "_maisonGenericImage";
    const TABLE: &'static str = "generic_image";
}
