//! Free-shipping progress bar.

use super::output::{Block, Tone};
use crate::i18n::TranslationCatalog;
use crate::metrics::{ShippingProgress, ThresholdTable};
use crate::settings::ProgressBarSettings;
use crate::template::{TemplateBindings, country_flag, render_or};
use crate::util::money::format_money;

/// Title once the threshold is met.
pub const DEFAULT_REACHED_TEXT: &str = "Free shipping applied";
/// Title while below the threshold.
pub const DEFAULT_NOT_REACHED_TEXT: &str = "{amount_left} until free shipping";

/// What: Placeholder values for the progress bar texts.
///
/// Details:
/// - `{flag}` is empty when the country is unknown.
#[must_use]
pub fn bindings(
    progress: &ShippingProgress,
    country: Option<&str>,
    currency_code: &str,
) -> TemplateBindings {
    TemplateBindings::new()
        .with("flag", country.map(country_flag).unwrap_or_default())
        .with("total_amount", format_money(progress.subtotal(), currency_code))
        .with(
            "free_shipping_amount",
            format_money(progress.threshold(), currency_code),
        )
        .with("amount_left", format_money(progress.remaining(), currency_code))
}

/// What: Evaluate and render the progress bar.
///
/// Inputs:
/// - `settings`: Block settings
/// - `catalog`: Active translations
/// - `country`: Shipping country
/// - `subtotal`: Cart subtotal in major units
/// - `currency_code`: Checkout currency
/// - `previous`: Last evaluation, for the trend
///
/// Output:
/// - The block and the evaluation to keep for the next render
#[must_use]
pub fn render(
    settings: &ProgressBarSettings,
    catalog: Option<&TranslationCatalog>,
    country: Option<&str>,
    subtotal: f64,
    currency_code: &str,
    previous: Option<&ShippingProgress>,
) -> (Block, ShippingProgress) {
    let table = ThresholdTable::parse(&settings.country_thresholds);
    let progress = table.evaluate(country, subtotal, previous);
    let bindings = bindings(&progress, country, currency_code);

    let (title, tone) = if progress.reached {
        (
            render_or(
                settings.free_shipping_reached_text.as_deref(),
                DEFAULT_REACHED_TEXT,
                catalog,
                &bindings,
            ),
            settings
                .text_appearance_reached
                .as_deref()
                .unwrap_or(&settings.text_appearance),
        )
    } else {
        (
            render_or(
                settings.free_shipping_not_reached_text.as_deref(),
                DEFAULT_NOT_REACHED_TEXT,
                catalog,
                &bindings,
            ),
            settings.text_appearance.as_str(),
        )
    };

    let block = Block::stack(vec![
        Block::ProgressBar {
            fraction: progress.progress.value,
        },
        Block::text(title, Tone::from_setting(tone)),
    ]);
    (block, progress)
}
