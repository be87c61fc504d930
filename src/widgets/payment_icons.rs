//! Accepted payment method icons.

use super::output::{Block, Tone};
use crate::i18n::{TranslationCatalog, resolve, translate};
use crate::settings::PaymentIconsSettings;
use crate::template::Segment;

/// Methods shown when none are configured.
pub const DEFAULT_METHODS: &str =
    "ideal,visa,mastercard,discover,amex,paypal,klarna,jcb,unionpay,maestro";

/// Banner shown when the configured list has no usable name.
pub const EMPTY_METHODS_MESSAGE: &str = "Please enter at least one payment method";

/// What: Method names from the (translated) setting.
///
/// Details:
/// - The whole setting is resolved first, so a country can swap the list.
/// - Names are trimmed; empty entries are dropped.
#[must_use]
pub fn methods(
    settings: &PaymentIconsSettings,
    catalog: Option<&TranslationCatalog>,
) -> Vec<String> {
    translate(catalog, settings.methods.as_deref())
        .unwrap_or_else(|| DEFAULT_METHODS.to_string())
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// What: Render the icon row, or a critical banner when the list is empty.
#[must_use]
pub fn render_payment_icons(
    settings: &PaymentIconsSettings,
    catalog: Option<&TranslationCatalog>,
) -> Block {
    let names = methods(settings, catalog);
    if names.is_empty() {
        tracing::warn!("[PaymentIcons] No payment method configured");
        return Block::Banner {
            title: Some(vec![Segment::plain(resolve(catalog, EMPTY_METHODS_MESSAGE))]),
            status: Tone::Critical,
            body: Vec::new(),
        };
    }
    Block::row(
        names
            .into_iter()
            .map(|name| Block::PaymentIcon { name })
            .collect(),
    )
}
