//! Metafield-driven upsell product list.

use super::output::{Block, Tone};
use crate::cart::{LineAttribute, UpsellSlot, UpsellSlots};
use crate::i18n::TranslationCatalog;
use crate::settings::UpsellListSettings;
use crate::sources::{CatalogSource, Product};
use crate::template::{Segment, TemplateBindings, render, render_or};
use crate::util::ids::collect_metafield_ids;
use crate::util::money::format_money;

/// Line attribute key marking lines added from the list.
pub const UPSELL_ATTRIBUTE: &str = "_maisonUpsell";

/// Remove link label when none is configured.
pub const DEFAULT_REMOVE_TEXT: &str = "Remove";

/// Ids fetched per displayed product, so filtering still leaves enough.
const FETCH_BUFFER: usize = 2;

/// What: Attributes attached to every add from the list.
#[must_use]
pub fn line_attributes() -> Vec<LineAttribute> {
    vec![LineAttribute {
        key: UPSELL_ATTRIBUTE.to_string(),
        value: "true".to_string(),
    }]
}

/// What: Candidate product ids from the upsell metafields.
#[must_use]
pub fn candidate_ids(settings: &UpsellListSettings, metafields: &[String]) -> Vec<String> {
    collect_metafield_ids(metafields, settings.max_upsells() * FETCH_BUFFER)
}

/// What: Fetch, filter and truncate the upsell products.
///
/// Output:
/// - At most `max_upsells` products not tagged `noCheckout`; empty on catalog failure
pub async fn load_products<C: CatalogSource>(
    settings: &UpsellListSettings,
    source: &C,
    ids: &[String],
    country: Option<&str>,
) -> Vec<Product> {
    if ids.is_empty() {
        return Vec::new();
    }
    match source.products(ids, country).await {
        Ok(products) => {
            let kept: Vec<Product> = products
                .into_iter()
                .filter(|p| !p.excluded_from_checkout())
                .take(settings.max_upsells())
                .collect();
            tracing::debug!(requested = ids.len(), kept = kept.len(), "[Upsell] Products loaded");
            kept
        }
        Err(e) => {
            tracing::warn!(error = %e, "[Upsell] Product query failed; hiding list");
            Vec::new()
        }
    }
}

/// What: Build the slot list for loaded products.
#[must_use]
pub fn slots(products: Vec<Product>) -> UpsellSlots {
    UpsellSlots::new(products, &line_attributes())
}

/// What: Displayed price for a slot's selected variant.
///
/// Output:
/// - With a discount: discounted price and the compare-at (or list) price struck
/// - Without: list price and the compare-at price struck when set
#[must_use]
pub fn price_block(settings: &UpsellListSettings, slot: &UpsellSlot) -> Block {
    let variant = slot.selected_variant();
    let currency = &variant.price.currency_code;
    match settings.discount_multiplier() {
        Some(multiplier) => Block::Price {
            current: format_money(variant.price.amount * multiplier, currency),
            struck: Some(variant.reference_price().format()),
        },
        None => Block::Price {
            current: variant.price.format(),
            struck: variant.compare_at_price.as_ref().map(|m| m.format()),
        },
    }
}

/// What: Render the list.
///
/// Output:
/// - `None` when there is nothing to offer
#[must_use]
pub fn render_list(
    settings: &UpsellListSettings,
    catalog: Option<&TranslationCatalog>,
    slots: &UpsellSlots,
) -> Option<Block> {
    if slots.is_empty() {
        return None;
    }
    let none = TemplateBindings::new();
    let mut children = Vec::with_capacity(slots.len() + 1);
    if let Some(header) = render(settings.header_text.as_deref(), catalog, &none) {
        children.push(Block::Text {
            segments: header,
            tone: Tone::Info,
            bold: true,
        });
    }

    let add_label = render_or(Some(settings.add_to_cart.as_str()), "Add", catalog, &none);
    let remove_label = render_or(
        settings.remove_text.as_deref(),
        DEFAULT_REMOVE_TEXT,
        catalog,
        &none,
    );

    for slot in slots.slots() {
        let product = slot.product();
        let variant = slot.selected_variant();
        let view = slot.view();

        let mut info = vec![
            Block::text(vec![Segment::plain(product.title.clone())], Tone::Info),
            price_block(settings, slot),
        ];
        if product.has_choices() {
            info.push(Block::Select {
                options: product
                    .variants
                    .iter()
                    .map(|v| (v.id.clone(), v.title.clone()))
                    .collect(),
                selected: variant.id.clone(),
            });
        }

        let mut actions = vec![Block::Button {
            label: add_label.clone(),
            busy: view.busy(),
            done: view.checked,
        }];
        if view.checked && !view.busy() {
            actions.push(Block::Link {
                label: remove_label.clone(),
                busy: false,
            });
        }

        let mut row = Vec::with_capacity(3);
        if let Some(url) = variant
            .image_url
            .as_ref()
            .or(product.featured_image_url.as_ref())
        {
            row.push(Block::Image { url: url.clone() });
        }
        row.push(Block::stack(info));
        row.push(Block::stack(actions));
        children.push(Block::row(row));
    }
    Some(Block::stack(children))
}
