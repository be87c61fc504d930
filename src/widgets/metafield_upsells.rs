//! Add-to-bag offers for the products listed in the upsell metafield.
//!
//! Unlike the upsell list, the whole block disappears as soon as any of its
//! products is in the cart, and pressing a button only ever adds.

use super::output::{Block, Tone};
use crate::cart::{CartSnapshot, UpsellSlots};
use crate::i18n::{TranslationCatalog, resolve};
use crate::settings::MetafieldUpsellsSettings;
use crate::sources::{CatalogSource, Product};
use crate::template::{Segment, TemplateBindings, render_or};
use crate::util::ids::collect_metafield_ids;

/// Products offered at most.
pub const MAX_PRODUCTS: usize = 3;

/// Button label when none is configured.
pub const DEFAULT_ADD_TEXT: &str = "Add to bag";

/// What: Product ids from the upsell metafields, at most [`MAX_PRODUCTS`].
#[must_use]
pub fn candidate_ids(metafields: &[String]) -> Vec<String> {
    collect_metafield_ids(metafields, MAX_PRODUCTS)
}

/// What: Fetch the offered products.
///
/// Output:
/// - Products in metafield order; empty on catalog failure
pub async fn load_products<C: CatalogSource>(
    source: &C,
    ids: &[String],
    country: Option<&str>,
) -> Vec<Product> {
    if ids.is_empty() {
        return Vec::new();
    }
    match source.products(ids, country).await {
        Ok(mut products) => {
            products.truncate(MAX_PRODUCTS);
            tracing::debug!(kept = products.len(), "[MetafieldUpsell] Products loaded");
            products
        }
        Err(e) => {
            tracing::warn!(error = %e, "[MetafieldUpsell] Product query failed; hiding block");
            Vec::new()
        }
    }
}

/// What: Slot list for loaded products; adds carry no line attributes.
#[must_use]
pub fn slots(products: Vec<Product>) -> UpsellSlots {
    UpsellSlots::new(products, &[])
}

/// What: Whether one of the offered products is already in the cart.
///
/// Inputs:
/// - `snapshot`: Current cart
/// - `product_ids`: Ids read from the metafield
/// - `slots`: Loaded offers
///
/// Details:
/// - Lines are matched by product id; lines whose host reports no product id
///   are matched by any variant of an offered product.
#[must_use]
pub fn already_in_cart(
    snapshot: &CartSnapshot,
    product_ids: &[String],
    slots: &UpsellSlots,
) -> bool {
    snapshot.contains_any_product(product_ids)
        || slots.slots().iter().any(|slot| {
            slot.product()
                .variants
                .iter()
                .any(|variant| snapshot.contains(&variant.id))
        })
}

/// What: Render the offers.
///
/// Output:
/// - `None` when nothing loaded or one of the products is already in the cart
#[must_use]
pub fn render_offers(
    settings: &MetafieldUpsellsSettings,
    catalog: Option<&TranslationCatalog>,
    slots: &UpsellSlots,
    snapshot: &CartSnapshot,
    product_ids: &[String],
) -> Option<Block> {
    if slots.is_empty() || already_in_cart(snapshot, product_ids, slots) {
        return None;
    }
    let add_label = render_or(
        settings.add_text.as_deref(),
        DEFAULT_ADD_TEXT,
        catalog,
        &TemplateBindings::new(),
    );
    let rows = slots
        .slots()
        .iter()
        .map(|slot| {
            let product = slot.product();
            let variant = slot.selected_variant();
            let mut info = vec![
                Block::text(
                    vec![Segment::plain(resolve(catalog, &product.title))],
                    Tone::Info,
                ),
                Block::Price {
                    current: variant.price.format(),
                    struck: variant.compare_at_price.as_ref().map(|m| m.format()),
                },
            ];
            if product.has_choices() {
                info.push(Block::Select {
                    options: product
                        .variants
                        .iter()
                        .map(|v| {
                            let title = resolve(catalog, &v.title);
                            (v.id.clone(), format!("{title} ({})", v.price.format()))
                        })
                        .collect(),
                    selected: variant.id.clone(),
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
            row.push(Block::Button {
                label: add_label.clone(),
                busy: slot.view().busy(),
                done: false,
            });
            Block::row(row)
        })
        .collect();
    Some(Block::stack(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::sources::{MemoryCatalog, Variant};
    use crate::util::money::Money;
    use crate::widgets::preview;

    fn product(n: u32, variants: &[(&str, f64)]) -> Product {
        Product {
            id: format!("gid://shopify/Product/{n}"),
            title: format!("Product {n}"),
            tags: Vec::new(),
            featured_image_url: None,
            variants: variants
                .iter()
                .enumerate()
                .map(|(i, (title, price))| Variant {
                    id: format!("gid://shopify/ProductVariant/{n}{i}"),
                    title: (*title).to_string(),
                    price: Money::new(*price, "USD"),
                    compare_at_price: None,
                    image_url: None,
                    available_for_sale: true,
                })
                .collect(),
        }
    }

    fn ids() -> Vec<String> {
        vec!["gid://shopify/Product/1".into(), "gid://shopify/Product/2".into()]
    }

    #[tokio::test]
    /// What: At most three products are offered, in metafield order.
    async fn load_caps_products() {
        let catalog =
            MemoryCatalog::new((1..=5).map(|n| product(n, &[("Default", 5.0)])).collect());
        let metafields = vec![
            r#"["gid://shopify/Product/4","gid://shopify/Product/1"]"#.to_string(),
            r#"["gid://shopify/Product/2","gid://shopify/Product/3"]"#.to_string(),
        ];
        let ids = candidate_ids(&metafields);
        assert_eq!(ids.len(), MAX_PRODUCTS);
        let products = load_products(&catalog, &ids, None).await;
        let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Product 4", "Product 1", "Product 2"]);

        catalog.set_failing(true);
        assert!(load_products(&catalog, &ids, None).await.is_empty());
    }

    #[test]
    /// What: A line of any offered product hides the whole block.
    ///
    /// Inputs:
    /// - Line tagged with an offered product id, line of an offered variant
    ///   without product id, unrelated line.
    ///
    /// Output:
    /// - Hidden for the first two, shown for the unrelated cart.
    fn hidden_once_a_product_is_bought() {
        let slots = slots(vec![
            product(1, &[("Default", 5.0)]),
            product(2, &[("Default", 7.0)]),
        ]);
        let settings = MetafieldUpsellsSettings::default();

        let mut tagged = CartLine::new("l1", "gid://shopify/ProductVariant/999", 1);
        tagged.product_id = Some("gid://shopify/Product/2".into());
        let by_product = CartSnapshot::new(vec![tagged]);
        assert!(by_product.contains_any_product(&ids()));
        assert_eq!(render_offers(&settings, None, &slots, &by_product, &ids()), None);

        let by_variant =
            CartSnapshot::new(vec![CartLine::new("l2", "gid://shopify/ProductVariant/10", 1)]);
        assert!(!by_variant.contains_any_product(&ids()));
        assert_eq!(render_offers(&settings, None, &slots, &by_variant, &ids()), None);

        let unrelated =
            CartSnapshot::new(vec![CartLine::new("l3", "gid://shopify/ProductVariant/55", 1)]);
        let block = render_offers(&settings, None, &slots, &unrelated, &ids()).expect("offers");
        assert_eq!(
            preview(&block),
            "Product 1 $5.00 | <Add to bag>\nProduct 2 $7.00 | <Add to bag>\n"
        );
    }

    #[test]
    /// What: Variant options show their price next to the translated title.
    fn variant_options_with_price() {
        let slots = slots(vec![product(3, &[("Small", 5.0), ("Large", 6.5)])]);
        let catalog = TranslationCatalog::from_entries([
            ("Large".to_string(), "Groß".to_string()),
            ("Add to bag".to_string(), "In den Warenkorb".to_string()),
        ]);
        let block = render_offers(
            &MetafieldUpsellsSettings::default(),
            Some(&catalog),
            &slots,
            &CartSnapshot::default(),
            &["gid://shopify/Product/3".to_string()],
        )
        .expect("offers");
        assert_eq!(
            preview(&block),
            "Product 3 $5.00 Options: (Small ($5.00)) / Groß ($6.50) | <In den Warenkorb>\n"
        );
    }
}
