//! Single-item checkbox upsell.

use super::output::{Block, Tone};
use crate::cart::{InitialPolicy, SyncUnit, SyncView};
use crate::i18n::TranslationCatalog;
use crate::settings::CheckboxUpsellSettings;
use crate::sources::{CatalogSource, Variant};
use crate::template::{TemplateBindings, render, render_or};
use crate::util::ids::variant_gid;
use crate::util::money::format_money;

/// Subtitle when none is configured.
pub const DEFAULT_SUBTITLE: &str = "from Damage, Loss & Theft for";

/// What: Fetch the configured variant.
///
/// Output:
/// - `None` when no variant is configured, it does not exist, or the catalog failed
pub async fn load_variant<C: CatalogSource>(
    settings: &CheckboxUpsellSettings,
    source: &C,
    country: Option<&str>,
) -> Option<Variant> {
    let id = variant_gid(settings.variant_reference.as_deref()?);
    match source.variant(&id, country).await {
        Ok(Some(variant)) => Some(variant),
        Ok(None) => {
            tracing::warn!(variant = %id, "[CheckboxUpsell] Configured variant not found");
            None
        }
        Err(e) => {
            tracing::warn!(variant = %id, error = %e, "[CheckboxUpsell] Variant lookup failed");
            None
        }
    }
}

/// What: Sync unit for the loaded variant.
///
/// Details:
/// - `ensure_present` opts into a single add on mount.
#[must_use]
pub fn sync_unit(settings: &CheckboxUpsellSettings, variant: &Variant) -> SyncUnit {
    let policy = if settings.ensure_present {
        InitialPolicy::EnsurePresent
    } else {
        InitialPolicy::MirrorCart
    };
    SyncUnit::new(variant.id.clone(), policy)
}

/// What: Placeholder values: `{formattedPrice}` and `{guaranteePriceFmt}`.
#[must_use]
pub fn bindings(settings: &CheckboxUpsellSettings, variant: &Variant) -> TemplateBindings {
    TemplateBindings::new()
        .with("formattedPrice", variant.price.format())
        .with(
            "guaranteePriceFmt",
            format_money(settings.guarantee_price, &variant.price.currency_code),
        )
}

/// What: Render the checkbox upsell.
///
/// Inputs:
/// - `variant`: Loaded variant; `None` hides the block
/// - `view`: Sync state of the variant
#[must_use]
pub fn render_upsell(
    settings: &CheckboxUpsellSettings,
    catalog: Option<&TranslationCatalog>,
    variant: Option<&Variant>,
    view: &SyncView,
) -> Option<Block> {
    let variant = variant?;
    let bindings = bindings(settings, variant);

    let mut children = Vec::new();
    if let Some(heading) = render(settings.upsell_text.as_deref(), catalog, &bindings) {
        children.push(Block::Text {
            segments: heading,
            tone: Tone::Info,
            bold: true,
        });
    }

    let title = render(settings.text1.as_deref(), catalog, &bindings).unwrap_or_default();
    let mut details = vec![Block::Checkbox {
        checked: view.checked,
        busy: view.busy(),
        label: title,
    }];
    details.push(Block::text(
        render_or(settings.text2.as_deref(), DEFAULT_SUBTITLE, catalog, &bindings),
        Tone::Info,
    ));
    if let Some(description) = render(settings.text3.as_deref(), catalog, &bindings) {
        details.push(Block::text(description, Tone::Info));
    }
    let mut row = Vec::with_capacity(2);
    if let Some(url) = &variant.image_url {
        row.push(Block::Image { url: url.clone() });
    }
    row.push(Block::stack(details));
    children.push(Block::row(row));
    Some(Block::stack(children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartLine, CartSnapshot};
    use crate::util::money::Money;
    use crate::widgets::preview;

    fn variant() -> Variant {
        Variant {
            id: "gid://shopify/ProductVariant/77".into(),
            title: "Default Title".into(),
            price: Money::new(2.95, "EUR"),
            compare_at_price: None,
            image_url: None,
            available_for_sale: true,
        }
    }

    fn settings() -> CheckboxUpsellSettings {
        CheckboxUpsellSettings {
            variant_reference: Some("77".into()),
            upsell_text: Some("Protect your order".into()),
            text1: Some("Shipping insurance *{formattedPrice}*".into()),
            text3: Some("Covered up to {guaranteePriceFmt}, {guaranteePriceFmt} max".into()),
            guarantee_price: 500.0,
            ..CheckboxUpsellSettings::default()
        }
    }

    #[test]
    /// What: Every price placeholder occurrence is replaced.
    fn renders_prices_and_checkbox() {
        let mut unit = sync_unit(&settings(), &variant());
        unit.observe(&CartSnapshot::new(vec![CartLine::new(
            "l1",
            "gid://shopify/ProductVariant/77",
            1,
        )]));
        let block = render_upsell(&settings(), None, Some(&variant()), &unit.view()).expect("block");
        assert_eq!(
            preview(&block),
            "**Protect your order**\n\
             [x] Shipping insurance **€2.95** from Damage, Loss & Theft for Covered up to €500.00, €500.00 max\n"
        );
    }

    #[test]
    /// What: Without a loaded variant nothing renders.
    fn hidden_without_variant() {
        let unit = SyncUnit::new("v", InitialPolicy::MirrorCart);
        assert_eq!(render_upsell(&settings(), None, None, &unit.view()), None);
    }

    #[test]
    fn ensure_present_policy_from_settings() {
        let settings = CheckboxUpsellSettings {
            ensure_present: true,
            ..settings()
        };
        let mut unit = sync_unit(&settings, &variant());
        assert!(unit.observe(&CartSnapshot::default()).is_some());
    }
}
