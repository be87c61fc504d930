//! Catalog records returned by [`super::CatalogSource`].

use serde::{Deserialize, Serialize};

use crate::util::money::Money;

/// Tag that keeps a product out of checkout upsells.
pub const NO_CHECKOUT_TAG: &str = "noCheckout";

/// A purchasable variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant global identifier (merchandise id).
    pub id: String,
    /// Variant title, e.g. `"Large / Blue"`; `"Default Title"` for single-variant products.
    #[serde(default)]
    pub title: String,
    /// Unit price in the shopper's market.
    pub price: Money,
    /// Unit price before discount, when the merchant set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Money>,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Whether the variant can be bought.
    #[serde(default = "default_available")]
    pub available_for_sale: bool,
}

const fn default_available() -> bool {
    true
}

impl Variant {
    /// What: Reference price for savings: compare-at when set, otherwise price.
    #[must_use]
    pub fn reference_price(&self) -> &Money {
        self.compare_at_price.as_ref().unwrap_or(&self.price)
    }
}

/// A product with its variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product global identifier.
    pub id: String,
    /// Product title.
    pub title: String,
    /// Merchant tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Featured image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image_url: Option<String>,
    /// Variants in merchant order.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// What: Whether the product carries the [`NO_CHECKOUT_TAG`].
    #[must_use]
    pub fn excluded_from_checkout(&self) -> bool {
        self.tags.iter().any(|t| t == NO_CHECKOUT_TAG)
    }

    /// First variant, the default selection.
    #[must_use]
    pub fn first_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// What: Look up a variant of this product by id.
    #[must_use]
    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Whether the variant selector should be shown.
    #[must_use]
    pub fn has_choices(&self) -> bool {
        self.variants.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Products decode from JSON with defaults for optional fields.
    fn product_from_json() {
        let product: Product = serde_json::from_str(
            r#"{
                "id": "gid://shopify/Product/1",
                "title": "Gift wrap",
                "tags": ["noCheckout"],
                "variants": [
                    {"id": "gid://shopify/ProductVariant/11", "price": {"amount": 4.0}},
                    {"id": "gid://shopify/ProductVariant/12", "title": "Gold",
                     "price": {"amount": 5.0}, "compare_at_price": {"amount": 6.5}}
                ]
            }"#,
        )
        .expect("product");
        assert!(product.excluded_from_checkout());
        assert!(product.has_choices());
        assert_eq!(
            product.first_variant().map(|v| v.id.as_str()),
            Some("gid://shopify/ProductVariant/11")
        );
        let gold = product
            .variant("gid://shopify/ProductVariant/12")
            .expect("gold");
        assert!(gold.available_for_sale);
        assert!((gold.reference_price().amount - 6.5).abs() < f64::EPSILON);
    }
}
