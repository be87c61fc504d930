//! Read-only projection of the host-owned cart.

use serde::{Deserialize, Serialize};

use crate::util::money::Money;

/// One line of the authoritative cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Host line identifier, used to target removals.
    pub id: String,
    /// Variant global identifier of the merchandise on this line.
    pub merchandise_id: String,
    /// Number of units.
    pub quantity: u32,
    /// Product global identifier, when the host reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Total paid for the line (all units), when the host reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Money>,
}

impl CartLine {
    /// What: Minimal line with only identity and quantity.
    #[must_use]
    pub fn new(id: &str, merchandise_id: &str, quantity: u32) -> Self {
        Self {
            id: id.to_string(),
            merchandise_id: merchandise_id.to_string(),
            quantity,
            product_id: None,
            total_amount: None,
        }
    }
}

/// Ordered, immutable view of the cart as last pushed by the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// What: Wrap the host's line list.
    #[must_use]
    pub const fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// What: Lines in host order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// What: Whether any line carries `merchandise_id`.
    #[must_use]
    pub fn contains(&self, merchandise_id: &str) -> bool {
        self.find(merchandise_id).is_some()
    }

    /// What: First line carrying `merchandise_id`.
    #[must_use]
    pub fn find(&self, merchandise_id: &str) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.merchandise_id == merchandise_id)
    }

    /// What: Whether any line belongs to one of the given products.
    #[must_use]
    pub fn contains_any_product(&self, product_ids: &[String]) -> bool {
        self.lines.iter().any(|line| {
            line.product_id
                .as_ref()
                .is_some_and(|p| product_ids.contains(p))
        })
    }

    /// What: Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_merchandise() {
        let snapshot = CartSnapshot::new(vec![
            CartLine::new("line-1", "gid://shopify/ProductVariant/1", 2),
            CartLine::new("line-2", "gid://shopify/ProductVariant/2", 1),
        ]);
        assert!(snapshot.contains("gid://shopify/ProductVariant/2"));
        assert!(!snapshot.contains("gid://shopify/ProductVariant/3"));
        assert_eq!(
            snapshot
                .find("gid://shopify/ProductVariant/1")
                .map(|l| l.id.as_str()),
            Some("line-1")
        );
        assert_eq!(snapshot.total_quantity(), 3);
    }

    #[test]
    /// What: Snapshots deserialize from a plain JSON list.
    fn deserialize_from_list() {
        let snapshot: CartSnapshot = serde_json::from_str(
            r#"[{"id":"l1","merchandise_id":"v1","quantity":1,"product_id":"p1"}]"#,
        )
        .expect("snapshot");
        assert!(snapshot.contains_any_product(&["p1".to_string()]));
        assert!(!snapshot.contains_any_product(&["p2".to_string()]));
    }
}
