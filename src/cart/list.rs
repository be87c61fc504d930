//! Independent sync units for a list of upsell products.

use super::mutation::{LineAttribute, PendingMutation};
use super::snapshot::CartSnapshot;
use super::sync::{InitialPolicy, SyncUnit, SyncView};
use crate::sources::{Product, SourceError, Variant};

/// One list position: a product, its selected variant and its own unit.
#[derive(Clone, Debug)]
pub struct UpsellSlot {
    product: Product,
    selected: usize,
    unit: SyncUnit,
}

impl UpsellSlot {
    /// Product shown in this position.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// What: Currently selected variant.
    #[must_use]
    pub fn selected_variant(&self) -> &Variant {
        &self.product.variants[self.selected]
    }

    /// Sync unit for the selected variant.
    #[must_use]
    pub const fn unit(&self) -> &SyncUnit {
        &self.unit
    }

    /// Presentation snapshot for this position.
    #[must_use]
    pub fn view(&self) -> SyncView {
        self.unit.view()
    }
}

/// Upsell list state. Positions never share membership or loading flags.
#[derive(Clone, Debug, Default)]
pub struct UpsellSlots {
    slots: Vec<UpsellSlot>,
}

impl UpsellSlots {
    /// What: Build one slot per product, each starting on its first variant.
    ///
    /// Inputs:
    /// - `products`: Already filtered and truncated product list
    /// - `attributes`: Line attributes attached to every add
    ///
    /// Details:
    /// - Products without variants are skipped.
    #[must_use]
    pub fn new(products: Vec<Product>, attributes: &[LineAttribute]) -> Self {
        let slots = products
            .into_iter()
            .filter_map(|product| {
                let first = product.first_variant()?.id.clone();
                let unit = SyncUnit::new(first, InitialPolicy::MirrorCart)
                    .with_attributes(attributes.to_vec());
                Some(UpsellSlot {
                    product,
                    selected: 0,
                    unit,
                })
            })
            .collect();
        Self { slots }
    }

    /// Positions in display order.
    #[must_use]
    pub fn slots(&self) -> &[UpsellSlot] {
        &self.slots
    }

    /// Position by index.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&UpsellSlot> {
        self.slots.get(position)
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the list has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// What: Feed a cart snapshot to every position.
    ///
    /// Output:
    /// - `(position, mutation)` for every unit the snapshot unblocked
    pub fn observe(&mut self, snapshot: &CartSnapshot) -> Vec<(usize, PendingMutation)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.unit.observe(snapshot).map(|m| (i, m)))
            .collect()
    }

    /// What: Toggle the membership of one position.
    pub fn toggle(&mut self, position: usize) -> Option<PendingMutation> {
        self.slots.get_mut(position)?.unit.toggle()
    }

    /// What: Record an explicit add/remove intent for one position.
    pub fn set_desired(&mut self, position: usize, desired: bool) -> Option<PendingMutation> {
        self.slots.get_mut(position)?.unit.set_desired(desired)
    }

    /// What: Change the selected variant of one position.
    ///
    /// Output:
    /// - `false` when the position or the variant does not exist
    ///
    /// Details:
    /// - The position's unit is re-targeted; other positions are untouched.
    pub fn select_variant(&mut self, position: usize, variant_id: &str) -> bool {
        let Some(slot) = self.slots.get_mut(position) else {
            return false;
        };
        let Some(index) = slot.product.variants.iter().position(|v| v.id == variant_id) else {
            tracing::debug!(position, variant_id, "[Upsell] Unknown variant selected");
            return false;
        };
        slot.selected = index;
        slot.unit.retarget(variant_id);
        true
    }

    /// What: Route a mutation result to the position that issued it.
    pub fn on_mutation_result(
        &mut self,
        position: usize,
        ticket: u64,
        result: Result<(), SourceError>,
    ) -> Option<PendingMutation> {
        self.slots
            .get_mut(position)?
            .unit
            .on_mutation_result(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartLine, CartMutation, Phase};
    use crate::util::money::Money;

    fn product(id: &str, variants: &[&str]) -> Product {
        Product {
            id: id.to_string(),
            title: id.to_string(),
            tags: Vec::new(),
            featured_image_url: None,
            variants: variants
                .iter()
                .map(|v| Variant {
                    id: (*v).to_string(),
                    title: (*v).to_string(),
                    price: Money::new(5.0, "USD"),
                    compare_at_price: None,
                    image_url: None,
                    available_for_sale: true,
                })
                .collect(),
        }
    }

    #[test]
    /// What: Positions track membership and loading independently.
    fn positions_are_independent() {
        let mut slots = UpsellSlots::new(
            vec![product("p1", &["a1", "a2"]), product("p2", &["b1"])],
            &[],
        );
        slots.observe(&CartSnapshot::new(vec![CartLine::new("l1", "b1", 1)]));
        assert!(!slots.slots()[0].view().checked);
        assert!(slots.slots()[1].view().checked);

        let add = slots.toggle(0).expect("add");
        assert_eq!(slots.slots()[0].unit().phase(), Phase::Mutating);
        assert_eq!(slots.slots()[1].unit().phase(), Phase::Idle);
        assert!(matches!(
            add.mutation,
            CartMutation::AddLine { ref merchandise_id, .. } if merchandise_id == "a1"
        ));
    }

    #[test]
    /// What: Selecting a variant re-derives membership for that position only.
    fn variant_change_retargets() {
        let mut slots = UpsellSlots::new(
            vec![product("p1", &["a1", "a2"]), product("p2", &["b1"])],
            &[],
        );
        slots.observe(&CartSnapshot::new(vec![
            CartLine::new("l1", "a2", 1),
            CartLine::new("l2", "b1", 1),
        ]));
        assert!(!slots.slots()[0].view().checked);
        assert!(slots.select_variant(0, "a2"));
        assert_eq!(slots.slots()[0].selected_variant().id, "a2");
        assert!(slots.slots()[0].view().checked);
        assert!(slots.slots()[1].view().checked);
        assert!(!slots.select_variant(0, "zz"));
        assert!(!slots.select_variant(7, "a1"));
    }

    #[test]
    /// What: Products without variants are dropped.
    fn empty_products_skipped() {
        let slots = UpsellSlots::new(vec![product("p1", &[]), product("p2", &["b1"])], &[]);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots.slots()[0].product().id, "p2");
    }
}
