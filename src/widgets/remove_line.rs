//! Remove link under one configured cart line.

use super::output::Block;
use crate::cart::{CartLine, CartMutation};
use crate::i18n::TranslationCatalog;
use crate::settings::RemoveLineSettings;
use crate::sources::{CartMutator, SourceError};
use crate::template::{TemplateBindings, render_or};
use crate::util::ids::variant_gid;

/// Link label when none is configured.
pub const DEFAULT_REMOVE_LABEL: &str = "Remove";

/// Busy state of the link for one line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemoveLineLink {
    busy: bool,
}

impl RemoveLineLink {
    /// What: Idle link.
    #[must_use]
    pub const fn new() -> Self {
        Self { busy: false }
    }

    /// Whether a removal is in flight.
    #[must_use]
    pub const fn busy(&self) -> bool {
        self.busy
    }

    /// What: Whether `line` is the configured target line.
    #[must_use]
    pub fn targets(settings: &RemoveLineSettings, line: &CartLine) -> bool {
        settings
            .variant_reference
            .as_deref()
            .is_some_and(|reference| line.merchandise_id == variant_gid(reference))
    }

    /// What: Render the link for `line`.
    ///
    /// Output:
    /// - `None` when the line is not the configured variant
    #[must_use]
    pub fn render(
        &self,
        settings: &RemoveLineSettings,
        catalog: Option<&TranslationCatalog>,
        line: &CartLine,
    ) -> Option<Block> {
        if !Self::targets(settings, line) {
            return None;
        }
        let label = render_or(
            settings.remove_line_item.as_deref(),
            DEFAULT_REMOVE_LABEL,
            catalog,
            &TemplateBindings::new(),
        );
        Some(Block::Link {
            label,
            busy: self.busy,
        })
    }

    /// What: Remove the whole line.
    ///
    /// Inputs:
    /// - `mutator`: Cart mutation service
    /// - `line`: Line to remove
    ///
    /// # Errors
    /// - Returns the mutator's error; the link is idle again either way.
    pub async fn press<M: CartMutator>(
        &mut self,
        mutator: &M,
        line: &CartLine,
    ) -> Result<(), SourceError> {
        self.busy = true;
        let result = mutator
            .apply(CartMutation::RemoveLine {
                id: line.id.clone(),
                quantity: line.quantity,
            })
            .await;
        self.busy = false;
        if let Err(e) = &result {
            tracing::warn!(line = %line.id, error = %e, "[RemoveLine] Removal failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemoryCart;
    use crate::widgets::preview;

    fn settings() -> RemoveLineSettings {
        RemoveLineSettings {
            variant_reference: Some("555".into()),
            remove_line_item: None,
        }
    }

    #[test]
    /// What: Only the configured variant's line gets the link.
    fn renders_for_target_only() {
        let link = RemoveLineLink::new();
        let target = CartLine::new("l1", "gid://shopify/ProductVariant/555", 2);
        let other = CartLine::new("l2", "gid://shopify/ProductVariant/556", 1);
        let block = link.render(&settings(), None, &target).expect("link");
        assert_eq!(preview(&block), "_Remove_\n");
        assert_eq!(link.render(&settings(), None, &other), None);
        assert_eq!(link.render(&RemoveLineSettings::default(), None, &target), None);
    }

    #[tokio::test]
    /// What: Pressing removes the full quantity and clears busy even on failure.
    async fn press_removes_full_line() {
        let line = CartLine::new("l1", "gid://shopify/ProductVariant/555", 2);
        let cart = MemoryCart::new(vec![line.clone()]);
        let mut link = RemoveLineLink::new();

        cart.fail_next("network");
        assert!(link.press(&cart, &line).await.is_err());
        assert!(!link.busy());

        link.press(&cart, &line).await.expect("removed");
        assert!(!link.busy());
        assert!(cart.snapshot().is_empty());
        assert_eq!(
            cart.applied().last(),
            Some(&CartMutation::RemoveLine {
                id: "l1".into(),
                quantity: 2
            })
        );
    }
}
