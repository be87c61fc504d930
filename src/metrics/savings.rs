//! Compare-at savings over the cart.

use futures::future::try_join_all;

use crate::cart::{CartLine, CartSnapshot};
use crate::sources::{CatalogSource, SourceError};
use crate::util::money::{Money, from_cents};

/// Total saved against compare-at prices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Savings {
    /// Saved amount in cents, never negative.
    pub cents: i64,
    /// Currency of the catalog prices.
    pub currency_code: String,
}

impl Savings {
    /// What: Saved amount as [`Money`].
    #[must_use]
    pub fn money(&self) -> Money {
        Money::new(from_cents(self.cents), &self.currency_code)
    }

    /// Whether there is anything to show.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.cents > 0
    }
}

/// What: Compute savings for every line of the cart.
///
/// Inputs:
/// - `catalog`: Catalog service for compare-at and unit prices
/// - `snapshot`: Current cart
/// - `country`: Shopper's localization country
///
/// Output:
/// - `max(0, Σ compare·q − Σ paid)` in cents
///
/// # Errors
/// - Any failed lookup fails the whole computation; a partial sum is never returned
/// - A line whose variant is unknown is a `SourceError::Decode`
///
/// Details:
/// - `compare` is the variant's compare-at price, or its price when unset.
/// - `paid` is the line total, or price × quantity when the host omits it.
pub async fn compute_savings<C: CatalogSource>(
    catalog: &C,
    snapshot: &CartSnapshot,
    country: Option<&str>,
) -> Result<Savings, SourceError> {
    let lines: Vec<&CartLine> = snapshot.lines().iter().filter(|l| l.quantity > 0).collect();
    let variants = try_join_all(
        lines
            .iter()
            .map(|line| catalog.variant(&line.merchandise_id, country)),
    )
    .await?;

    let mut compare_total = 0_i64;
    let mut paid_total = 0_i64;
    let mut currency_code = None;
    for (line, variant) in lines.iter().zip(variants) {
        let variant = variant.ok_or_else(|| {
            SourceError::Decode(format!("unknown variant {}", line.merchandise_id))
        })?;
        let quantity = i64::from(line.quantity);
        compare_total += variant.reference_price().cents() * quantity;
        paid_total += line
            .total_amount
            .as_ref()
            .map_or(variant.price.cents() * quantity, Money::cents);
        currency_code.get_or_insert_with(|| variant.price.currency_code.clone());
    }

    Ok(Savings {
        cents: (compare_total - paid_total).max(0),
        currency_code: currency_code.unwrap_or_else(|| "USD".to_string()),
    })
}

/// Recomputes savings only when the cart's total quantity changes.
#[derive(Clone, Debug, Default)]
pub struct SavingsTracker {
    last_quantity: u32,
    savings: Option<Savings>,
}

impl SavingsTracker {
    /// What: Fresh tracker; an empty cart yields no data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last computed savings.
    #[must_use]
    pub const fn savings(&self) -> Option<&Savings> {
        self.savings.as_ref()
    }

    /// What: Refresh from a new snapshot.
    ///
    /// Output:
    /// - The savings to display, `None` when unknown (catalog failure) or not yet computed
    ///
    /// Details:
    /// - The catalog is queried only when the total quantity differs from the
    ///   previous refresh; a failure clears the value so nothing stale is shown.
    pub async fn refresh<C: CatalogSource>(
        &mut self,
        catalog: &C,
        snapshot: &CartSnapshot,
        country: Option<&str>,
    ) -> Option<&Savings> {
        let quantity = snapshot.total_quantity();
        if quantity != self.last_quantity {
            self.savings = match compute_savings(catalog, snapshot, country).await {
                Ok(savings) => {
                    tracing::debug!(cents = savings.cents, quantity, "[Savings] Recomputed savings");
                    Some(savings)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "[Savings] Catalog lookup failed; hiding savings");
                    None
                }
            };
            self.last_quantity = quantity;
        }
        self.savings.as_ref()
    }
}
