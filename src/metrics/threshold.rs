//! Free-shipping threshold table and progress.

use std::collections::HashMap;

use super::MetricResult;
use crate::util::money::{from_cents, to_cents};

/// Per-country free-shipping thresholds, stored in cents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThresholdTable {
    by_country: HashMap<String, i64>,
}

impl ThresholdTable {
    /// What: Parse a `COUNTRY=AMOUNT` block, one entry per line.
    ///
    /// Inputs:
    /// - `text`: Merchant setting, e.g. `"US=100\nCA=150"`
    ///
    /// Output:
    /// - Table keyed by upper-cased country code
    ///
    /// Details:
    /// - Blank lines are ignored.
    /// - Entries with a missing, non-numeric, non-finite or non-positive amount
    ///   are skipped with a warning; parsing continues.
    /// - Text after a second `=` is ignored; a later duplicate country wins.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut by_country = HashMap::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split('=');
            let country = parts.next().unwrap_or_default().trim();
            let amount = parts.next().map(str::trim).unwrap_or_default();
            let parsed = amount.parse::<f64>().ok().filter(|a| a.is_finite() && *a > 0.0);
            match (country.is_empty(), parsed) {
                (false, Some(amount)) => {
                    by_country.insert(country.to_ascii_uppercase(), to_cents(amount));
                }
                _ => {
                    tracing::warn!(
                        line = lineno + 1,
                        entry = line,
                        "[Threshold] Skipping invalid threshold entry"
                    );
                }
            }
        }
        tracing::debug!(countries = by_country.len(), "[Threshold] Parsed threshold table");
        Self { by_country }
    }

    /// What: Threshold for a country (case-insensitive), in cents.
    #[must_use]
    pub fn threshold_cents(&self, country: &str) -> Option<i64> {
        self.by_country.get(&country.to_ascii_uppercase()).copied()
    }

    /// Number of configured countries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_country.len()
    }

    /// Whether no country is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }

    /// What: Evaluate progress for the shopper's country.
    ///
    /// Inputs:
    /// - `country`: Shipping country, `None` when unknown
    /// - `subtotal`: Cart subtotal in major units
    /// - `previous`: Last result, for the trend
    #[must_use]
    pub fn evaluate(
        &self,
        country: Option<&str>,
        subtotal: f64,
        previous: Option<&ShippingProgress>,
    ) -> ShippingProgress {
        let threshold = country.and_then(|c| self.threshold_cents(c));
        evaluate_progress(to_cents(subtotal), threshold, previous)
    }
}

/// Free-shipping progress for one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShippingProgress {
    /// Subtotal in cents.
    pub subtotal_cents: i64,
    /// Threshold in cents, `None` when the country has none.
    pub threshold_cents: Option<i64>,
    /// `max(0, threshold - subtotal)` in cents; `0` without threshold.
    pub remaining_cents: i64,
    /// Fraction in `[0, 1]`.
    pub progress: MetricResult<f64>,
    /// Whether the threshold is configured and met.
    pub reached: bool,
}

impl ShippingProgress {
    /// Subtotal in major units.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        from_cents(self.subtotal_cents)
    }

    /// Threshold in major units (`0` when not configured).
    #[must_use]
    pub fn threshold(&self) -> f64 {
        from_cents(self.threshold_cents.unwrap_or(0))
    }

    /// Remaining amount in major units.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        from_cents(self.remaining_cents)
    }
}

/// What: Core threshold computation in integer cents.
///
/// Inputs:
/// - `subtotal_cents`: Cart subtotal
/// - `threshold_cents`: Configured threshold, `None` when absent
/// - `previous`: Last result, for the trend
///
/// Output:
/// - Clamped progress; without a threshold, progress is `0` and never reached
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_progress(
    subtotal_cents: i64,
    threshold_cents: Option<i64>,
    previous: Option<&ShippingProgress>,
) -> ShippingProgress {
    let (remaining_cents, fraction, reached) = match threshold_cents {
        Some(threshold) if threshold > 0 => {
            let remaining = (threshold - subtotal_cents).max(0);
            let fraction = (subtotal_cents as f64 / threshold as f64).clamp(0.0, 1.0);
            (remaining, fraction, remaining <= 0)
        }
        _ => (0, 0.0, false),
    };
    ShippingProgress {
        subtotal_cents,
        threshold_cents,
        remaining_cents,
        progress: MetricResult::after(previous.map(|p| &p.progress), fraction),
        reached,
    }
}
