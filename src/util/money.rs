//! Money amounts and currency formatting.

use serde::{Deserialize, Serialize};

/// Monetary amount in a given currency, as returned by the catalog and cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount in major units (e.g. `12.5` for 12.50).
    pub amount: f64,
    /// ISO 4217 currency code.
    #[serde(default = "default_currency")]
    pub currency_code: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Money {
    /// What: Construct a `Money` value.
    #[must_use]
    pub fn new(amount: f64, currency_code: &str) -> Self {
        Self {
            amount,
            currency_code: currency_code.to_string(),
        }
    }

    /// What: Amount expressed in integer cents.
    #[must_use]
    pub fn cents(&self) -> i64 {
        to_cents(self.amount)
    }

    /// What: Format this amount for display.
    #[must_use]
    pub fn format(&self) -> String {
        format_money(self.amount, &self.currency_code)
    }
}

/// What: Convert a major-unit amount to integer cents, rounding half away from zero.
///
/// Details:
/// - Non-finite input maps to `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_cents(amount: f64) -> i64 {
    if !amount.is_finite() {
        return 0;
    }
    (amount * 100.0).round() as i64
}

/// What: Convert integer cents back to a major-unit amount.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// What: Look up the display symbol for common currency codes.
fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.to_ascii_uppercase().as_str() {
        "USD" | "CAD" | "AUD" | "NZD" | "MXN" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" | "CNY" => Some("¥"),
        "INR" => Some("₹"),
        "CHF" => Some("CHF "),
        "SEK" | "NOK" | "DKK" => Some("kr "),
        "PLN" => Some("zł "),
        _ => None,
    }
}

/// What: Format an amount with two fraction digits and a currency marker.
///
/// Inputs:
/// - `amount`: Major-unit amount
/// - `currency_code`: ISO 4217 code
///
/// Output:
/// - `"$12.50"` for known symbols, `"12.50 XYZ"` otherwise
///
/// Details:
/// - Negative amounts keep their sign in front of the symbol (`-$3.00`).
#[must_use]
pub fn format_money(amount: f64, currency_code: &str) -> String {
    let cents = to_cents(amount);
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let digits = format!("{}.{:02}", abs / 100, abs % 100);
    match currency_symbol(currency_code) {
        Some(symbol) => format!("{sign}{symbol}{digits}"),
        None => format!("{sign}{digits} {}", currency_code.to_ascii_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Known currencies render with their symbol and two decimals.
    fn format_known_currency() {
        assert_eq!(format_money(10.0, "USD"), "$10.00");
        assert_eq!(format_money(3.456, "eur"), "€3.46");
        assert_eq!(format_money(-3.0, "GBP"), "-£3.00");
    }

    #[test]
    /// What: Unknown currencies fall back to a code suffix.
    fn format_unknown_currency() {
        assert_eq!(format_money(7.5, "xyz"), "7.50 XYZ");
    }

    #[test]
    /// What: Cent conversion rounds and tolerates non-finite input.
    fn cents_roundtrip_edges() {
        assert_eq!(to_cents(0.1 + 0.2), 30);
        assert_eq!(to_cents(f64::NAN), 0);
        assert!((from_cents(4000) - 40.0).abs() < f64::EPSILON);
    }
}
