//! Derived metrics: authoritative quantity in, clamped quantity out.
//!
//! Every metric here is a pure evaluation over inputs the host owns (cart
//! subtotal, cart lines, catalog prices) or over its own simulated state
//! (decaying stock, reservation countdown). Results carry a [`Trend`] relative
//! to the previous evaluation so the presentation layer can animate changes.
//!
//! Recurring work (stock decay, countdown ticks) runs on [`TimerHandle`]s that
//! stop when dropped.

mod countdown;
mod savings;
mod stock;
mod threshold;
mod timer;

pub use countdown::{
    DEFAULT_EXPIRED_TEXT, DEFAULT_RESERVATION_SECS, RESERVATION_KEY, ReservationCountdown,
    countdown_text, spawn_countdown,
};
pub use savings::{Savings, SavingsTracker, compute_savings};
pub use stock::{
    DecayingStock, DecrementSource, FixedDecrement, RandomDecrement, STOCK_FLOOR, StockConfig,
    spawn_stock_decay,
};
pub use threshold::{ShippingProgress, ThresholdTable, evaluate_progress};
pub use timer::{Tick, TimerHandle, spawn_ticker};

/// Direction of a metric relative to its previous evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Trend {
    /// Value went up.
    Rising,
    /// Value went down.
    Falling,
    /// First evaluation, or unchanged.
    #[default]
    Steady,
}

/// Clamped metric value with its trend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricResult<T> {
    /// Current value.
    pub value: T,
    /// Change relative to the previous result.
    pub trend: Trend,
}

impl<T: PartialOrd + Copy> MetricResult<T> {
    /// What: Result without history.
    #[must_use]
    pub const fn first(value: T) -> Self {
        Self {
            value,
            trend: Trend::Steady,
        }
    }

    /// What: Result following `previous`.
    ///
    /// Details:
    /// - Values that do not compare (NaN) are reported as `Steady`.
    #[must_use]
    pub fn after(previous: Option<&Self>, value: T) -> Self {
        let trend = match previous.and_then(|p| value.partial_cmp(&p.value)) {
            Some(std::cmp::Ordering::Greater) => Trend::Rising,
            Some(std::cmp::Ordering::Less) => Trend::Falling,
            _ => Trend::Steady,
        };
        Self { value, trend }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_follows_previous() {
        let first = MetricResult::first(10_u32);
        assert_eq!(first.trend, Trend::Steady);
        assert_eq!(MetricResult::after(Some(&first), 8).trend, Trend::Falling);
        assert_eq!(MetricResult::after(Some(&first), 12).trend, Trend::Rising);
        assert_eq!(MetricResult::after(None, 12).trend, Trend::Steady);
        let nan = MetricResult::first(f64::NAN);
        assert_eq!(MetricResult::after(Some(&nan), 0.5).trend, Trend::Steady);
    }
}
