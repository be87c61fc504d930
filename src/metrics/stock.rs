//! Simulated decaying stock count.

use std::sync::Arc;
use std::time::Duration;

use rand::RngExt;
use tokio::sync::watch;

use super::MetricResult;
use super::timer::{Tick, TimerHandle, spawn_ticker};
use crate::sources::ValueStore;

/// Lowest stock ever displayed.
pub const STOCK_FLOOR: u32 = 8;

/// Source of per-interval decrements.
pub trait DecrementSource: Send + 'static {
    /// What: Pick a decrement in `min..=max` (`min <= max` is guaranteed).
    fn decrement(&mut self, min: u32, max: u32) -> u32;
}

/// Uniformly random decrements from the thread RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomDecrement;

impl DecrementSource for RandomDecrement {
    fn decrement(&mut self, min: u32, max: u32) -> u32 {
        rand::rng().random_range(min..=max)
    }
}

/// Fixed decrement, clamped into the configured range. Deterministic for tests and previews.
#[derive(Clone, Copy, Debug)]
pub struct FixedDecrement(pub u32);

impl DecrementSource for FixedDecrement {
    fn decrement(&mut self, min: u32, max: u32) -> u32 {
        self.0.clamp(min, max)
    }
}

/// Normalised stock decay configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StockConfig {
    /// Starting stock (at least the floor).
    pub initial: u32,
    /// Time between decrements (at least one second).
    pub interval: Duration,
    /// Smallest decrement.
    pub min_decrease: u32,
    /// Largest decrement.
    pub max_decrease: u32,
    /// Lowest displayed value (at least 1).
    pub floor: u32,
}

impl StockConfig {
    /// What: Build a configuration, repairing out-of-range values.
    ///
    /// Details:
    /// - Swapped bounds are reordered.
    /// - The floor is at least 1 and the initial stock at least the floor.
    #[must_use]
    pub fn new(initial: u32, interval: Duration, min_decrease: u32, max_decrease: u32) -> Self {
        let (min_decrease, max_decrease) = if min_decrease <= max_decrease {
            (min_decrease, max_decrease)
        } else {
            tracing::warn!(
                min_decrease,
                max_decrease,
                "[Stock] Decrease bounds reversed; swapping"
            );
            (max_decrease, min_decrease)
        };
        let floor = STOCK_FLOOR.max(1);
        Self {
            initial: initial.max(floor),
            interval: interval.max(Duration::from_secs(1)),
            min_decrease,
            max_decrease,
            floor,
        }
    }

    /// What: Bar fill fraction for `value`, value over initial, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self, value: u32) -> f64 {
        (f64::from(value) / f64::from(self.initial)).clamp(0.0, 1.0)
    }
}

/// Decaying stock state.
#[derive(Clone, Debug)]
pub struct DecayingStock {
    config: StockConfig,
    current: MetricResult<u32>,
    carry: Duration,
}

impl DecayingStock {
    /// What: Start at the configured initial stock.
    #[must_use]
    pub const fn new(config: StockConfig) -> Self {
        Self {
            current: MetricResult::first(config.initial),
            config,
            carry: Duration::ZERO,
        }
    }

    /// What: Resume from a persisted value instead of the initial stock.
    ///
    /// Details:
    /// - The value is clamped into `[floor, initial]`.
    /// - Missing or unparseable values keep the initial stock.
    #[must_use]
    pub fn resume(mut self, persisted: Option<&str>) -> Self {
        if let Some(raw) = persisted {
            match raw.trim().parse::<u32>() {
                Ok(value) => {
                    let value = value.clamp(self.config.floor, self.config.initial);
                    tracing::debug!(value, "[Stock] Resuming persisted stock");
                    self.current = MetricResult::first(value);
                }
                Err(e) => {
                    tracing::debug!(raw, error = %e, "[Stock] Ignoring unreadable persisted stock");
                }
            }
        }
        self
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &StockConfig {
        &self.config
    }

    /// Current displayed stock.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current.value
    }

    /// Current value with trend.
    #[must_use]
    pub const fn result(&self) -> MetricResult<u32> {
        self.current
    }

    /// What: Bar fill fraction, current over initial, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.config.fraction(self.current.value)
    }

    /// What: Advance the simulation by `elapsed`.
    ///
    /// Inputs:
    /// - `elapsed`: Time since the previous call
    /// - `source`: Decrement picker
    ///
    /// Output:
    /// - The new value with its trend
    ///
    /// Details:
    /// - One decrement per full interval; the leftover time carries over.
    /// - The value never goes below the floor.
    pub fn advance(&mut self, elapsed: Duration, source: &mut impl DecrementSource) -> MetricResult<u32> {
        self.carry += elapsed;
        let mut value = self.current.value;
        while self.carry >= self.config.interval {
            self.carry -= self.config.interval;
            let step = source
                .decrement(self.config.min_decrease, self.config.max_decrease)
                .clamp(self.config.min_decrease, self.config.max_decrease);
            value = value.saturating_sub(step).max(self.config.floor);
        }
        self.current = MetricResult::after(Some(&self.current), value);
        self.current
    }
}

/// Ticker that decays the stock, persists it and publishes it.
struct StockTicker<S, R> {
    stock: DecayingStock,
    source: R,
    store: Arc<S>,
    key: String,
    tx: watch::Sender<MetricResult<u32>>,
}

impl<S, R> Tick for StockTicker<S, R>
where
    S: ValueStore + Send + Sync + 'static,
    R: DecrementSource,
{
    async fn tick(&mut self) -> bool {
        let interval = self.stock.config().interval;
        let result = self.stock.advance(interval, &mut self.source);
        if let Err(e) = self.store.write(&self.key, result.value.to_string()).await {
            tracing::warn!(key = %self.key, error = %e, "[Stock] Failed to persist stock");
        }
        self.tx.send_replace(result);
        !self.tx.is_closed()
    }
}

/// What: Resume persisted stock and start decaying it.
///
/// Inputs:
/// - `config`: Stock configuration
/// - `source`: Decrement picker
/// - `store`: Session store; read once on start and written on every decrement
/// - `key`: Store key
///
/// Output:
/// - Timer handle (drop on unmount) and a receiver of stock values
///
/// Details:
/// - The timer stops by itself once every receiver is gone.
pub async fn spawn_stock_decay<S, R>(
    config: StockConfig,
    source: R,
    store: Arc<S>,
    key: &str,
) -> (TimerHandle, watch::Receiver<MetricResult<u32>>)
where
    S: ValueStore + Send + Sync + 'static,
    R: DecrementSource,
{
    let persisted = match store.read(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "[Stock] Failed to read persisted stock");
            None
        }
    };
    let stock = DecayingStock::new(config).resume(persisted.as_deref());
    let (tx, rx) = watch::channel(stock.result());
    let handle = spawn_ticker(
        config.interval,
        StockTicker {
            stock,
            source,
            store,
            key: key.to_string(),
            tx,
        },
    );
    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Trend;

    fn config(initial: u32) -> StockConfig {
        StockConfig::new(initial, Duration::from_secs(45), 1, 3)
    }

    #[test]
    /// What: One decrement per full interval; partial intervals carry over.
    fn advance_by_intervals() {
        let mut stock = DecayingStock::new(config(50));
        let mut source = FixedDecrement(2);
        assert_eq!(stock.advance(Duration::from_secs(30), &mut source).value, 50);
        let result = stock.advance(Duration::from_secs(30), &mut source);
        assert_eq!(result.value, 48);
        assert_eq!(result.trend, Trend::Falling);
        assert_eq!(stock.advance(Duration::from_secs(90), &mut source).value, 44);
    }

    #[test]
    /// What: Stock never drops below the floor and never by more than `max` per interval.
    fn floor_and_step_bounds() {
        let mut stock = DecayingStock::new(config(20));
        let mut source = RandomDecrement;
        let mut last = stock.current();
        for _ in 0..200 {
            let value = stock.advance(Duration::from_secs(45), &mut source).value;
            assert!(value >= STOCK_FLOOR);
            assert!(last - value <= 3);
            last = value;
        }
        assert_eq!(last, STOCK_FLOOR);
    }

    #[test]
    /// What: Misconfigured values are repaired.
    fn config_is_normalised() {
        let config = StockConfig::new(3, Duration::ZERO, 5, 2);
        assert_eq!(config.initial, STOCK_FLOOR);
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!((config.min_decrease, config.max_decrease), (2, 5));
    }

    #[test]
    /// What: Resume clamps persisted values into `[floor, initial]`.
    fn resume_clamps() {
        assert_eq!(DecayingStock::new(config(50)).resume(Some("31")).current(), 31);
        assert_eq!(DecayingStock::new(config(50)).resume(Some("2")).current(), STOCK_FLOOR);
        assert_eq!(DecayingStock::new(config(50)).resume(Some("900")).current(), 50);
        assert_eq!(DecayingStock::new(config(50)).resume(Some("x")).current(), 50);
        assert_eq!(DecayingStock::new(config(50)).resume(None).current(), 50);
    }

    #[test]
    fn fraction_of_initial() {
        let stock = DecayingStock::new(config(40)).resume(Some("10"));
        assert!((stock.fraction() - 0.25).abs() < f64::EPSILON);
    }
}
