//! Order reservation countdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::timer::{Tick, TimerHandle, spawn_ticker};
use crate::sources::ValueStore;
use crate::template::TemplateBindings;

/// Store key for the remaining reservation time.
pub const RESERVATION_KEY: &str = "order-reservation-time";

/// Reservation length when nothing usable is persisted.
pub const DEFAULT_RESERVATION_SECS: i64 = 600;

/// Text shown once the reservation ran out.
pub const DEFAULT_EXPIRED_TEXT: &str = "YOUR ORDER RESERVATION ENDED";

/// Remaining reservation time in seconds. Negative means expired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReservationCountdown {
    remaining: i64,
}

impl Default for ReservationCountdown {
    fn default() -> Self {
        Self {
            remaining: DEFAULT_RESERVATION_SECS,
        }
    }
}

impl ReservationCountdown {
    /// What: Resume from a persisted value.
    ///
    /// Details:
    /// - Values `<= 0` restart the reservation; a finished reservation is
    ///   never shown as expired on reload.
    /// - Missing or unparseable values start fresh.
    #[must_use]
    pub fn from_persisted(persisted: Option<&str>) -> Self {
        let remaining = persisted
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_RESERVATION_SECS);
        Self { remaining }
    }

    /// Remaining seconds.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Whether the reservation ran out.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining < 0
    }

    /// What: Count down one second.
    pub const fn tick(&mut self) -> i64 {
        self.remaining -= 1;
        self.remaining
    }
}

/// What: Format the banner text for a remaining time.
///
/// Inputs:
/// - `remaining`: Seconds left (negative once expired)
/// - `countdown`: Resolved countdown text
/// - `expired`: Resolved expired text
///
/// Output:
/// - `expired` for negative values
/// - `countdown` with `{min}` and `{sec}` substituted when it has both,
///   otherwise `"<countdown> M:SS"`
#[must_use]
pub fn countdown_text(remaining: i64, countdown: &str, expired: &str) -> String {
    if remaining < 0 {
        return expired.to_string();
    }
    let minutes = remaining / 60;
    let seconds = format!("{:02}", remaining % 60);
    if countdown.contains("{min}") && countdown.contains("{sec}") {
        TemplateBindings::new()
            .with("min", minutes.to_string())
            .with("sec", seconds)
            .apply(countdown)
    } else {
        format!("{countdown} {minutes}:{seconds}")
    }
}

/// Ticker that counts down, persists and publishes.
struct CountdownTicker<S> {
    countdown: ReservationCountdown,
    store: Arc<S>,
    tx: watch::Sender<ReservationCountdown>,
}

impl<S> Tick for CountdownTicker<S>
where
    S: ValueStore + Send + Sync + 'static,
{
    async fn tick(&mut self) -> bool {
        let remaining = self.countdown.tick();
        if let Err(e) = self.store.write(RESERVATION_KEY, remaining.to_string()).await {
            tracing::warn!(error = %e, "[Countdown] Failed to persist reservation time");
        }
        self.tx.send_replace(self.countdown);
        if self.countdown.is_expired() {
            tracing::info!("[Countdown] Order reservation ended");
            return false;
        }
        !self.tx.is_closed()
    }
}

/// What: Resume the persisted reservation and tick it once per second.
///
/// Output:
/// - Timer handle and a receiver of countdown states
///
/// Details:
/// - The timer stops after the first expired tick, or when every receiver is gone.
pub async fn spawn_countdown<S>(store: Arc<S>) -> (TimerHandle, watch::Receiver<ReservationCountdown>)
where
    S: ValueStore + Send + Sync + 'static,
{
    let persisted = match store.read(RESERVATION_KEY).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "[Countdown] Failed to read reservation time");
            None
        }
    };
    let countdown = ReservationCountdown::from_persisted(persisted.as_deref());
    tracing::debug!(remaining = countdown.remaining(), "[Countdown] Reservation resumed");
    let (tx, rx) = watch::channel(countdown);
    let handle = spawn_ticker(
        Duration::from_secs(1),
        CountdownTicker {
            countdown,
            store,
            tx,
        },
    );
    (handle, rx)
}
