//! Recurring timers bound to a widget's lifetime.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Work performed on every timer tick.
pub trait Tick: Send + 'static {
    /// What: Run one tick.
    ///
    /// Output:
    /// - `false` to stop the timer
    fn tick(&mut self) -> impl Future<Output = bool> + Send;
}

/// Owner of a running timer. Dropping it stops the timer.
#[derive(Debug)]
pub struct TimerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// What: Stop the timer and wait for the task to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether the timer task has ended (stopped or finished on its own).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// What: Run `ticker` every `period` until it asks to stop or the handle is dropped.
///
/// Details:
/// - The first tick happens one full period after spawning.
/// - Late ticks are delayed rather than bunched up.
/// - A zero period is raised to one millisecond.
pub fn spawn_ticker<T: Tick>(period: Duration, mut ticker: T) -> TimerHandle {
    let period = period.max(Duration::from_millis(1));
    let (tx, mut rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut rx => break,
                _ = interval.tick() => {
                    if !ticker.tick().await {
                        break;
                    }
                }
            }
        }
        tracing::trace!("[Timer] Ticker stopped");
    });
    TimerHandle {
        shutdown: Some(tx),
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        hits: Arc<AtomicUsize>,
        limit: usize,
    }

    impl Tick for Counter {
        async fn tick(&mut self) -> bool {
            self.hits.fetch_add(1, Ordering::SeqCst) + 1 < self.limit
        }
    }

    #[tokio::test(start_paused = true)]
    /// What: The ticker stops itself when `tick` returns `false`.
    async fn ticker_stops_on_false() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handle = spawn_ticker(
            Duration::from_secs(1),
            Counter {
                hits: Arc::clone(&hits),
                limit: 3,
            },
        );
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    /// What: Dropping the handle releases the timer.
    async fn drop_stops_ticker() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handle = spawn_ticker(
            Duration::from_secs(1),
            Counter {
                hits: Arc::clone(&hits),
                limit: usize::MAX,
            },
        );
        tokio::time::sleep(Duration::from_millis(2500)).await;
        drop(handle);
        let seen = hits.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(hits.load(Ordering::SeqCst), seen);
        assert_eq!(seen, 2);
    }
}
