//! Async driver that connects a [`SyncUnit`] to the host.
//!
//! The worker owns the unit and serialises everything that touches it: cart
//! snapshots from the host, user intents from the block and mutation results
//! from the cart service. Each event runs to completion before the next one
//! is handled.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::mutation::PendingMutation;
use super::snapshot::CartSnapshot;
use super::sync::{SyncUnit, SyncView};
use crate::sources::{CartMutator, SourceError};

/// User intent delivered to a sync worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncEvent {
    /// Checkbox pressed.
    Toggle,
    /// Explicit add (`true`) or remove (`false`).
    SetDesired(bool),
    /// Variant selector changed.
    Retarget(String),
}

/// Handle held by the mounted block. Dropping it stops the worker.
#[derive(Debug)]
pub struct SyncHandle {
    events: mpsc::UnboundedSender<SyncEvent>,
    view: watch::Receiver<SyncView>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// What: Send an intent to the worker.
    ///
    /// Output:
    /// - `false` when the worker has stopped
    pub fn send(&self, event: SyncEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// What: Shorthand for [`SyncEvent::Toggle`].
    pub fn toggle(&self) -> bool {
        self.send(SyncEvent::Toggle)
    }

    /// Latest published view.
    #[must_use]
    pub fn view(&self) -> SyncView {
        self.view.borrow().clone()
    }

    /// What: Additional receiver for view updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncView> {
        self.view.clone()
    }

    /// What: Wait until the published view satisfies `predicate`.
    ///
    /// Output:
    /// - The matching view, or `None` when the worker stopped first
    pub async fn wait_for(&mut self, predicate: impl FnMut(&SyncView) -> bool) -> Option<SyncView> {
        self.view.wait_for(predicate).await.ok().map(|v| v.clone())
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// What: Spawn the worker driving `unit`.
///
/// Inputs:
/// - `unit`: Freshly mounted unit
/// - `mutator`: Cart mutation service
/// - `snapshots`: Host cart feed; its current value is the first snapshot
///
/// Output:
/// - Handle for intents and view updates
///
/// Details:
/// - Mutations run in their own tasks so snapshots and intents keep flowing
///   while one is in flight; the unit guarantees only one is ever issued.
/// - The worker ends when the handle is dropped or the snapshot feed closes.
pub fn spawn_sync_worker<M>(
    unit: SyncUnit,
    mutator: Arc<M>,
    mut snapshots: watch::Receiver<CartSnapshot>,
) -> SyncHandle
where
    M: CartMutator + Send + Sync + 'static,
{
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<SyncEvent>();
    let (view_tx, view_rx) = watch::channel(unit.view());

    let task = tokio::spawn(async move {
        let mut unit = unit;
        let (results_tx, mut results_rx) =
            mpsc::unbounded_channel::<(u64, Result<(), SourceError>)>();
        tracing::debug!(merchandise_id = %unit.candidate(), "[CartSync] Worker started");

        let initial = snapshots.borrow_and_update().clone();
        let pending = unit.observe(&initial);
        dispatch(pending, &mutator, &results_tx);
        publish(&view_tx, &unit);

        loop {
            let pending = tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    unit.observe(&snapshot)
                }
                event = events_rx.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    match event {
                        SyncEvent::Toggle => unit.toggle(),
                        SyncEvent::SetDesired(desired) => unit.set_desired(desired),
                        SyncEvent::Retarget(candidate) => {
                            unit.retarget(&candidate);
                            None
                        }
                    }
                }
                Some((ticket, result)) = results_rx.recv() => {
                    unit.on_mutation_result(ticket, result)
                }
            };
            dispatch(pending, &mutator, &results_tx);
            publish(&view_tx, &unit);
        }
        tracing::debug!(merchandise_id = %unit.candidate(), "[CartSync] Worker stopped");
    });

    SyncHandle {
        events: events_tx,
        view: view_rx,
        task,
    }
}

/// What: Run a mutation in its own task and route the result back.
fn dispatch<M>(
    pending: Option<PendingMutation>,
    mutator: &Arc<M>,
    results: &mpsc::UnboundedSender<(u64, Result<(), SourceError>)>,
) where
    M: CartMutator + Send + Sync + 'static,
{
    let Some(PendingMutation { ticket, mutation }) = pending else {
        return;
    };
    let mutator = Arc::clone(mutator);
    let results = results.clone();
    tokio::spawn(async move {
        let result = mutator.apply(mutation).await;
        let _ = results.send((ticket, result));
    });
}

/// What: Publish the unit's view when it changed.
fn publish(view: &watch::Sender<SyncView>, unit: &SyncUnit) {
    let next = unit.view();
    view.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
