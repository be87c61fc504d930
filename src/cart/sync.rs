//! Per-item cart membership state machine.
//!
//! A [`SyncUnit`] tracks one candidate variant for one mounted block. The
//! host owns the cart; the unit only reads snapshots and emits at most one
//! [`PendingMutation`] at a time. Callers deliver the mutation to the cart
//! service and report the outcome back with the same ticket.
//!
//! ```text
//!            toggle (needs change)           result Ok
//!   Idle ─────────────────────────▶ Mutating ─────────▶ Idle
//!    ▲                                  │
//!    │ snapshot / toggle                │ result Err (rollback)
//!    └──────────────── Error ◀──────────┘
//! ```

use super::mutation::{CartMutation, LineAttribute, PendingMutation};
use super::snapshot::CartSnapshot;
use crate::sources::SourceError;

/// Lifecycle phase of a [`SyncUnit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No mutation in flight.
    Idle,
    /// One mutation in flight; further intents are coalesced.
    Mutating,
    /// The last mutation failed and was rolled back. Behaves like `Idle`
    /// and leaves on the next snapshot or intent.
    Error,
}

/// What the unit does on its first snapshot after mount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitialPolicy {
    /// Mirror the cart: the toggle starts at the observed membership.
    #[default]
    MirrorCart,
    /// Add the item once when it is absent on the first snapshot.
    EnsurePresent,
}

/// Snapshot of a unit's state for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncView {
    /// Candidate variant.
    pub candidate: String,
    /// Toggle state to display.
    pub checked: bool,
    /// Membership in the latest cart snapshot.
    pub observed: bool,
    /// Current phase.
    pub phase: Phase,
    /// Message of the last rolled back mutation.
    pub last_error: Option<String>,
    /// Number of intents recorded so far; grows by one per press.
    pub intents: u64,
}

impl SyncView {
    /// Whether a mutation is in flight (spinner state).
    #[must_use]
    pub fn busy(&self) -> bool {
        self.phase == Phase::Mutating
    }
}

/// Desired-versus-observed cart membership for one candidate variant.
#[derive(Clone, Debug)]
pub struct SyncUnit {
    candidate: String,
    policy: InitialPolicy,
    add_quantity: u32,
    attributes: Vec<LineAttribute>,
    desired: bool,
    observed: bool,
    phase: Phase,
    snapshot: Option<CartSnapshot>,
    reconciled: bool,
    auto_add_issued: bool,
    /// Membership implied by the last successful mutation, until a snapshot confirms it.
    expected: Option<bool>,
    /// An intent arrived that could not be evaluated yet.
    queued: bool,
    in_flight: Option<PendingMutation>,
    next_ticket: u64,
    last_error: Option<String>,
    intents: u64,
}

impl SyncUnit {
    /// What: Create a unit for `candidate` (a variant global identifier).
    ///
    /// Details:
    /// - Nothing is known about the cart until [`Self::observe`] is called.
    #[must_use]
    pub fn new(candidate: impl Into<String>, policy: InitialPolicy) -> Self {
        Self {
            candidate: candidate.into(),
            policy,
            add_quantity: 1,
            attributes: Vec::new(),
            desired: false,
            observed: false,
            phase: Phase::Idle,
            snapshot: None,
            reconciled: false,
            auto_add_issued: false,
            expected: None,
            queued: false,
            in_flight: None,
            next_ticket: 0,
            last_error: None,
            intents: 0,
        }
    }

    /// What: Attach line attributes to every add this unit issues.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<LineAttribute>) -> Self {
        self.attributes = attributes;
        self
    }

    /// What: Units added per add intent (default 1, minimum 1).
    #[must_use]
    pub fn with_add_quantity(mut self, quantity: u32) -> Self {
        self.add_quantity = quantity.max(1);
        self
    }

    /// Candidate variant identifier.
    #[must_use]
    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    /// Desired membership (what the toggle shows).
    #[must_use]
    pub const fn desired(&self) -> bool {
        self.desired
    }

    /// Membership derived from the latest snapshot.
    #[must_use]
    pub const fn observed(&self) -> bool {
        self.observed
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the first snapshot has been seen.
    #[must_use]
    pub const fn reconciled(&self) -> bool {
        self.reconciled
    }

    /// Mutation currently awaiting its result.
    #[must_use]
    pub fn in_flight(&self) -> Option<&PendingMutation> {
        self.in_flight.as_ref()
    }

    /// Message of the last rolled back mutation.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// What: Presentation snapshot of this unit.
    #[must_use]
    pub fn view(&self) -> SyncView {
        SyncView {
            candidate: self.candidate.clone(),
            checked: self.desired,
            observed: self.observed,
            phase: self.phase,
            last_error: self.last_error.clone(),
            intents: self.intents,
        }
    }

    /// What: Feed a new authoritative cart snapshot.
    ///
    /// Inputs:
    /// - `snapshot`: Latest cart pushed by the host
    ///
    /// Output:
    /// - A mutation to issue, when the snapshot unblocks a queued intent or the
    ///   initial policy requires an add
    ///
    /// Details:
    /// - `observed` is always re-derived here and nowhere else.
    /// - First snapshot: the toggle mirrors the cart; `EnsurePresent` may add once.
    /// - While idle, the toggle follows external cart changes.
    /// - While mutating, only `observed` moves; the result decides what happens next.
    /// - A queued removal keeps waiting while the cart still lags behind an
    ///   accepted add.
    pub fn observe(&mut self, snapshot: &CartSnapshot) -> Option<PendingMutation> {
        self.observed = snapshot.contains(&self.candidate);
        self.snapshot = Some(snapshot.clone());
        let awaiting_line = self.queued && self.expected.is_some_and(|e| e != self.observed);
        if !awaiting_line {
            self.expected = None;
        }

        if self.phase == Phase::Mutating {
            return None;
        }
        self.phase = Phase::Idle;

        if !self.reconciled {
            self.reconciled = true;
            return self.reconcile_initial();
        }
        if self.queued {
            self.queued = false;
            return self.drive();
        }
        if self.desired != self.observed {
            tracing::debug!(
                merchandise_id = %self.candidate,
                observed = self.observed,
                "[CartSync] Cart changed externally; following cart"
            );
        }
        self.desired = self.observed;
        None
    }

    /// What: Flip the desired membership (checkbox press).
    ///
    /// Output:
    /// - The mutation to issue, or `None` when nothing needs to change or a
    ///   mutation is already in flight
    pub fn toggle(&mut self) -> Option<PendingMutation> {
        self.set_desired(!self.desired)
    }

    /// What: Record an explicit user intent (add button, remove link, toggle).
    ///
    /// Details:
    /// - The displayed state changes immediately.
    /// - While a mutation is in flight the latest intent wins and is evaluated
    ///   once the result arrives; no overlapping requests are issued.
    /// - Before the first snapshot the intent waits for that snapshot.
    pub fn set_desired(&mut self, desired: bool) -> Option<PendingMutation> {
        self.desired = desired;
        self.last_error = None;
        self.intents += 1;
        if self.phase == Phase::Mutating || !self.reconciled {
            self.queued = true;
            return None;
        }
        self.phase = Phase::Idle;
        self.queued = false;
        self.drive()
    }

    /// What: Report the outcome of a mutation issued by this unit.
    ///
    /// Inputs:
    /// - `ticket`: Ticket from the [`PendingMutation`]
    /// - `result`: Cart service outcome
    ///
    /// Output:
    /// - A follow-up mutation when coalesced intents net out to a change
    ///
    /// Details:
    /// - Results for unknown or superseded tickets are ignored.
    /// - Success does not touch `observed`; the next snapshot is the source of truth.
    /// - Failure rolls the toggle back to the membership of the latest snapshot,
    ///   forgets what earlier accepted mutations implied and drops any
    ///   coalesced intent; the user may retry.
    pub fn on_mutation_result(
        &mut self,
        ticket: u64,
        result: Result<(), SourceError>,
    ) -> Option<PendingMutation> {
        let Some(done) = self.in_flight.take_if(|p| p.ticket == ticket) else {
            tracing::debug!(
                merchandise_id = %self.candidate,
                ticket,
                "[CartSync] Ignoring result for superseded mutation"
            );
            return None;
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    merchandise_id = %self.candidate,
                    kind = done.mutation.kind(),
                    "[CartSync] Mutation accepted"
                );
                self.phase = Phase::Idle;
                self.expected = Some(done.mutation.implies_presence());
                if self.queued {
                    self.queued = false;
                    return self.drive();
                }
                None
            }
            Err(e) => {
                let present = self.observed;
                self.expected = None;
                tracing::warn!(
                    merchandise_id = %self.candidate,
                    kind = done.mutation.kind(),
                    error = %e,
                    rollback_to = present,
                    "[CartSync] Mutation rejected; rolling back toggle"
                );
                self.phase = Phase::Error;
                self.queued = false;
                self.desired = present;
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    /// What: Point the unit at a different variant (variant selector change).
    ///
    /// Details:
    /// - Membership is re-derived for the new variant from the last snapshot.
    /// - Any in-flight mutation for the previous variant is forgotten; its
    ///   result will be ignored.
    pub fn retarget(&mut self, candidate: &str) {
        if self.candidate == candidate {
            return;
        }
        tracing::debug!(
            from = %self.candidate,
            to = candidate,
            "[CartSync] Retargeting unit"
        );
        self.candidate = candidate.to_string();
        self.in_flight = None;
        self.queued = false;
        self.expected = None;
        self.last_error = None;
        self.phase = Phase::Idle;
        self.observed = self
            .snapshot
            .as_ref()
            .is_some_and(|s| s.contains(&self.candidate));
        self.desired = self.observed;
    }

    fn reconcile_initial(&mut self) -> Option<PendingMutation> {
        if self.queued {
            self.queued = false;
            return self.drive();
        }
        self.desired = self.observed;
        if self.policy == InitialPolicy::EnsurePresent && !self.observed && !self.auto_add_issued {
            self.auto_add_issued = true;
            self.desired = true;
            tracing::info!(
                merchandise_id = %self.candidate,
                "[CartSync] Ensuring item is present on mount"
            );
            return self.drive();
        }
        None
    }

    /// What: Issue the mutation that moves the cart toward `desired`.
    ///
    /// Details:
    /// - Membership is the expected result of the last accepted mutation when
    ///   no snapshot has confirmed it yet, otherwise the observed one.
    /// - A removal whose line is not visible yet waits for the next snapshot;
    ///   a removal whose line is gone is a no-op.
    fn drive(&mut self) -> Option<PendingMutation> {
        let present = self.expected.unwrap_or(self.observed);
        let mutation = match (self.desired, present) {
            (true, false) => CartMutation::AddLine {
                merchandise_id: self.candidate.clone(),
                quantity: self.add_quantity,
                attributes: self.attributes.clone(),
            },
            (false, true) => {
                let line = self
                    .snapshot
                    .as_ref()
                    .and_then(|s| s.find(&self.candidate));
                match line {
                    Some(line) => CartMutation::RemoveLine {
                        id: line.id.clone(),
                        quantity: line.quantity,
                    },
                    None if self.expected == Some(true) => {
                        self.queued = true;
                        return None;
                    }
                    None => {
                        tracing::debug!(
                            merchandise_id = %self.candidate,
                            "[CartSync] Remove requested for a line that is gone"
                        );
                        return None;
                    }
                }
            }
            _ => return None,
        };

        self.next_ticket += 1;
        let pending = PendingMutation {
            ticket: self.next_ticket,
            mutation,
        };
        tracing::info!(
            merchandise_id = %self.candidate,
            kind = pending.mutation.kind(),
            ticket = pending.ticket,
            "[CartSync] Issuing cart mutation"
        );
        self.phase = Phase::Mutating;
        self.in_flight = Some(pending.clone());
        Some(pending)
    }
}
