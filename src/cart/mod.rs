//! Cart snapshot projection and cart-line synchronization.
//!
//! The host owns the cart. Blocks only read [`CartSnapshot`]s and request
//! changes as [`CartMutation`]s through a [`SyncUnit`], which keeps the
//! displayed toggle consistent with real cart membership.

mod list;
mod mutation;
mod snapshot;
mod sync;
mod worker;

pub use list::{UpsellSlot, UpsellSlots};
pub use mutation::{CartMutation, LineAttribute, PendingMutation};
pub use snapshot::{CartLine, CartSnapshot};
pub use sync::{InitialPolicy, Phase, SyncUnit, SyncView};
pub use worker::{SyncEvent, SyncHandle, spawn_sync_worker};
