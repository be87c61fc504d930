//! Cart mutation intents.

use serde::{Deserialize, Serialize};

/// Line attribute attached to an added line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAttribute {
    /// Attribute key (e.g. `_maisonUpsell`).
    pub key: String,
    /// Attribute value.
    pub value: String,
}

/// A single change request for the host cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartMutation {
    /// Add `quantity` units of a variant as a new line.
    AddLine {
        /// Variant global identifier.
        merchandise_id: String,
        /// Units to add.
        quantity: u32,
        /// Line attributes to attach.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<LineAttribute>,
    },
    /// Remove `quantity` units from an existing line.
    RemoveLine {
        /// Host line identifier.
        id: String,
        /// Units to remove (the full line quantity for a toggle-off).
        quantity: u32,
    },
}

impl CartMutation {
    /// What: Cart membership this mutation is expected to produce.
    #[must_use]
    pub const fn implies_presence(&self) -> bool {
        matches!(self, Self::AddLine { .. })
    }

    /// What: Short verb for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddLine { .. } => "add",
            Self::RemoveLine { .. } => "remove",
        }
    }
}

/// A mutation issued by a sync unit, tagged with the ticket its result must carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMutation {
    /// Ticket identifying this request to [`crate::cart::SyncUnit::on_mutation_result`].
    pub ticket: u64,
    /// The change to apply.
    pub mutation: CartMutation,
}
