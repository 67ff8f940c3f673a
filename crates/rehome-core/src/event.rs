//! Ownership change events emitted by reconciliation.

use serde::{Deserialize, Serialize};

use crate::{address::Address, catalog::ItemId};

/// A change in recorded ownership between two reconciliation passes.
///
/// Adoption (sentinel → real owner) is the only transition the system
/// itself produces. Anything else the ledger shows is surfaced as an
/// anomaly instead of being folded silently into the catalog view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OwnershipEvent {
  /// The item moved from unowned to a real owner.
  Adopted { item_id: ItemId, owner: Address },

  /// The item's owner was cleared or replaced. Exactly one event is
  /// emitted per changed id per pass.
  AnomalousChange {
    item_id:  ItemId,
    previous: Address,
    current:  Address,
  },
}

impl OwnershipEvent {
  pub fn item_id(&self) -> ItemId {
    match self {
      Self::Adopted { item_id, .. }
      | Self::AnomalousChange { item_id, .. } => *item_id,
    }
  }

  pub fn is_anomalous(&self) -> bool {
    matches!(self, Self::AnomalousChange { .. })
  }
}
