//! Ownership records: the reconciled view of the contract's owner table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{address::Address, catalog::ItemId};

/// A full snapshot of the contract ownership table, keyed by item id.
///
/// Records are value objects: a reconciliation pass produces a fresh record
/// that replaces the previous one wholesale, and nothing mutates a record
/// after construction. Two reads with no intervening adoption decode to
/// equal records, which makes reconciliation idempotence checkable as plain
/// equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
  owners: BTreeMap<ItemId, Address>,
}

impl OwnershipRecord {
  /// Build a record from a positional owner table; index `i` becomes item
  /// id `i`. This is the shape ledger backends decode.
  pub fn from_table(owners: Vec<Address>) -> Self {
    Self {
      owners: owners
        .into_iter()
        .enumerate()
        .map(|(i, owner)| (i as ItemId, owner))
        .collect(),
    }
  }

  pub fn from_entries(
    entries: impl IntoIterator<Item = (ItemId, Address)>,
  ) -> Self {
    Self {
      owners: entries.into_iter().collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.owners.len()
  }

  pub fn is_empty(&self) -> bool {
    self.owners.is_empty()
  }

  /// The recorded owner, if this record covers the id. The sentinel is
  /// returned as-is; use [`OwnershipRecord::is_owned`] to skip it.
  pub fn owner_of(&self, id: ItemId) -> Option<Address> {
    self.owners.get(&id).copied()
  }

  /// True when the id has a real (non-sentinel) owner.
  pub fn is_owned(&self, id: ItemId) -> bool {
    self
      .owner_of(id)
      .map(|owner| !owner.is_zero())
      .unwrap_or(false)
  }

  /// Entries in ascending id order.
  pub fn iter(&self) -> impl Iterator<Item = (ItemId, Address)> + '_ {
    self.owners.iter().map(|(id, owner)| (*id, *owner))
  }

  /// True when the record covers exactly the ids `0..n`.
  pub fn covers(&self, n: usize) -> bool {
    self.owners.len() == n && self.owners.keys().copied().eq(0..n as ItemId)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
