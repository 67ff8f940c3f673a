//! Ownership delta computation: previous record × current record → events.
//!
//! Adoption is the only legitimate ownership transition (unowned → owned).
//! Everything else the ledger can show us, an owner vanishing or an owner
//! replaced by a different one, is reported as an anomaly rather than being
//! re-rendered as if it were a fresh adoption.

use rehome_core::{
  address::Address, event::OwnershipEvent, record::OwnershipRecord,
};

/// Compute the ownership events that transition `previous` into `current`.
///
/// Exactly one event is produced per changed id; unchanged ids produce
/// nothing. Ids absent from `previous` are treated as previously unowned,
/// so the first pass after startup (diffed against the empty record)
/// reports every owned item as adopted. Both records are read-only; calling
/// this twice with the same inputs yields the same events.
pub fn diff(
  previous: &OwnershipRecord,
  current: &OwnershipRecord,
) -> Vec<OwnershipEvent> {
  let mut events = Vec::new();

  for (item_id, owner) in current.iter() {
    let before = previous.owner_of(item_id).unwrap_or(Address::ZERO);
    if before == owner {
      continue;
    }
    if before.is_zero() && !owner.is_zero() {
      events.push(OwnershipEvent::Adopted { item_id, owner });
    } else {
      // Owner cleared or replaced. Adoption cannot do either.
      events.push(OwnershipEvent::AnomalousChange {
        item_id,
        previous: before,
        current: owner,
      });
    }
  }

  events
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use rehome_core::catalog::ItemId;

  use super::*;

  fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address(bytes)
  }

  fn record(entries: &[(ItemId, Address)]) -> OwnershipRecord {
    OwnershipRecord::from_entries(entries.iter().copied())
  }

  #[test]
  fn equal_records_emit_nothing() {
    let current = record(&[(0, Address::ZERO), (1, addr(5))]);
    assert!(diff(&current.clone(), &current).is_empty());
  }

  #[test]
  fn fresh_adoption_emits_one_event() {
    let previous = record(&[(0, Address::ZERO), (1, Address::ZERO)]);
    let current = record(&[(0, Address::ZERO), (1, addr(5))]);

    let events = diff(&previous, &current);
    assert_eq!(
      events,
      vec![OwnershipEvent::Adopted {
        item_id: 1,
        owner:   addr(5),
      }]
    );
  }

  #[test]
  fn first_pass_reports_every_owned_item() {
    let current = record(&[(0, addr(1)), (1, Address::ZERO), (2, addr(2))]);
    let events = diff(&OwnershipRecord::default(), &current);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| !e.is_anomalous()));
  }

  #[test]
  fn owner_replaced_is_anomalous() {
    let previous = record(&[(0, addr(1))]);
    let current = record(&[(0, addr(2))]);

    let events = diff(&previous, &current);
    assert_eq!(
      events,
      vec![OwnershipEvent::AnomalousChange {
        item_id:  0,
        previous: addr(1),
        current:  addr(2),
      }]
    );
  }

  #[test]
  fn owner_cleared_is_anomalous() {
    let previous = record(&[(0, addr(1))]);
    let current = record(&[(0, Address::ZERO)]);

    let events = diff(&previous, &current);
    assert_eq!(events.len(), 1);
    assert!(events[0].is_anomalous());
  }

  #[test]
  fn one_event_per_changed_id() {
    let previous = record(&[
      (0, Address::ZERO),
      (1, addr(1)),
      (2, addr(2)),
      (3, Address::ZERO),
    ]);
    let current = record(&[
      (0, addr(9)),         // adoption
      (1, addr(1)),         // unchanged
      (2, Address::ZERO),   // cleared
      (3, Address::ZERO),   // unchanged
    ]);

    let events = diff(&previous, &current);
    let ids: Vec<ItemId> = events.iter().map(|e| e.item_id()).collect();
    assert_eq!(ids, vec![0, 2]);
  }

  /// A monotone sequence of adoptions yields exactly one Adopted event per
  /// item over the whole run.
  #[test]
  fn monotone_sequence_is_exactly_once() {
    let steps = [
      record(&[(0, Address::ZERO), (1, Address::ZERO), (2, Address::ZERO)]),
      record(&[(0, addr(1)), (1, Address::ZERO), (2, Address::ZERO)]),
      record(&[(0, addr(1)), (1, Address::ZERO), (2, addr(2))]),
      record(&[(0, addr(1)), (1, addr(3)), (2, addr(2))]),
    ];

    let mut seen: Vec<ItemId> = Vec::new();
    let mut previous = OwnershipRecord::default();
    for current in steps {
      for event in diff(&previous, &current) {
        match event {
          OwnershipEvent::Adopted { item_id, .. } => seen.push(item_id),
          OwnershipEvent::AnomalousChange { .. } => {
            panic!("monotone run produced an anomaly")
          }
        }
      }
      previous = current;
    }

    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2]);
  }
}
