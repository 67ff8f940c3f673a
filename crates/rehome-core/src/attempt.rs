//! Adoption attempts and their lifecycle.
//!
//! At most one attempt exists per catalog item. The coordinator owns the
//! only mutable copy; everything callers receive is a snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  address::{Address, TxHash},
  catalog::ItemId,
};

/// Lifecycle state of an adoption attempt.
///
/// Transitions move forward one step at a time:
///
/// ```text
/// Idle → Submitting → AwaitingConfirmation → Confirmed
///              │                 │
///              └────────────► Failed
/// ```
///
/// Confirmed is terminal. Failed is terminal until the slot is replaced by
/// an explicit new request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
  Idle,
  Submitting,
  AwaitingConfirmation,
  Confirmed,
  Failed,
}

impl AttemptState {
  /// True while the attempt holds the item's submission slot.
  pub fn in_flight(&self) -> bool {
    matches!(self, Self::Submitting | Self::AwaitingConfirmation)
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Confirmed | Self::Failed)
  }

  /// Whether moving to `next` is a legal single-step transition.
  pub fn can_transition_to(&self, next: AttemptState) -> bool {
    use AttemptState::*;
    matches!(
      (self, next),
      (Idle, Submitting)
        | (Submitting, AwaitingConfirmation)
        | (Submitting, Failed)
        | (AwaitingConfirmation, Confirmed)
        | (AwaitingConfirmation, Failed)
    )
  }
}

/// The coordinator's bookkeeping for one item's adoption attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionAttempt {
  pub attempt_id:   Uuid,
  pub item_id:      ItemId,
  pub state:        AttemptState,
  /// Account the adoption was submitted from, set once selection succeeds.
  pub submitted_by: Option<Address>,
  /// Ledger acknowledgment hash, set on entry to AwaitingConfirmation.
  pub tx_hash:      Option<TxHash>,
  /// Human-readable cause recorded when the attempt fails.
  pub last_error:   Option<String>,
  pub updated_at:   DateTime<Utc>,
}

impl AdoptionAttempt {
  /// A fresh attempt in `Idle`. Each retry gets a new `attempt_id`.
  pub fn new(item_id: ItemId) -> Self {
    Self {
      attempt_id: Uuid::new_v4(),
      item_id,
      state: AttemptState::Idle,
      submitted_by: None,
      tx_hash: None,
      last_error: None,
      updated_at: Utc::now(),
    }
  }

  /// Step the state machine. Transitions are only ever driven by the
  /// coordinator, which checks guards first; an illegal step here is a bug.
  pub fn transition(&mut self, next: AttemptState) {
    debug_assert!(
      self.state.can_transition_to(next),
      "illegal attempt transition {:?} → {:?}",
      self.state,
      next
    );
    self.state = next;
    self.updated_at = Utc::now();
  }

  /// Record a failure cause and move to `Failed`.
  pub fn fail(&mut self, reason: impl Into<String>) {
    self.last_error = Some(reason.into());
    self.transition(AttemptState::Failed);
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn forward_steps_are_legal() {
    use AttemptState::*;
    assert!(Idle.can_transition_to(Submitting));
    assert!(Submitting.can_transition_to(AwaitingConfirmation));
    assert!(Submitting.can_transition_to(Failed));
    assert!(AwaitingConfirmation.can_transition_to(Confirmed));
    assert!(AwaitingConfirmation.can_transition_to(Failed));
  }

  #[test]
  fn skipping_and_reversing_are_illegal() {
    use AttemptState::*;
    assert!(!Idle.can_transition_to(AwaitingConfirmation));
    assert!(!Idle.can_transition_to(Confirmed));
    assert!(!Submitting.can_transition_to(Confirmed));
    assert!(!Confirmed.can_transition_to(Failed));
    assert!(!Confirmed.can_transition_to(Submitting));
    assert!(!Failed.can_transition_to(Confirmed));
    assert!(!AwaitingConfirmation.can_transition_to(Submitting));
  }

  #[test]
  fn in_flight_covers_the_submission_window() {
    use AttemptState::*;
    assert!(!Idle.in_flight());
    assert!(Submitting.in_flight());
    assert!(AwaitingConfirmation.in_flight());
    assert!(!Confirmed.in_flight());
    assert!(!Failed.in_flight());
  }

  #[test]
  fn fail_records_the_cause() {
    let mut attempt = AdoptionAttempt::new(3);
    attempt.transition(AttemptState::Submitting);
    attempt.fail("out of treats");
    assert_eq!(attempt.state, AttemptState::Failed);
    assert_eq!(attempt.last_error.as_deref(), Some("out of treats"));
  }

  #[test]
  fn retries_get_fresh_identities() {
    let first = AdoptionAttempt::new(1);
    let second = AdoptionAttempt::new(1);
    assert_ne!(first.attempt_id, second.attempt_id);
  }

  #[test]
  fn state_serde_uses_snake_case() {
    let json = serde_json::to_string(&AttemptState::AwaitingConfirmation)
      .unwrap();
    assert_eq!(json, "\"awaiting_confirmation\"");
  }
}
