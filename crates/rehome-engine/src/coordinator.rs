//! The adoption coordinator: attempt lifecycle, submission, confirmation.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use rehome_core::{
  address::Address,
  attempt::{AdoptionAttempt, AttemptState},
  catalog::{Catalog, ItemId},
  error::{Error, Result},
  event::OwnershipEvent,
  ledger::{LedgerClient, OwnershipContract},
  record::OwnershipRecord,
  view::CatalogView,
};
use tokio::sync::Mutex;

use crate::{diff::diff, reconcile::Reconciler};

/// Coordinator tunables.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
  /// How long a submitted transaction may sit unconfirmed before
  /// [`Coordinator::request_adoption`] gives up waiting. The attempt itself
  /// stays in AwaitingConfirmation; a later reconciliation pass settles it.
  pub confirmation_timeout: Duration,
}

impl Default for CoordinatorConfig {
  fn default() -> Self {
    Self {
      confirmation_timeout: Duration::from_secs(120),
    }
  }
}

/// Everything the coordinator tracks between calls.
///
/// One async mutex guards it all: guard checks, slot reservation and record
/// replacement happen one completion at a time. The lock is held across the
/// reconciliation read (so passes apply in read order) but never across a
/// submission or confirmation wait.
#[derive(Debug, Default)]
struct CoordinatorState {
  last_record: OwnershipRecord,
  attempts:    BTreeMap<ItemId, AdoptionAttempt>,
}

/// Drives adoption attempts against the ledger and keeps the catalog view
/// consistent with reconciled ownership state.
///
/// Generic over the ledger seams so the same engine runs against the RPC
/// backend, the in-memory ledger, and scripted test doubles.
pub struct Coordinator<L, C, V> {
  catalog:    Arc<Catalog>,
  ledger:     L,
  contract:   Arc<C>,
  reconciler: Reconciler<C>,
  view:       V,
  config:     CoordinatorConfig,
  state:      Mutex<CoordinatorState>,
}

impl<L, C, V> Coordinator<L, C, V>
where
  L: LedgerClient,
  C: OwnershipContract,
  V: CatalogView,
{
  pub fn new(
    catalog: Arc<Catalog>,
    ledger: L,
    contract: Arc<C>,
    view: V,
    config: CoordinatorConfig,
  ) -> Self {
    let reconciler = Reconciler::new(Arc::clone(&contract), catalog.len());
    Self {
      catalog,
      ledger,
      contract,
      reconciler,
      view,
      config,
      state: Mutex::new(CoordinatorState::default()),
    }
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// Snapshot of the item's attempt, if one exists. Pure read.
  pub async fn current_attempt(
    &self,
    item_id: ItemId,
  ) -> Option<AdoptionAttempt> {
    self.state.lock().await.attempts.get(&item_id).cloned()
  }

  /// Snapshots of all attempts, in item id order.
  pub async fn attempts(&self) -> Vec<AdoptionAttempt> {
    self.state.lock().await.attempts.values().cloned().collect()
  }

  /// The last reconciled record. Empty before the first pass.
  pub async fn last_record(&self) -> OwnershipRecord {
    self.state.lock().await.last_record.clone()
  }

  // ── Reconciliation ──────────────────────────────────────────────────────

  /// Run one reconciliation pass and apply it.
  ///
  /// Reads a fresh record, replaces the previous one wholesale, settles any
  /// awaiting attempts the new record resolves, and notifies the view of
  /// each emitted event. Safe to call at any time; a pass that observes no
  /// change emits nothing.
  pub async fn reconcile(&self) -> Result<Vec<OwnershipEvent>> {
    let mut state = self.state.lock().await;
    let record = self.reconciler.reconcile().await?;
    let events = diff(&state.last_record, &record);
    let lost = Self::apply_record(&mut state, record);
    drop(state);

    for event in &events {
      match event {
        OwnershipEvent::Adopted { item_id, .. } => {
          self.view.on_adopted(*item_id);
        }
        OwnershipEvent::AnomalousChange { item_id, previous, current } => {
          tracing::warn!(
            item_id,
            previous = %previous,
            current = %current,
            "anomalous ownership change"
          );
          self.view.on_anomalous_ownership(*item_id);
        }
      }
    }
    for (item_id, reason) in &lost {
      self.view.on_submission_failed(*item_id, reason);
    }

    Ok(events)
  }

  /// Install `record` as the authoritative snapshot and settle awaiting
  /// attempts against it. Returns the attempts the record failed.
  fn apply_record(
    state: &mut CoordinatorState,
    record: OwnershipRecord,
  ) -> Vec<(ItemId, String)> {
    let mut lost = Vec::new();
    for (item_id, attempt) in state.attempts.iter_mut() {
      if attempt.state != AttemptState::AwaitingConfirmation {
        continue;
      }
      match record.owner_of(*item_id) {
        Some(owner) if !owner.is_zero() => {
          if attempt.submitted_by == Some(owner) {
            // The adoption landed even though its confirmation never
            // reached us. The record is authoritative.
            attempt.transition(AttemptState::Confirmed);
            tracing::info!(item_id, "attempt settled by reconciliation");
          } else {
            let reason = format!("item claimed by {owner}");
            attempt.fail(&reason);
            lost.push((*item_id, reason));
          }
        }
        // Still unowned on the ledger; keep waiting.
        _ => {}
      }
    }
    state.last_record = record;
    lost
  }

  // ── Adoption ────────────────────────────────────────────────────────────

  /// Submit an adoption for `item_id` and drive it to a settled state.
  ///
  /// The submission slot is reserved before the first ledger call, so a
  /// concurrent second request for the same item fails with
  /// `AlreadyInFlight` instead of double-submitting. Ownership is judged
  /// against the last reconciled record only; this method never performs a
  /// fresh read to decide `AlreadyOwned`.
  ///
  /// On transport failure before the ledger acknowledges anything the slot
  /// is rolled back to its prior state, so an immediate retry is safe.
  pub async fn request_adoption(
    &self,
    item_id: ItemId,
    account_hint: Option<Address>,
  ) -> Result<AdoptionAttempt> {
    let (mut snapshot, prior) = self.reserve(item_id).await?;

    // Account selection and submission run without the state lock.
    let account = match self.select_account(account_hint).await {
      Ok(account) => account,
      Err(e) => {
        self.rollback(item_id, prior).await;
        return Err(e);
      }
    };

    let pending = match self.contract.adopt(item_id, account).await {
      Ok(pending) => pending,
      Err(Error::TransactionReverted { reason }) => {
        // The ledger rejected the submission outright.
        self.settle_failure(item_id, account, &reason).await;
        return Err(Error::TransactionReverted { reason });
      }
      Err(e) => {
        self.rollback(item_id, prior).await;
        return Err(e);
      }
    };

    if let Some(updated) = self
      .update_attempt(item_id, |attempt| {
        attempt.submitted_by = Some(account);
        attempt.tx_hash = Some(pending.tx_hash);
        attempt.transition(AttemptState::AwaitingConfirmation);
      })
      .await
    {
      snapshot = updated;
    }
    tracing::debug!(
      item_id,
      tx = %pending.tx_hash,
      from = %account,
      "adoption submitted"
    );

    let outcome = tokio::time::timeout(
      self.config.confirmation_timeout,
      self.contract.confirm(pending.tx_hash),
    )
    .await;

    match outcome {
      Err(_) => {
        // Unconfirmed at the bound. The transaction may still land, so the
        // attempt stays in AwaitingConfirmation for reconciliation to
        // settle.
        tracing::warn!(item_id, tx = %pending.tx_hash, "confirmation timed out");
        Err(Error::ConfirmationTimeout(item_id))
      }
      Ok(Err(e)) => {
        // Transport dropped while waiting. Same story as a timeout.
        tracing::warn!(item_id, error = %e, "confirmation wait failed");
        Err(e)
      }
      Ok(Ok(result)) if !result.success => {
        let reason = result
          .revert_reason
          .unwrap_or_else(|| "transaction reverted".to_string());
        self.settle_failure(item_id, account, &reason).await;
        Err(Error::TransactionReverted { reason })
      }
      Ok(Ok(result)) => {
        if let Some(updated) = self
          .update_attempt(item_id, |attempt| {
            // Reconciliation may have settled the attempt while the
            // confirmation was in the air; don't double-apply.
            if attempt.state == AttemptState::AwaitingConfirmation {
              attempt.transition(AttemptState::Confirmed);
            }
          })
          .await
        {
          snapshot = updated;
        }
        tracing::info!(item_id, tx = %result.tx_hash, "adoption confirmed");

        // Fold the confirmed adoption into the record. A pass that cannot
        // reach the ledger does not undo the adoption itself.
        match self.reconcile().await {
          Ok(_) => {
            let state = self.state.lock().await;
            if !state.last_record.is_owned(item_id) {
              tracing::warn!(
                item_id,
                "record still shows no owner after confirmed adoption"
              );
            }
          }
          Err(e) => {
            tracing::warn!(item_id, error = %e, "post-confirmation reconcile failed");
          }
        }

        Ok(snapshot)
      }
    }
  }

  /// Validate the request and reserve the item's submission slot.
  ///
  /// Returns the reserved attempt snapshot plus whatever previously
  /// occupied the slot (for rollback).
  async fn reserve(
    &self,
    item_id: ItemId,
  ) -> Result<(AdoptionAttempt, Option<AdoptionAttempt>)> {
    let mut state = self.state.lock().await;

    if !self.catalog.contains(item_id) {
      return Err(Error::UnknownItem(item_id));
    }
    if let Some(existing) = state.attempts.get(&item_id) {
      if existing.state.in_flight() {
        return Err(Error::AlreadyInFlight(item_id));
      }
      // A confirmed slot means the record just hasn't caught up yet.
      if existing.state == AttemptState::Confirmed {
        let owner = existing
          .submitted_by
          .or_else(|| state.last_record.owner_of(item_id))
          .unwrap_or(Address::ZERO);
        return Err(Error::AlreadyOwned { item_id, owner });
      }
    }
    if let Some(owner) = state.last_record.owner_of(item_id)
      && !owner.is_zero()
    {
      return Err(Error::AlreadyOwned { item_id, owner });
    }

    let mut attempt = AdoptionAttempt::new(item_id);
    attempt.transition(AttemptState::Submitting);
    let prior = state.attempts.insert(item_id, attempt.clone());
    Ok((attempt, prior))
  }

  /// The hinted account, or the provider's first account.
  async fn select_account(&self, hint: Option<Address>) -> Result<Address> {
    if let Some(account) = hint {
      return Ok(account);
    }
    let accounts = self.ledger.list_accounts().await?;
    accounts.first().copied().ok_or(Error::NoAccountAvailable)
  }

  /// Restore the slot to whatever occupied it before this request.
  async fn rollback(&self, item_id: ItemId, prior: Option<AdoptionAttempt>) {
    let mut state = self.state.lock().await;
    match prior {
      Some(previous) => {
        state.attempts.insert(item_id, previous);
      }
      None => {
        state.attempts.remove(&item_id);
      }
    }
  }

  /// Fail the live attempt and notify the view.
  async fn settle_failure(&self, item_id: ItemId, account: Address, reason: &str) {
    self
      .update_attempt(item_id, |attempt| {
        if attempt.state.in_flight() {
          attempt.submitted_by = Some(account);
          attempt.fail(reason);
        }
      })
      .await;
    tracing::warn!(item_id, reason, "adoption submission failed");
    self.view.on_submission_failed(item_id, reason);
  }

  /// Apply `f` to the item's live attempt and return the updated snapshot.
  async fn update_attempt(
    &self,
    item_id: ItemId,
    f: impl FnOnce(&mut AdoptionAttempt),
  ) -> Option<AdoptionAttempt> {
    let mut state = self.state.lock().await;
    let attempt = state.attempts.get_mut(&item_id)?;
    f(attempt);
    Some(attempt.clone())
  }
}
