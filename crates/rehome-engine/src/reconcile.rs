//! The reconciliation read path.

use std::sync::Arc;

use rehome_core::{
  error::{Error, Result},
  ledger::OwnershipContract,
  record::OwnershipRecord,
};

/// Reads the contract ownership table and validates its shape.
///
/// Holds no mutable state: every call produces a fresh record. Pairing a
/// read with [`diff`](crate::diff::diff) against the previous record is the
/// coordinator's job; on its own a pass has no side effects and can be
/// repeated at any time.
#[derive(Debug, Clone)]
pub struct Reconciler<C> {
  contract:     Arc<C>,
  /// Number of table entries the contract must report (the catalog size).
  expected_len: usize,
}

impl<C: OwnershipContract> Reconciler<C> {
  pub fn new(contract: Arc<C>, expected_len: usize) -> Self {
    Self {
      contract,
      expected_len,
    }
  }

  /// Fetch the full ownership table as a fresh record.
  ///
  /// Fails with `Error::MalformedResponse` when the table does not cover
  /// exactly ids `0..expected_len`, and propagates transport failures
  /// unchanged.
  pub async fn reconcile(&self) -> Result<OwnershipRecord> {
    let record = self.contract.owners().await?;
    if !record.covers(self.expected_len) {
      return Err(Error::MalformedResponse(format!(
        "ownership table covers {} entries, expected {}",
        record.len(),
        self.expected_len
      )));
    }
    tracing::debug!(entries = record.len(), "read ownership table");
    Ok(record)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
