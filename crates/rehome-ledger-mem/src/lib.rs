//! In-process ledger backend for demos and tests.
//!
//! Behaves like the deployed registry contract: a fixed-size owner table, a
//! bounds check as the only guard on adopt (last write wins), and instant
//! mining. An optional confirmation delay simulates block latency.

use std::{future::Future, sync::Arc, time::Duration};

use rehome_core::{
  Error, Result,
  address::{Address, TxHash},
  catalog::ItemId,
  ledger::{
    LedgerClient, OwnershipContract, PendingTransaction, TransactionResult,
  },
  record::OwnershipRecord,
};
use tokio::sync::Mutex;

#[derive(Debug)]
struct Inner {
  table:             Vec<Address>,
  accounts:          Vec<Address>,
  revert_next_adopt: Option<String>,
  next_nonce:        u64,
}

/// Shared in-memory ledger. Cloning hands out another handle to the same
/// table, so one instance can back both the client and contract seams.
#[derive(Debug, Clone)]
pub struct MemLedger {
  inner:              Arc<Mutex<Inner>>,
  confirmation_delay: Duration,
}

impl MemLedger {
  /// A ledger with `table_len` unowned slots and three unlocked accounts.
  pub fn new(table_len: usize) -> Self {
    Self::with_accounts(table_len, (1..=3).map(dev_account).collect())
  }

  pub fn with_accounts(table_len: usize, accounts: Vec<Address>) -> Self {
    Self {
      inner: Arc::new(Mutex::new(Inner {
        table: vec![Address::ZERO; table_len],
        accounts,
        revert_next_adopt: None,
        next_nonce: 0,
      })),
      confirmation_delay: Duration::ZERO,
    }
  }

  /// Delay every confirmation by `delay` to simulate mining latency.
  pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
    self.confirmation_delay = delay;
    self
  }

  /// Script the next adopt call to revert with `reason`. One-shot.
  pub async fn revert_next_adopt(&self, reason: impl Into<String>) {
    self.inner.lock().await.revert_next_adopt = Some(reason.into());
  }

  /// Overwrite a slot directly, bypassing adopt. Stands in for activity
  /// from outside this process.
  pub async fn set_owner(&self, item_id: ItemId, owner: Address) -> Result<()> {
    let mut inner = self.inner.lock().await;
    let slot = inner
      .table
      .get_mut(item_id as usize)
      .ok_or(Error::UnknownItem(item_id))?;
    *slot = owner;
    Ok(())
  }

  pub async fn owners_snapshot(&self) -> Vec<Address> {
    self.inner.lock().await.table.clone()
  }
}

impl LedgerClient for MemLedger {
  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<Address>>> + Send + '_ {
    async move { Ok(self.inner.lock().await.accounts.clone()) }
  }
}

impl OwnershipContract for MemLedger {
  fn owners(
    &self,
  ) -> impl Future<Output = Result<OwnershipRecord>> + Send + '_ {
    async move {
      let inner = self.inner.lock().await;
      Ok(OwnershipRecord::from_table(inner.table.clone()))
    }
  }

  fn adopt(
    &self,
    item_id: ItemId,
    account: Address,
  ) -> impl Future<Output = Result<PendingTransaction>> + Send + '_ {
    async move {
      let mut inner = self.inner.lock().await;
      if let Some(reason) = inner.revert_next_adopt.take() {
        return Err(Error::TransactionReverted { reason });
      }
      // The contract's only guard is the bounds check; re-adoption of an
      // owned slot goes through and overwrites.
      let Some(slot) = inner.table.get_mut(item_id as usize) else {
        return Err(Error::TransactionReverted {
          reason: format!("item id {item_id} out of range"),
        });
      };
      *slot = account;
      let nonce = inner.next_nonce;
      inner.next_nonce += 1;
      Ok(PendingTransaction {
        tx_hash: tx_hash_from_nonce(nonce),
      })
    }
  }

  fn confirm(
    &self,
    tx: TxHash,
  ) -> impl Future<Output = Result<TransactionResult>> + Send + '_ {
    async move {
      if !self.confirmation_delay.is_zero() {
        tokio::time::sleep(self.confirmation_delay).await;
      }
      Ok(TransactionResult {
        success:       true,
        tx_hash:       tx,
        revert_reason: None,
      })
    }
  }
}

fn dev_account(n: u8) -> Address {
  let mut bytes = [0u8; 20];
  bytes[19] = n;
  Address(bytes)
}

fn tx_hash_from_nonce(nonce: u64) -> TxHash {
  let mut bytes = [0u8; 32];
  bytes[24..].copy_from_slice(&nonce.to_be_bytes());
  TxHash(bytes)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
