//! Trait seams to the ledger.
//!
//! Implemented by ledger backends (`rehome-ledger-rpc`, `rehome-ledger-mem`).
//! The engine depends on these abstractions, never on a concrete backend.
//! All fallible operations use the shared [`crate::Error`] taxonomy so the
//! coordinator can classify failures the same way across backends.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  address::{Address, TxHash},
  catalog::ItemId,
  error::Result,
  record::OwnershipRecord,
};

/// Acknowledgment that the ledger accepted a submitted transaction.
///
/// Acceptance is not durability: the transaction is pending until
/// [`OwnershipContract::confirm`] reports its final outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
  pub tx_hash: TxHash,
}

/// Final outcome of a confirmed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
  pub success:       bool,
  pub tx_hash:       TxHash,
  /// Ledger-reported cause when `success` is false, if the ledger gave one.
  pub revert_reason: Option<String>,
}

/// Access to the accounts available for signing submissions.
///
/// All methods return `Send` futures so implementations can be driven from
/// multi-threaded async runtimes.
pub trait LedgerClient: Send + Sync {
  /// Enumerate usable accounts, in the provider's preference order.
  ///
  /// Fails with `Error::NoProviderConfigured` when the backend has no
  /// endpoint and `Error::LedgerUnavailable` on transport failure. An empty
  /// list is a valid response; the caller decides whether that is an error.
  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<Address>>> + Send + '_;
}

/// The deployed ownership contract.
pub trait OwnershipContract: Send + Sync {
  /// Read the full ownership table in one batch call.
  fn owners(
    &self,
  ) -> impl Future<Output = Result<OwnershipRecord>> + Send + '_;

  /// Submit an adoption of `item_id` from `account`.
  ///
  /// Resolves when the ledger acknowledges the submission. Immediate
  /// rejection surfaces as `Error::TransactionReverted`, transport failure
  /// as `Error::LedgerUnavailable`.
  fn adopt(
    &self,
    item_id: ItemId,
    account: Address,
  ) -> impl Future<Output = Result<PendingTransaction>> + Send + '_;

  /// Wait until `tx` is durably committed or reverted.
  ///
  /// Implementations wait indefinitely; bounding the wait is the caller's
  /// policy, not the backend's.
  fn confirm(
    &self,
    tx: TxHash,
  ) -> impl Future<Output = Result<TransactionResult>> + Send + '_;
}
