//! Error taxonomy shared across the workspace.
//!
//! The coordinator classifies failures by variant (roll the attempt back,
//! fail it, or leave it awaiting confirmation), so ledger backends must map
//! their transport errors onto these variants rather than defining their own.

use thiserror::Error;

use crate::{address::Address, catalog::ItemId};

#[derive(Debug, Error)]
pub enum Error {
  /// The ledger could not be reached or did not answer in time.
  #[error("ledger unavailable: {0}")]
  LedgerUnavailable(String),

  /// The ledger answered with data that does not decode to the expected
  /// shape.
  #[error("malformed ledger response: {0}")]
  MalformedResponse(String),

  #[error("no ledger provider configured")]
  NoProviderConfigured,

  /// The provider reported zero usable accounts.
  #[error("no account available for submission")]
  NoAccountAvailable,

  /// A submission for this item is already in flight.
  #[error("adoption of item {0} is already in flight")]
  AlreadyInFlight(ItemId),

  /// The last reconciled record shows a real owner for this item.
  #[error("item {item_id} is already owned by {owner}")]
  AlreadyOwned { item_id: ItemId, owner: Address },

  /// The ledger rejected the transaction, at submission or on commit.
  #[error("transaction reverted: {reason}")]
  TransactionReverted { reason: String },

  /// The confirmation wait hit its bound. The attempt is still awaiting
  /// confirmation; a later reconciliation pass settles it.
  #[error("confirmation timed out for item {0}")]
  ConfirmationTimeout(ItemId),

  #[error("unknown item id {0}")]
  UnknownItem(ItemId),

  #[error("invalid catalog: {0}")]
  InvalidCatalog(String),

  #[error("invalid address: {0}")]
  InvalidAddress(String),

  #[error("invalid transaction hash: {0}")]
  InvalidTxHash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
