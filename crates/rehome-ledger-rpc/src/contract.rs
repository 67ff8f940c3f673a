//! Binding for the deployed adoption registry contract.

use std::future::Future;

use rehome_core::{
  Error, Result,
  address::{Address, TxHash},
  catalog::ItemId,
  ledger::{OwnershipContract, PendingTransaction, TransactionResult},
  record::OwnershipRecord,
};
use serde::Deserialize;
use serde_json::json;

use crate::{abi, client::RpcClient};

/// The on-chain registry: a fixed-size owner table plus `adopt`.
#[derive(Debug, Clone)]
pub struct RpcContract {
  client:    RpcClient,
  address:   Address,
  table_len: usize,
}

#[derive(Deserialize)]
struct Receipt {
  /// `"0x1"` for success, `"0x0"` for a reverted transaction. Chains
  /// predating receipt statuses omit it; those are treated as mined
  /// successfully.
  status: Option<String>,
}

impl RpcContract {
  pub fn new(client: RpcClient, address: Address, table_len: usize) -> Self {
    Self {
      client,
      address,
      table_len,
    }
  }

  async fn receipt(&self, tx: TxHash) -> Result<Option<Receipt>> {
    self
      .client
      .call_nullable("eth_getTransactionReceipt", json!([tx.to_string()]))
      .await
  }
}

impl OwnershipContract for RpcContract {
  fn owners(
    &self,
  ) -> impl Future<Output = Result<OwnershipRecord>> + Send + '_ {
    async move {
      let params = json!([
        {
          "to":   self.address.to_string(),
          "data": hex_data(&abi::encode_get_adopters()),
        },
        "latest",
      ]);
      let raw: String = self.client.call("eth_call", params).await?;
      let data = decode_hex_payload(&raw)?;
      let table = abi::decode_address_table(&data, self.table_len)?;
      Ok(OwnershipRecord::from_table(table))
    }
  }

  fn adopt(
    &self,
    item_id: ItemId,
    account: Address,
  ) -> impl Future<Output = Result<PendingTransaction>> + Send + '_ {
    async move {
      let params = json!([{
        "from": account.to_string(),
        "to":   self.address.to_string(),
        "data": hex_data(&abi::encode_adopt(item_id)),
      }]);
      let raw: String =
        self.client.call("eth_sendTransaction", params).await?;
      let tx_hash: TxHash = raw.parse().map_err(|_| {
        Error::MalformedResponse(format!("bad transaction hash: {raw}"))
      })?;
      tracing::debug!(item_id, %tx_hash, "adoption submitted");
      Ok(PendingTransaction { tx_hash })
    }
  }

  /// Poll for the transaction receipt until the chain mines it. The wait is
  /// unbounded here; callers impose their own deadline.
  fn confirm(
    &self,
    tx: TxHash,
  ) -> impl Future<Output = Result<TransactionResult>> + Send + '_ {
    async move {
      loop {
        if let Some(receipt) = self.receipt(tx).await? {
          let success = receipt.status.as_deref() != Some("0x0");
          return Ok(TransactionResult {
            success,
            tx_hash: tx,
            revert_reason: (!success)
              .then(|| "transaction reverted".to_string()),
          });
        }
        tokio::time::sleep(self.client.config().poll_interval).await;
      }
    }
  }
}

fn hex_data(data: &[u8]) -> String {
  format!("0x{}", hex::encode(data))
}

fn decode_hex_payload(raw: &str) -> Result<Vec<u8>> {
  let stripped = raw.strip_prefix("0x").unwrap_or(raw);
  hex::decode(stripped)
    .map_err(|e| Error::MalformedResponse(format!("bad hex payload: {e}")))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hex_payloads_round_trip() {
    assert_eq!(hex_data(&[0xde, 0xad]), "0xdead");
    assert_eq!(decode_hex_payload("0xdead").unwrap(), vec![0xde, 0xad]);
    assert_eq!(decode_hex_payload("dead").unwrap(), vec![0xde, 0xad]);
    assert!(matches!(
      decode_hex_payload("0xzz"),
      Err(Error::MalformedResponse(_))
    ));
  }

  #[test]
  fn receipt_status_decodes() {
    let mined: Receipt = serde_json::from_str(r#"{"status":"0x1"}"#).unwrap();
    assert_eq!(mined.status.as_deref(), Some("0x1"));

    let legacy: Receipt =
      serde_json::from_str(r#"{"transactionHash":"0xabc"}"#).unwrap();
    assert!(legacy.status.is_none());
  }
}
