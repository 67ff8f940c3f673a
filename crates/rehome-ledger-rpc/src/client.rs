//! JSON-RPC transport and the account half of the ledger seam.

use std::{future::Future, time::Duration};

use rehome_core::{
  Error, Result, address::Address, ledger::LedgerClient,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

/// Where development chains listen by convention.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8545";

/// Connection settings for a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConfig {
  pub url:           String,
  /// Receipt polling cadence while a transaction is unmined.
  pub poll_interval: Duration,
}

impl Default for RpcConfig {
  fn default() -> Self {
    Self {
      url:           DEFAULT_ENDPOINT.to_string(),
      poll_interval: Duration::from_millis(500),
    }
  }
}

/// Thin JSON-RPC 2.0 client over HTTP.
#[derive(Debug, Clone)]
pub struct RpcClient {
  http:   reqwest::Client,
  config: RpcConfig,
}

#[derive(Deserialize)]
struct RpcEnvelope {
  #[serde(default)]
  result: Option<Value>,
  #[serde(default)]
  error:  Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
  code:    i64,
  message: String,
}

impl RpcClient {
  pub fn new(config: RpcConfig) -> Result<Self> {
    if config.url.is_empty() {
      return Err(Error::NoProviderConfigured);
    }
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| Error::LedgerUnavailable(e.to_string()))?;
    Ok(Self { http, config })
  }

  pub fn config(&self) -> &RpcConfig {
    &self.config
  }

  /// One JSON-RPC call whose result may legitimately be `null` (receipt
  /// lookups for unmined transactions). Transport failures map to
  /// [`Error::LedgerUnavailable`]; node-reported errors are classified by
  /// message.
  pub(crate) async fn call_nullable<T: DeserializeOwned>(
    &self,
    method: &str,
    params: Value,
  ) -> Result<Option<T>> {
    let body = json!({
      "jsonrpc": "2.0",
      "id": 1,
      "method": method,
      "params": params,
    });
    let response = self
      .http
      .post(&self.config.url)
      .json(&body)
      .send()
      .await
      .map_err(|e| Error::LedgerUnavailable(e.to_string()))?;
    let envelope: RpcEnvelope = response
      .json()
      .await
      .map_err(|e| Error::MalformedResponse(e.to_string()))?;
    if let Some(error) = envelope.error {
      return Err(classify_rpc_error(method, &error));
    }
    match envelope.result {
      None => Ok(None),
      Some(value) => serde_json::from_value(value)
        .map(Some)
        .map_err(|e| Error::MalformedResponse(format!("{method}: {e}"))),
    }
  }

  /// One JSON-RPC call with a mandatory result.
  pub(crate) async fn call<T: DeserializeOwned>(
    &self,
    method: &str,
    params: Value,
  ) -> Result<T> {
    self
      .call_nullable(method, params)
      .await?
      .ok_or_else(|| Error::MalformedResponse(format!("{method}: null result")))
  }
}

/// Development chains report contract reverts as plain RPC errors; the
/// message text is the only signal separating a revert from an outage.
fn classify_rpc_error(method: &str, error: &RpcError) -> Error {
  if error.message.to_ascii_lowercase().contains("revert") {
    Error::TransactionReverted {
      reason: error.message.clone(),
    }
  } else {
    Error::LedgerUnavailable(format!(
      "{method}: {} (code {})",
      error.message, error.code,
    ))
  }
}

impl LedgerClient for RpcClient {
  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<Address>>> + Send + '_ {
    async move {
      let raw: Vec<String> = self.call("eth_accounts", json!([])).await?;
      raw
        .iter()
        .map(|s| {
          s.parse().map_err(|_| {
            Error::MalformedResponse(format!("bad account address: {s}"))
          })
        })
        .collect()
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_url_is_no_provider() {
    let config = RpcConfig {
      url: String::new(),
      ..RpcConfig::default()
    };
    assert!(matches!(
      RpcClient::new(config),
      Err(Error::NoProviderConfigured)
    ));
  }

  #[test]
  fn default_config_points_at_the_dev_chain() {
    let config = RpcConfig::default();
    assert_eq!(config.url, DEFAULT_ENDPOINT);
    assert!(!config.poll_interval.is_zero());
  }

  #[test]
  fn revert_messages_classify_as_reverts() {
    let error = RpcError {
      code:    -32000,
      message: "VM Exception while processing transaction: revert".to_string(),
    };
    assert!(matches!(
      classify_rpc_error("eth_sendTransaction", &error),
      Error::TransactionReverted { .. }
    ));
  }

  #[test]
  fn other_rpc_errors_classify_as_unavailable() {
    let error = RpcError {
      code:    -32601,
      message: "method not found".to_string(),
    };
    let classified = classify_rpc_error("eth_accounts", &error);
    assert!(matches!(classified, Error::LedgerUnavailable(_)));
    assert!(classified.to_string().contains("eth_accounts"));
  }

  #[test]
  fn envelope_accepts_null_and_missing_results() {
    let null: RpcEnvelope =
      serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
        .unwrap();
    assert!(null.result.is_none());
    assert!(null.error.is_none());

    let missing: RpcEnvelope = serde_json::from_str(
      r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"boom"}}"#,
    )
    .unwrap();
    assert!(missing.result.is_none());
    assert_eq!(missing.error.unwrap().message, "boom");
  }
}
