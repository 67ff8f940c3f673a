//! Async HTTP client wrapping the rehome JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use rehome_core::{
  address::Address, attempt::AdoptionAttempt, catalog::ItemId,
  event::OwnershipEvent,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Connection settings for the rehome API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// One `/catalog` entry as served: the item joined with ownership and
/// attempt state.
#[derive(Debug, Deserialize)]
pub struct CatalogRow {
  pub id:           ItemId,
  pub name:         String,
  pub breed:        String,
  pub age_band:     String,
  pub location_tag: String,
  pub image_ref:    String,
  pub owner:        Option<Address>,
  pub attempt:      Option<AdoptionAttempt>,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileOutcome {
  pub events: Vec<OwnershipEvent>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the rehome JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    // Adoptions block until confirmed or timed out server-side, so the
    // HTTP timeout must outlast the server's confirmation bound.
    let client = Client::builder()
      .timeout(Duration::from_secs(180))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Decode a success body or surface the server's error message.
  async fn decode<T: serde::de::DeserializeOwned>(
    label: &str,
    resp: reqwest::Response,
  ) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
      return resp
        .json()
        .await
        .with_context(|| format!("deserialising {label}"));
    }
    let detail = resp
      .json::<ErrorBody>()
      .await
      .map(|body| body.error)
      .unwrap_or_else(|_| "no detail".to_string());
    Err(anyhow!("{label} → {status}: {detail}"))
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  /// `GET /catalog`
  pub async fn catalog(&self) -> Result<Vec<CatalogRow>> {
    let resp = self
      .client
      .get(self.url("/catalog"))
      .send()
      .await
      .context("GET /catalog failed")?;
    Self::decode("GET /catalog", resp).await
  }

  /// `POST /catalog/{id}/adopt`
  pub async fn adopt(
    &self,
    item_id: ItemId,
    account: Option<Address>,
  ) -> Result<AdoptionAttempt> {
    let mut req = self
      .client
      .post(self.url(&format!("/catalog/{item_id}/adopt")));
    if let Some(account) = account {
      req = req.json(&json!({ "account": account }));
    }
    let resp = req
      .send()
      .await
      .with_context(|| format!("POST /catalog/{item_id}/adopt failed"))?;
    Self::decode("adopt", resp).await
  }

  // ── Attempts ──────────────────────────────────────────────────────────────

  /// `GET /attempts`
  pub async fn attempts(&self) -> Result<Vec<AdoptionAttempt>> {
    let resp = self
      .client
      .get(self.url("/attempts"))
      .send()
      .await
      .context("GET /attempts failed")?;
    Self::decode("GET /attempts", resp).await
  }

  /// `GET /attempts/{id}`
  pub async fn attempt(&self, item_id: ItemId) -> Result<AdoptionAttempt> {
    let resp = self
      .client
      .get(self.url(&format!("/attempts/{item_id}")))
      .send()
      .await
      .with_context(|| format!("GET /attempts/{item_id} failed"))?;
    Self::decode("GET /attempts/{id}", resp).await
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  /// `POST /reconcile`
  pub async fn reconcile(&self) -> Result<ReconcileOutcome> {
    let resp = self
      .client
      .post(self.url("/reconcile"))
      .send()
      .await
      .context("POST /reconcile failed")?;
    Self::decode("POST /reconcile", resp).await
  }
}
