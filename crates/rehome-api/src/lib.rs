//! JSON REST API for rehome.
//!
//! Exposes an axum [`Router`] over a [`rehome_engine::Coordinator`]. Auth,
//! TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rehome_api::api_router(coordinator.clone()))
//! ```

pub mod attempts;
pub mod catalog;
pub mod error;
pub mod reconcile;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rehome_core::{
  ledger::{LedgerClient, OwnershipContract},
  view::CatalogView,
};
use rehome_engine::Coordinator;

pub use error::ApiError;

/// Build a fully-materialised API router for `coordinator`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<L, C, V>(
  coordinator: Arc<Coordinator<L, C, V>>,
) -> Router<()>
where
  L: LedgerClient + Send + Sync + 'static,
  C: OwnershipContract + Send + Sync + 'static,
  V: CatalogView + 'static,
{
  Router::new()
    // Catalog
    .route("/catalog", get(catalog::list::<L, C, V>))
    .route("/catalog/{id}", get(catalog::get_one::<L, C, V>))
    .route("/catalog/{id}/adopt", post(catalog::adopt::<L, C, V>))
    // Attempts
    .route("/attempts", get(attempts::list::<L, C, V>))
    .route("/attempts/{id}", get(attempts::get_one::<L, C, V>))
    // Reconciliation
    .route("/reconcile", post(reconcile::run::<L, C, V>))
    .with_state(coordinator)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use rehome_core::{
    address::Address,
    catalog::{Catalog, CatalogItem},
  };
  use rehome_engine::{CoordinatorConfig, LogView};
  use rehome_ledger_mem::MemLedger;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  type MemCoordinator = Coordinator<MemLedger, MemLedger, LogView>;

  fn addr(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = n;
    Address(bytes)
  }

  fn catalog(len: u32) -> Arc<Catalog> {
    let items = (0..len)
      .map(|id| CatalogItem {
        id,
        name: format!("pet-{id}"),
        breed: "mixed".to_string(),
        age_band: "adult".to_string(),
        location_tag: "north-shelter".to_string(),
        image_ref: format!("images/pet-{id}.png"),
      })
      .collect();
    Arc::new(Catalog::new(items).expect("valid catalog"))
  }

  fn make_coordinator(len: u32) -> (Arc<MemCoordinator>, MemLedger) {
    let ledger = MemLedger::new(len as usize);
    let coordinator = Arc::new(Coordinator::new(
      catalog(len),
      ledger.clone(),
      Arc::new(ledger.clone()),
      LogView,
      CoordinatorConfig::default(),
    ));
    (coordinator, ledger)
  }

  async fn oneshot_json(
    coordinator: Arc<MemCoordinator>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(value) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = api_router(coordinator).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  // ── Catalog ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn catalog_joins_items_with_ownership() {
    let (coordinator, ledger) = make_coordinator(4);
    ledger.set_owner(2, addr(7)).await.unwrap();
    coordinator.reconcile().await.unwrap();

    let (status, body) =
      oneshot_json(coordinator, "GET", "/catalog", None).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["name"], "pet-0");
    assert_eq!(entries[0]["owner"], Value::Null);
    assert_eq!(entries[2]["owner"], addr(7).to_string());
    assert_eq!(entries[2]["attempt"], Value::Null);
  }

  #[tokio::test]
  async fn unknown_catalog_id_returns_404() {
    let (coordinator, _ledger) = make_coordinator(4);
    let (status, body) =
      oneshot_json(coordinator, "GET", "/catalog/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("99"));
  }

  // ── Adopt ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn adopt_drives_to_confirmed() {
    let (coordinator, _ledger) = make_coordinator(4);

    let (status, body) = oneshot_json(
      coordinator.clone(),
      "POST",
      "/catalog/1/adopt",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "confirmed");
    assert_eq!(body["item_id"], 1);
    assert!(body["tx_hash"].is_string());

    // Ownership is now visible through the catalog join.
    let (_, entries) =
      oneshot_json(coordinator, "GET", "/catalog", None).await;
    assert_eq!(entries[1]["owner"], body["submitted_by"]);
    assert_eq!(entries[1]["attempt"]["state"], "confirmed");
  }

  #[tokio::test]
  async fn adopt_accepts_an_account_hint() {
    let (coordinator, _ledger) = make_coordinator(4);
    let hint = addr(9).to_string();

    let (status, body) = oneshot_json(
      coordinator,
      "POST",
      "/catalog/0/adopt",
      Some(json!({ "account": hint })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submitted_by"], hint);
  }

  #[tokio::test]
  async fn adopting_an_owned_item_conflicts() {
    let (coordinator, ledger) = make_coordinator(4);
    ledger.set_owner(2, addr(7)).await.unwrap();
    coordinator.reconcile().await.unwrap();

    let (status, body) =
      oneshot_json(coordinator, "POST", "/catalog/2/adopt", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already owned"));
  }

  #[tokio::test]
  async fn adopting_an_unknown_item_returns_404() {
    let (coordinator, _ledger) = make_coordinator(4);
    let (status, _body) =
      oneshot_json(coordinator, "POST", "/catalog/42/adopt", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn reverted_adoption_conflicts_and_is_recorded() {
    let (coordinator, ledger) = make_coordinator(4);
    ledger.revert_next_adopt("pet escaped").await;

    let (status, body) =
      oneshot_json(coordinator.clone(), "POST", "/catalog/3/adopt", None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("pet escaped"));

    let (status, attempt) =
      oneshot_json(coordinator, "GET", "/attempts/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attempt["state"], "failed");
    assert_eq!(attempt["last_error"], "pet escaped");
  }

  // ── Attempts ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn attempts_list_round_trip() {
    let (coordinator, _ledger) = make_coordinator(4);

    let (status, body) =
      oneshot_json(coordinator.clone(), "GET", "/attempts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (status, _) =
      oneshot_json(coordinator.clone(), "GET", "/attempts/0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    oneshot_json(coordinator.clone(), "POST", "/catalog/0/adopt", None).await;

    let (_, body) =
      oneshot_json(coordinator.clone(), "GET", "/attempts", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, attempt) =
      oneshot_json(coordinator, "GET", "/attempts/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attempt["state"], "confirmed");
  }

  // ── Reconcile ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn reconcile_reports_external_adoptions() {
    let (coordinator, ledger) = make_coordinator(4);
    ledger.set_owner(1, addr(8)).await.unwrap();

    let (status, body) =
      oneshot_json(coordinator.clone(), "POST", "/reconcile", None).await;
    assert_eq!(status, StatusCode::OK);

    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "adopted");
    assert_eq!(events[0]["item_id"], 1);
    assert_eq!(events[0]["owner"], addr(8).to_string());

    // A second pass with no ledger change reports nothing.
    let (_, body) =
      oneshot_json(coordinator, "POST", "/reconcile", None).await;
    assert_eq!(body["events"].as_array().unwrap().len(), 0);
  }
}
