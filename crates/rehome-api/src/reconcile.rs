//! Handler for `POST /reconcile`.

use std::sync::Arc;

use axum::{Json, extract::State};
use rehome_core::{
  event::OwnershipEvent,
  ledger::{LedgerClient, OwnershipContract},
  view::CatalogView,
};
use rehome_engine::Coordinator;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
  pub events: Vec<OwnershipEvent>,
}

/// `POST /reconcile` — run one pass and report what changed.
pub async fn run<L, C, V>(
  State(coordinator): State<Arc<Coordinator<L, C, V>>>,
) -> Result<Json<ReconcileResponse>, ApiError>
where
  L: LedgerClient + Send + Sync + 'static,
  C: OwnershipContract + Send + Sync + 'static,
  V: CatalogView + 'static,
{
  let events = coordinator.reconcile().await?;
  Ok(Json(ReconcileResponse { events }))
}
