//! Handlers for `/attempts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/attempts` | All attempt snapshots, in item id order |
//! | `GET`  | `/attempts/{id}` | 404 if the item has no attempt |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use rehome_core::{
  attempt::AdoptionAttempt,
  catalog::ItemId,
  ledger::{LedgerClient, OwnershipContract},
  view::CatalogView,
};
use rehome_engine::Coordinator;

use crate::error::ApiError;

/// `GET /attempts`
pub async fn list<L, C, V>(
  State(coordinator): State<Arc<Coordinator<L, C, V>>>,
) -> Json<Vec<AdoptionAttempt>>
where
  L: LedgerClient + Send + Sync + 'static,
  C: OwnershipContract + Send + Sync + 'static,
  V: CatalogView + 'static,
{
  Json(coordinator.attempts().await)
}

/// `GET /attempts/{id}`
pub async fn get_one<L, C, V>(
  State(coordinator): State<Arc<Coordinator<L, C, V>>>,
  Path(id): Path<ItemId>,
) -> Result<Json<AdoptionAttempt>, ApiError>
where
  L: LedgerClient + Send + Sync + 'static,
  C: OwnershipContract + Send + Sync + 'static,
  V: CatalogView + 'static,
{
  if !coordinator.catalog().contains(id) {
    return Err(ApiError::NotFound(format!("item {id} not found")));
  }
  let attempt = coordinator
    .current_attempt(id)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("no attempt for item {id}")))?;
  Ok(Json(attempt))
}
