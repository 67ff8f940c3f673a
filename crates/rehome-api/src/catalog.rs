//! Handlers for `/catalog` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog` | Items joined with ownership and attempt state |
//! | `GET`  | `/catalog/{id}` | 404 if the id is not in the catalog |
//! | `POST` | `/catalog/{id}/adopt` | Optional body: `{"account":"0x…"}` |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
};
use rehome_core::{
  address::Address,
  attempt::AdoptionAttempt,
  catalog::{CatalogItem, ItemId},
  ledger::{LedgerClient, OwnershipContract},
  record::OwnershipRecord,
  view::CatalogView,
};
use rehome_engine::Coordinator;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A catalog item joined with what the coordinator knows about it.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
  #[serde(flatten)]
  pub item:    CatalogItem,
  /// Owner from the last reconciled record; absent while unowned.
  pub owner:   Option<Address>,
  pub attempt: Option<AdoptionAttempt>,
}

fn entry_for(
  item: &CatalogItem,
  record: &OwnershipRecord,
  attempt: Option<AdoptionAttempt>,
) -> CatalogEntry {
  CatalogEntry {
    item: item.clone(),
    owner: record.owner_of(item.id).filter(|owner| !owner.is_zero()),
    attempt,
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /catalog`
pub async fn list<L, C, V>(
  State(coordinator): State<Arc<Coordinator<L, C, V>>>,
) -> Json<Vec<CatalogEntry>>
where
  L: LedgerClient + Send + Sync + 'static,
  C: OwnershipContract + Send + Sync + 'static,
  V: CatalogView + 'static,
{
  let record = coordinator.last_record().await;
  let mut attempts: BTreeMap<ItemId, AdoptionAttempt> = coordinator
    .attempts()
    .await
    .into_iter()
    .map(|attempt| (attempt.item_id, attempt))
    .collect();
  let entries = coordinator
    .catalog()
    .items()
    .map(|item| entry_for(item, &record, attempts.remove(&item.id)))
    .collect();
  Json(entries)
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /catalog/{id}`
pub async fn get_one<L, C, V>(
  State(coordinator): State<Arc<Coordinator<L, C, V>>>,
  Path(id): Path<ItemId>,
) -> Result<Json<CatalogEntry>, ApiError>
where
  L: LedgerClient + Send + Sync + 'static,
  C: OwnershipContract + Send + Sync + 'static,
  V: CatalogView + 'static,
{
  let item = coordinator
    .catalog()
    .get(id)
    .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?
    .clone();
  let record = coordinator.last_record().await;
  let attempt = coordinator.current_attempt(id).await;
  Ok(Json(entry_for(&item, &record, attempt)))
}

// ─── Adopt ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AdoptBody {
  /// Ledger account to submit from; the first provider account when absent.
  pub account: Option<Address>,
}

/// `POST /catalog/{id}/adopt` — drives the adoption to a settled state and
/// returns the final attempt snapshot.
pub async fn adopt<L, C, V>(
  State(coordinator): State<Arc<Coordinator<L, C, V>>>,
  Path(id): Path<ItemId>,
  body: Option<Json<AdoptBody>>,
) -> Result<Json<AdoptionAttempt>, ApiError>
where
  L: LedgerClient + Send + Sync + 'static,
  C: OwnershipContract + Send + Sync + 'static,
  V: CatalogView + 'static,
{
  let hint = body.and_then(|Json(body)| body.account);
  let attempt = coordinator.request_adoption(id, hint).await?;
  Ok(Json(attempt))
}
