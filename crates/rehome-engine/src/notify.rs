//! Catalog view implementations.

use rehome_core::{catalog::ItemId, view::CatalogView};

/// Forwards catalog notifications to the tracing subscriber.
///
/// The server's default view: clients read adoption state back through the
/// API, so a log line is all the process-local surface needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogView;

impl CatalogView for LogView {
  fn on_adopted(&self, item_id: ItemId) {
    tracing::info!(item_id, "item adopted");
  }

  fn on_submission_failed(&self, item_id: ItemId, reason: &str) {
    tracing::warn!(item_id, reason, "adoption failed");
  }

  fn on_anomalous_ownership(&self, item_id: ItemId) {
    tracing::warn!(item_id, "ownership changed outside adoption");
  }
}
