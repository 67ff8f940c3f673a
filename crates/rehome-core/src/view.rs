//! The catalog-facing notification seam.

use crate::catalog::ItemId;

/// Sink for catalog-visible ownership notifications.
///
/// The coordinator invokes these after its own state is settled, one event
/// at a time. Implementations must return quickly and must not block;
/// anything slow belongs behind a channel.
pub trait CatalogView: Send + Sync {
  /// An item transitioned from unowned to owned in the reconciled record.
  /// Fired exactly once per such transition.
  fn on_adopted(&self, item_id: ItemId);

  /// An adoption attempt failed: rejected at submission, reverted on
  /// commit, or lost to another account.
  fn on_submission_failed(&self, item_id: ItemId, reason: &str);

  /// An item's recorded owner changed in a way adoption cannot produce.
  fn on_anomalous_ownership(&self, item_id: ItemId);
}
