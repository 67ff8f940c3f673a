//! Adoption engine: reconciliation, delta computation, and the coordinator.
//!
//! The engine keeps the local view of ownership consistent with the ledger
//! by reading the contract's full owner table, diffing it against the last
//! reconciled snapshot, and driving adoption submissions through an explicit
//! per-item state machine. It never trusts local submission outcomes over
//! what the ledger records: reconciliation is the authority.

pub mod coordinator;
pub mod diff;
pub mod notify;
pub mod reconcile;

pub use coordinator::{Coordinator, CoordinatorConfig};
pub use diff::diff;
pub use notify::LogView;
pub use reconcile::Reconciler;
