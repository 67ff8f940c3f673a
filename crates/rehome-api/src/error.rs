//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rehome_core::Error;
use serde_json::json;
use thiserror::Error as ThisError;

/// An error returned by an API handler.
#[derive(Debug, ThisError)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Domain(#[from] Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Domain(e) => (domain_status(e), e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

/// Status mapping for the domain taxonomy. Conflicts with ledger state are
/// 409s; ledger reachability problems surface as upstream failures.
fn domain_status(error: &Error) -> StatusCode {
  match error {
    Error::UnknownItem(_) => StatusCode::NOT_FOUND,
    Error::AlreadyOwned { .. }
    | Error::AlreadyInFlight(_)
    | Error::TransactionReverted { .. } => StatusCode::CONFLICT,
    Error::NoAccountAvailable
    | Error::NoProviderConfigured
    | Error::LedgerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    Error::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
    Error::ConfirmationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
    Error::InvalidAddress(_) | Error::InvalidTxHash(_) => {
      StatusCode::BAD_REQUEST
    }
    Error::InvalidCatalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
