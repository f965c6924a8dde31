//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use kawan_core::error::AsDomainError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A domain-rule violation, mapped to a specific status code so clients
  /// see the conflict category rather than a generic failure.
  #[error(transparent)]
  Domain(kawan_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend error: surface the domain taxonomy when present, treat
  /// everything else as an internal store failure.
  pub fn from_store<E>(e: E) -> Self
  where
    E: AsDomainError + std::error::Error + Send + Sync + 'static,
  {
    match e.as_domain() {
      Some(domain) => ApiError::Domain(domain.clone()),
      None => ApiError::Store(Box::new(e)),
    }
  }
}

fn domain_status(e: &kawan_core::Error) -> StatusCode {
  use kawan_core::Error;
  match e {
    Error::SelfReference => StatusCode::BAD_REQUEST,
    Error::Conflict(_) | Error::NotPending(_) | Error::HandleTaken(_) => {
      StatusCode::CONFLICT
    }
    Error::EdgeNotFound(_)
    | Error::FriendshipNotFound(..)
    | Error::NotificationNotFound(_)
    | Error::UserNotFound(_) => StatusCode::NOT_FOUND,
    Error::NotRecipient => StatusCode::FORBIDDEN,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Domain(e) => (domain_status(e), e.to_string()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
