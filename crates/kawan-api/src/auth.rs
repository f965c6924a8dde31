//! Caller identity extraction.
//!
//! Token issuance and verification live in the fronting auth layer; by the
//! time a request reaches this router the caller has been authenticated
//! and their user id injected as the `X-User-Id` header. Handlers scope
//! every ledger operation to this id and never accept a foreign recipient
//! id from the request body.

use axum::{
  extract::FromRequestParts,
  http::{StatusCode, request::Parts},
};
use uuid::Uuid;

/// The authenticated caller, read from `X-User-Id`.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = (StatusCode, &'static str);

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get("x-user-id")
      .and_then(|v| v.to_str().ok())
      .ok_or((StatusCode::UNAUTHORIZED, "missing X-User-Id header"))?;
    let id = Uuid::parse_str(raw)
      .map_err(|_| (StatusCode::UNAUTHORIZED, "malformed X-User-Id header"))?;
    Ok(Caller(id))
  }
}
