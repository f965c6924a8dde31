//! Handlers for `/relationships` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/relationships/requests` | Body: `{"recipient_id":"<uuid>"}` |
//! | `GET`    | `/relationships/requests/incoming` | Pending requests sent to the caller |
//! | `GET`    | `/relationships/requests/outgoing` | Pending requests the caller sent |
//! | `POST`   | `/relationships/requests/:id/respond` | Body: `{"decision":"accept"}` |
//! | `DELETE` | `/relationships/:user_id` | Unfriend; frees the pair |
//! | `GET`    | `/relationships/:user_id/status` | Status relative to the caller |
//! | `GET`    | `/relationships/friends` | Accepted friends, most recent first |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kawan_core::{
  identity::Identity,
  relationship::{RelationshipEdge, RelationshipView, ResponseDecision},
  store::SocialStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── Create request ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
  pub recipient_id: Uuid,
}

/// `POST /relationships/requests` — body: `{"recipient_id":"<uuid>"}`
pub async fn create_request<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Json(body): Json<CreateRequestBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SocialStore,
{
  let edge = state
    .store
    .request(caller, body.recipient_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(edge)))
}

// ─── Request listings ────────────────────────────────────────────────────────

/// `GET /relationships/requests/incoming`
pub async fn incoming<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<RelationshipEdge>>, ApiError>
where
  S: SocialStore,
{
  let edges = state
    .store
    .incoming_requests(caller)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(edges))
}

/// `GET /relationships/requests/outgoing`
pub async fn outgoing<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<RelationshipEdge>>, ApiError>
where
  S: SocialStore,
{
  let edges = state
    .store
    .outgoing_requests(caller)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(edges))
}

// ─── Respond ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RespondBody {
  pub decision: ResponseDecision,
}

/// `POST /relationships/requests/:id/respond` — body:
/// `{"decision":"accept"|"reject"}`. Only the request recipient may call
/// this, exactly once.
pub async fn respond<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Path(edge_id): Path<Uuid>,
  Json(body): Json<RespondBody>,
) -> Result<Json<RelationshipEdge>, ApiError>
where
  S: SocialStore,
{
  let edge = state
    .store
    .respond(edge_id, caller, body.decision)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(edge))
}

// ─── Unfriend ────────────────────────────────────────────────────────────────

/// `DELETE /relationships/:user_id`
pub async fn unfriend<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Path(other): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore,
{
  state
    .store
    .remove(caller, other)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatusResponse {
  pub status: RelationshipView,
}

/// `GET /relationships/:user_id/status` — the relationship between the
/// caller and `:user_id`, from the caller's side.
pub async fn status<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Path(other): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError>
where
  S: SocialStore,
{
  let status = state
    .store
    .status_between(caller, other)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(StatusResponse { status }))
}

// ─── Friends ─────────────────────────────────────────────────────────────────

/// `GET /relationships/friends`
pub async fn friends<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<Identity>>, ApiError>
where
  S: SocialStore,
{
  let friends = state
    .store
    .friends_of(caller)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(friends))
}
