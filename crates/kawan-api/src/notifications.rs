//! Handlers for `/notifications` endpoints.
//!
//! Every operation is scoped to the caller's own ledger; a foreign
//! recipient id is never accepted from the client.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notifications` | Full feed, newest first, plus unread count |
//! | `POST`   | `/notifications/:id/read` | Idempotent |
//! | `POST`   | `/notifications/read-all` | Returns how many changed |
//! | `DELETE` | `/notifications/:id` | |
//! | `DELETE` | `/notifications` | Clears the ledger |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use kawan_core::{
  notification::{NotificationFeed, NotificationRecord},
  store::SocialStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, auth::Caller, error::ApiError};

// ─── Feed ────────────────────────────────────────────────────────────────────

/// `GET /notifications`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
) -> Result<Json<NotificationFeed>, ApiError>
where
  S: SocialStore,
{
  let feed = state
    .store
    .notifications(caller)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(feed))
}

// ─── Mark read ───────────────────────────────────────────────────────────────

/// `POST /notifications/:id/read`
pub async fn mark_read<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<NotificationRecord>, ApiError>
where
  S: SocialStore,
{
  let record = state
    .store
    .mark_read(caller, id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
  pub marked_read: u64,
}

/// `POST /notifications/read-all`
pub async fn mark_all_read<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
) -> Result<Json<MarkAllReadResponse>, ApiError>
where
  S: SocialStore,
{
  let marked_read = state
    .store
    .mark_all_read(caller)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(MarkAllReadResponse { marked_read }))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /notifications/:id`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SocialStore,
{
  state
    .store
    .remove_notification(caller, id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct RemoveAllResponse {
  pub removed: u64,
}

/// `DELETE /notifications`
pub async fn remove_all<S>(
  State(state): State<AppState<S>>,
  Caller(caller): Caller,
) -> Result<Json<RemoveAllResponse>, ApiError>
where
  S: SocialStore,
{
  let removed = state
    .store
    .remove_all_notifications(caller)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(RemoveAllResponse { removed }))
}
