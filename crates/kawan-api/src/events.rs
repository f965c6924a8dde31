//! The content-created event hook.
//!
//! Invoked synchronously by the content-creation collaborator after it
//! persists the content. The mention pipeline is best-effort, so this
//! endpoint always acknowledges the event — a notification failure must
//! never roll back content creation.

use axum::{Json, extract::State, http::StatusCode};
use kawan_core::{
  notifier::{self, MentionSummary},
  store::SocialStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContentCreatedBody {
  pub author:      Uuid,
  pub content_ref: Uuid,
  pub text:        String,
}

/// `POST /events/content-created` — body:
/// `{"author":"<uuid>","content_ref":"<uuid>","text":"..."}`.
///
/// Returns `202 Accepted` with the pipeline summary, regardless of how
/// many candidates resolved.
pub async fn content_created<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<ContentCreatedBody>,
) -> (StatusCode, Json<MentionSummary>)
where
  S: SocialStore,
{
  let summary = notifier::process_content(
    state.store.as_ref(),
    body.author,
    body.content_ref,
    &body.text,
  )
  .await;
  (StatusCode::ACCEPTED, Json(summary))
}
