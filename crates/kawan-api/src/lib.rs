//! JSON REST API for the Kawan social-graph core.
//!
//! Exposes an axum [`Router`] backed by any store implementing the core
//! traits. Transport concerns and token verification belong to the caller;
//! the authenticating front layer injects the caller's id as the
//! `X-User-Id` header (see [`auth::Caller`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kawan_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod events;
pub mod maintenance;
pub mod notifications;
pub mod relationships;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use kawan_core::{retention::RetentionSweeper, store::SocialStore};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:   Arc<S>,
  /// Shared with the recurring scheduler, so an on-demand sweep and a
  /// scheduled one never run concurrently.
  pub sweeper: Arc<RetentionSweeper<S>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), sweeper: self.sweeper.clone() }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: SocialStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Relationships
    .route(
      "/relationships/requests",
      post(relationships::create_request::<S>),
    )
    .route(
      "/relationships/requests/incoming",
      get(relationships::incoming::<S>),
    )
    .route(
      "/relationships/requests/outgoing",
      get(relationships::outgoing::<S>),
    )
    .route(
      "/relationships/requests/{id}/respond",
      post(relationships::respond::<S>),
    )
    .route("/relationships/friends", get(relationships::friends::<S>))
    .route("/relationships/{user_id}", delete(relationships::unfriend::<S>))
    .route(
      "/relationships/{user_id}/status",
      get(relationships::status::<S>),
    )
    // Notifications
    .route(
      "/notifications",
      get(notifications::list::<S>).delete(notifications::remove_all::<S>),
    )
    .route(
      "/notifications/read-all",
      post(notifications::mark_all_read::<S>),
    )
    .route(
      "/notifications/{id}/read",
      post(notifications::mark_read::<S>),
    )
    .route("/notifications/{id}", delete(notifications::remove::<S>))
    // Content events
    .route("/events/content-created", post(events::content_created::<S>))
    // Maintenance (ops-only; mount behind an internal route guard)
    .route(
      "/maintenance/retention-sweep",
      post(maintenance::run_retention_sweep::<S>),
    )
    .with_state(state)
}
