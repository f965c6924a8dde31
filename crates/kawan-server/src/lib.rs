//! Kawan server assembly: configuration, router, retention scheduler.
//!
//! The binary in `main.rs` wires a [`kawan_store_sqlite::SqliteStore`]
//! into the [`kawan_api`] router, starts the [`scheduler`] and serves
//! HTTP. The end-to-end tests at the bottom drive the whole surface
//! through `tower::ServiceExt`.

pub mod scheduler;

use std::path::PathBuf;

use axum::Router;
use kawan_api::AppState;
use kawan_core::store::SocialStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 4000 }
fn default_retention_window_hours() -> i64 { 24 }
fn default_sweep_interval_secs() -> u64 { 3600 }

/// Runtime server configuration, deserialised from `config.toml` with
/// `KAWAN_`-prefixed environment overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  pub store_path: PathBuf,
  /// Minimum read age before a read notification becomes prunable.
  #[serde(default = "default_retention_window_hours")]
  pub retention_window_hours: i64,
  /// How often the retention sweep runs.
  #[serde(default = "default_sweep_interval_secs")]
  pub sweep_interval_secs: u64,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application router: the API surface plus request tracing.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: SocialStore + Clone + Send + Sync + 'static,
{
  kawan_api::api_router(state).layer(TraceLayer::new_for_http())
}

// ─── End-to-end tests ─────────────────────────────────────────────────────────
