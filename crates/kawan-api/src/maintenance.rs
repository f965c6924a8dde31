//! Ops-only maintenance endpoints.

use axum::{Json, extract::State};
use chrono::Utc;
use kawan_core::{retention::SweepSummary, store::SocialStore};

use crate::AppState;

/// `POST /maintenance/retention-sweep` — run the retention sweep now.
///
/// Shares the sweeper (and its in-flight gate) with the recurring
/// scheduler, so triggering this during a scheduled run reports
/// `skipped: true` instead of sweeping twice.
pub async fn run_retention_sweep<S>(
  State(state): State<AppState<S>>,
) -> Json<SweepSummary>
where
  S: SocialStore,
{
  Json(state.sweeper.run_once(Utc::now()).await)
}
