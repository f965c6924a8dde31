//! Read-notification retention sweeping.
//!
//! A sweep visits every ledger holding read notifications and deletes the
//! records whose read age exceeds the retention window. Unread records are
//! never touched. The recurring scheduler in the server crate and the
//! on-demand maintenance endpoint share one sweeper, whose in-flight gate
//! keeps at most one sweep executing at a time.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::store::NotificationStore;

/// Outcome of one sweep run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepSummary {
  /// True when the run was skipped because another sweep was in flight.
  pub skipped:        bool,
  /// Ledgers visited.
  pub ledgers:        usize,
  /// Records deleted across all ledgers.
  pub removed:        u64,
  /// Ledgers whose prune failed; their records survive until the next
  /// sweep.
  pub failed_ledgers: usize,
}

pub struct RetentionSweeper<S> {
  store:     S,
  window:    Duration,
  in_flight: AtomicBool,
}

impl<S: NotificationStore> RetentionSweeper<S> {
  pub fn new(store: S, window: Duration) -> Self {
    Self { store, window, in_flight: AtomicBool::new(false) }
  }

  /// The minimum read age before a read record becomes prunable.
  pub fn window(&self) -> Duration { self.window }

  /// Run one sweep at `now`.
  ///
  /// Ledger failures are logged and the sweep continues; the run never
  /// fails as a whole. If a previous run is still executing (an overrun
  /// into the next scheduled tick, or an on-demand trigger racing the
  /// schedule), the run is skipped rather than queued.
  pub async fn run_once(&self, now: DateTime<Utc>) -> SweepSummary {
    if self
      .in_flight
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      info!("retention sweep already in flight, skipping this run");
      return SweepSummary { skipped: true, ..SweepSummary::default() };
    }
    let summary = self.sweep(now).await;
    self.in_flight.store(false, Ordering::Release);
    summary
  }

  async fn sweep(&self, now: DateTime<Utc>) -> SweepSummary {
    let cutoff = now - self.window;
    let mut summary = SweepSummary::default();

    let recipients = match self.store.recipients_with_read_notifications().await
    {
      Ok(recipients) => recipients,
      Err(e) => {
        warn!(error = %e, "retention sweep: ledger scan failed");
        return summary;
      }
    };

    for recipient in recipients {
      summary.ledgers += 1;
      match self.store.prune_read_before(recipient, cutoff).await {
        Ok(removed) => summary.removed += removed,
        Err(e) => {
          warn!(%recipient, error = %e, "retention sweep: prune failed");
          summary.failed_ledgers += 1;
        }
      }
    }

    info!(
      ledgers = summary.ledgers,
      removed = summary.removed,
      failed = summary.failed_ledgers,
      "retention sweep complete"
    );
    summary
  }
}
