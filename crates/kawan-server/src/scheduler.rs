//! The recurring retention sweep task.
//!
//! An explicit service object constructed once at process init — never a
//! module-level interval handle. `start` spawns the tokio interval task;
//! `stop` signals shutdown and waits for it to finish. Overlap protection
//! lives in the sweeper itself, so an on-demand sweep triggered through
//! the maintenance endpoint and a scheduled run never execute
//! concurrently, and an overrun into the next tick is skipped rather than
//! stacked.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use kawan_core::{retention::RetentionSweeper, store::NotificationStore};
use tokio::{sync::watch, task::JoinHandle, time};
use tracing::info;

pub struct RetentionScheduler {
  shutdown: watch::Sender<bool>,
  handle:   Option<JoinHandle<()>>,
}

impl RetentionScheduler {
  /// Spawn the recurring sweep task, firing every `every`.
  pub fn start<S>(sweeper: Arc<RetentionSweeper<S>>, every: Duration) -> Self
  where
    S: NotificationStore + 'static,
  {
    let (shutdown, mut rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
      let mut ticker = time::interval(every);
      ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
      // An interval's first tick fires immediately; consume it so the
      // first sweep happens one full period after startup.
      ticker.tick().await;

      loop {
        tokio::select! {
          _ = ticker.tick() => {
            sweeper.run_once(Utc::now()).await;
          }
          _ = rx.changed() => {
            info!("retention scheduler stopping");
            break;
          }
        }
      }
    });

    info!(every_secs = every.as_secs(), "retention scheduler started");
    Self { shutdown, handle: Some(handle) }
  }

  /// Signal shutdown and wait for the task to finish. A sweep already in
  /// progress runs to completion.
  pub async fn stop(mut self) {
    let _ = self.shutdown.send(true);
    if let Some(handle) = self.handle.take() {
      let _ = handle.await;
    }
  }
}
