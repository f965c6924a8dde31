//! Notification records and the per-recipient feed.
//!
//! Every record is owned by exactly one recipient. Mutation is confined to
//! that recipient's own read/delete actions, pipeline appends on their
//! behalf, and the retention sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
  Mention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
  pub notification_id: Uuid,
  pub recipient:       Uuid,
  pub kind:            NotificationKind,
  pub from_user:       Uuid,
  /// Denormalised sender handle so a feed renders without a join.
  pub from_handle:     String,
  /// The post the notification refers to.
  pub content_ref:     Uuid,
  /// Pre-rendered text, composed by the pipeline.
  pub message:         String,
  pub is_read:         bool,
  pub read_at:         Option<DateTime<Utc>>,
  pub created_at:      DateTime<Utc>,
}

/// Input for appending a notification to a recipient's ledger.
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub recipient:   Uuid,
  pub kind:        NotificationKind,
  pub from_user:   Uuid,
  pub from_handle: String,
  pub content_ref: Uuid,
  pub message:     String,
}

/// Whether an append inserted a fresh record or hit the
/// `(recipient, from_user, content_ref)` dedup constraint.
#[derive(Debug, Clone)]
pub enum AppendOutcome {
  Inserted(NotificationRecord),
  Duplicate(NotificationRecord),
}

impl AppendOutcome {
  pub fn record(&self) -> &NotificationRecord {
    match self {
      AppendOutcome::Inserted(r) | AppendOutcome::Duplicate(r) => r,
    }
  }

  pub fn is_duplicate(&self) -> bool {
    matches!(self, AppendOutcome::Duplicate(_))
  }
}

/// A recipient's full feed, newest first, with the derived unread count.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationFeed {
  pub notifications: Vec<NotificationRecord>,
  pub unread_count:  usize,
}
