//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (which also makes the
//! retention cutoff comparable in SQL). UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use kawan_core::{
  identity::Identity,
  notification::{NotificationKind, NotificationRecord},
  relationship::{RelationshipEdge, RelationshipStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RelationshipStatus ──────────────────────────────────────────────────────

pub fn encode_status(s: RelationshipStatus) -> &'static str {
  match s {
    RelationshipStatus::Pending => "pending",
    RelationshipStatus::Accepted => "accepted",
    RelationshipStatus::Rejected => "rejected",
    RelationshipStatus::Blocked => "blocked",
  }
}

pub fn decode_status(s: &str) -> Result<RelationshipStatus> {
  match s {
    "pending" => Ok(RelationshipStatus::Pending),
    "accepted" => Ok(RelationshipStatus::Accepted),
    "rejected" => Ok(RelationshipStatus::Rejected),
    "blocked" => Ok(RelationshipStatus::Blocked),
    other => Err(Error::Decode(format!("unknown relationship status: {other:?}"))),
  }
}

// ─── NotificationKind ────────────────────────────────────────────────────────

pub fn encode_kind(k: NotificationKind) -> &'static str {
  match k {
    NotificationKind::Mention => "mention",
  }
}

pub fn decode_kind(s: &str) -> Result<NotificationKind> {
  match s {
    "mention" => Ok(NotificationKind::Mention),
    other => Err(Error::Decode(format!("unknown notification kind: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawIdentity {
  pub user_id:      String,
  pub handle:       String,
  pub display_name: String,
  pub created_at:   String,
}

impl RawIdentity {
  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      user_id:      decode_uuid(&self.user_id)?,
      handle:       self.handle,
      display_name: self.display_name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `relationships` row.
pub struct RawEdge {
  pub edge_id:    String,
  pub requester:  String,
  pub recipient:  String,
  pub status:     String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawEdge {
  pub fn into_edge(self) -> Result<RelationshipEdge> {
    Ok(RelationshipEdge {
      edge_id:    decode_uuid(&self.edge_id)?,
      requester:  decode_uuid(&self.requester)?,
      recipient:  decode_uuid(&self.recipient)?,
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub recipient:       String,
  pub kind:            String,
  pub from_user:       String,
  pub from_handle:     String,
  pub content_ref:     String,
  pub message:         String,
  pub is_read:         bool,
  pub read_at:         Option<String>,
  pub created_at:      String,
}

impl RawNotification {
  pub fn into_record(self) -> Result<NotificationRecord> {
    Ok(NotificationRecord {
      notification_id: decode_uuid(&self.notification_id)?,
      recipient:       decode_uuid(&self.recipient)?,
      kind:            decode_kind(&self.kind)?,
      from_user:       decode_uuid(&self.from_user)?,
      from_handle:     self.from_handle,
      content_ref:     decode_uuid(&self.content_ref)?,
      message:         self.message,
      is_read:         self.is_read,
      read_at:         self.read_at.as_deref().map(decode_dt).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
