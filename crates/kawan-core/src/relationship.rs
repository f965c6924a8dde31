//! The friendship edge and its closed state machine.
//!
//! A directed request converges to an undirected relationship once
//! accepted. Every legal transition is validated here; call sites never
//! compare status strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConflictKind, Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
  Pending,
  Accepted,
  Rejected,
  Blocked,
}

impl RelationshipStatus {
  /// The conflict category a new request against an edge in this status
  /// runs into.
  pub fn conflict_kind(self) -> ConflictKind {
    match self {
      RelationshipStatus::Accepted => ConflictKind::AlreadyFriends,
      RelationshipStatus::Pending => ConflictKind::RequestPending,
      RelationshipStatus::Rejected => ConflictKind::RequestRejected,
      RelationshipStatus::Blocked => ConflictKind::Blocked,
    }
  }
}

impl std::fmt::Display for RelationshipStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      RelationshipStatus::Pending => "pending",
      RelationshipStatus::Accepted => "accepted",
      RelationshipStatus::Rejected => "rejected",
      RelationshipStatus::Blocked => "blocked",
    })
  }
}

/// A recipient's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseDecision {
  Accept,
  Reject,
}

// ─── Pair key ────────────────────────────────────────────────────────────────

/// The two user ids of an edge in ascending order.
///
/// Both directions of a pair map to the same key, so a uniqueness
/// constraint on it collapses simultaneous bidirectional requests into a
/// single conflict and every lookup hits the same row regardless of which
/// side is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
  pub lo: Uuid,
  pub hi: Uuid,
}

impl PairKey {
  pub fn new(a: Uuid, b: Uuid) -> Self {
    if a <= b { Self { lo: a, hi: b } } else { Self { lo: b, hi: a } }
  }
}

// ─── Edge ────────────────────────────────────────────────────────────────────

/// A relationship record between two identities.
///
/// Created in `pending` by the requester; moved to `accepted` or `rejected`
/// exactly once, by the recipient. Accepted edges are destroyed entirely on
/// unfriend, which frees the pair for a new request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEdge {
  pub edge_id:    Uuid,
  pub requester:  Uuid,
  pub recipient:  Uuid,
  pub status:     RelationshipStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl RelationshipEdge {
  pub fn pair(&self) -> PairKey { PairKey::new(self.requester, self.recipient) }

  /// Validate an accept/reject transition by `actor` and return the target
  /// status.
  ///
  /// Only the recipient may respond, and only while the edge is still
  /// pending. The edge itself is not mutated; the store applies the
  /// returned status under its own concurrency guard.
  pub fn respond(
    &self,
    actor: Uuid,
    decision: ResponseDecision,
  ) -> Result<RelationshipStatus> {
    if actor != self.recipient {
      return Err(Error::NotRecipient);
    }
    if self.status != RelationshipStatus::Pending {
      return Err(Error::NotPending(self.status));
    }
    Ok(match decision {
      ResponseDecision::Accept => RelationshipStatus::Accepted,
      ResponseDecision::Reject => RelationshipStatus::Rejected,
    })
  }

  /// Derive the presentation view of this edge from `viewpoint`'s side.
  pub fn view_for(&self, viewpoint: Uuid) -> RelationshipView {
    match self.status {
      RelationshipStatus::Accepted => RelationshipView::Accepted,
      RelationshipStatus::Blocked => RelationshipView::Blocked,
      RelationshipStatus::Pending if self.requester == viewpoint => {
        RelationshipView::PendingSent
      }
      RelationshipStatus::Pending => RelationshipView::PendingReceived,
      // A rejected edge still blocks re-requests but is not surfaced.
      RelationshipStatus::Rejected => RelationshipView::None,
    }
  }
}

/// Relationship status relative to one side of the pair — a pure derived
/// view for presentation layers, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipView {
  None,
  PendingSent,
  PendingReceived,
  Accepted,
  Blocked,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
