//! Error taxonomy for the social-graph core.
//!
//! Mention-resolution misses and notification dedup no-ops are not errors;
//! they are silent outcomes of normal operation and never appear here.

use thiserror::Error;
use uuid::Uuid;

use crate::relationship::RelationshipStatus;

/// Why a friend request against an existing edge was refused.
///
/// Surfaced verbatim to the requester so the client can show the specific
/// conflict rather than a generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
  AlreadyFriends,
  RequestPending,
  RequestRejected,
  Blocked,
}

impl std::fmt::Display for ConflictKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let msg = match self {
      ConflictKind::AlreadyFriends => "you are already friends with this user",
      ConflictKind::RequestPending => {
        "a friend request between you is still pending"
      }
      ConflictKind::RequestRejected => {
        "an earlier friend request between you was rejected"
      }
      ConflictKind::Blocked => "this user is blocked",
    };
    f.write_str(msg)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("cannot send a friend request to yourself")]
  SelfReference,

  #[error("{0}")]
  Conflict(ConflictKind),

  #[error("friend request {0} not found")]
  EdgeNotFound(Uuid),

  #[error("no accepted friendship between {0} and {1}")]
  FriendshipNotFound(Uuid, Uuid),

  #[error("notification {0} not found")]
  NotificationNotFound(Uuid),

  #[error("user {0} not found")]
  UserNotFound(Uuid),

  /// Only the recipient of a pending request may accept or reject it.
  #[error("only the request recipient may respond to it")]
  NotRecipient,

  /// Accept/reject attempted on an edge that already left `pending`.
  #[error("friend request is already {0}")]
  NotPending(RelationshipStatus),

  #[error("handle {0:?} is already taken")]
  HandleTaken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so transport layers can map the
/// domain taxonomy to status codes without naming a concrete backend.
pub trait AsDomainError {
  /// The domain-taxonomy error behind this error, if any.
  fn as_domain(&self) -> Option<&Error>;
}
