//! Store traits implemented by storage backends (e.g. `kawan-store-sqlite`).
//!
//! Higher layers (`kawan-api`, the notification pipeline) depend on these
//! abstractions, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  error::AsDomainError,
  identity::{Identity, NewIdentity},
  notification::{
    AppendOutcome, NewNotification, NotificationFeed, NotificationRecord,
  },
  relationship::{RelationshipEdge, RelationshipView, ResponseDecision},
};

// ─── Identities ──────────────────────────────────────────────────────────────

/// Handle resolution and identity bootstrap.
///
/// Registration proper (credentials, validation UX) belongs to the auth
/// collaborator; it calls [`IdentityStore::add_identity`] once a signup
/// succeeds.
pub trait IdentityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create an identity. Fails if the handle is already taken
  /// (case-insensitively).
  fn add_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Retrieve an identity by id. Returns `None` if not found.
  fn identity(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// Case-insensitive handle lookup. `None` for unknown handles — an
  /// unresolvable mention is not an error.
  fn identity_by_handle<'a>(
    &'a self,
    handle: &'a str,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + 'a;
}

// ─── Relationships ───────────────────────────────────────────────────────────

/// Friendship edges between two identities.
///
/// At most one edge exists per unordered pair at any time. Backends must
/// enforce this with a uniqueness constraint on the normalised pair key so
/// that two simultaneous requests from both sides collapse into a single
/// conflict rather than two edges.
pub trait RelationshipStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create a pending edge from `requester` to `recipient`.
  ///
  /// Fails on self-reference, unknown recipient, or any existing edge
  /// between the pair (the error carries the specific conflict category).
  fn request(
    &self,
    requester: Uuid,
    recipient: Uuid,
  ) -> impl Future<Output = Result<RelationshipEdge, Self::Error>> + Send + '_;

  /// Accept or reject a pending request. Only the recipient may respond,
  /// exactly once.
  fn respond(
    &self,
    edge_id: Uuid,
    acting_user: Uuid,
    decision: ResponseDecision,
  ) -> impl Future<Output = Result<RelationshipEdge, Self::Error>> + Send + '_;

  /// Delete the accepted edge between the pair entirely (unfriend), in
  /// either direction. The pair is then free to form a new edge.
  fn remove(
    &self,
    user_a: Uuid,
    user_b: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// True iff an accepted edge exists between the pair, queried through
  /// the unordered pair index.
  fn are_friends(
    &self,
    user_a: Uuid,
    user_b: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The relationship between `viewpoint` and `other`, from `viewpoint`'s
  /// side. Pure derived view, no side effects.
  fn status_between(
    &self,
    viewpoint: Uuid,
    other: Uuid,
  ) -> impl Future<Output = Result<RelationshipView, Self::Error>> + Send + '_;

  /// Pending requests sent to `user`, newest first.
  fn incoming_requests(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<RelationshipEdge>, Self::Error>> + Send + '_;

  /// Pending requests `user` sent, newest first.
  fn outgoing_requests(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<RelationshipEdge>, Self::Error>> + Send + '_;

  /// Identities of all accepted friends of `user`, most recently accepted
  /// first.
  fn friends_of(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<Identity>, Self::Error>> + Send + '_;
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// Per-recipient notification ledgers.
///
/// `append` must be an atomic insert-if-absent on
/// `(recipient, from_user, content_ref)` — never fetch-then-save — so
/// concurrent mentions of the same content cannot double-insert.
pub trait NotificationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert at the head of the recipient's ledger, or return the existing
  /// record if the dedup constraint is already occupied.
  fn append(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<AppendOutcome, Self::Error>> + Send + '_;

  /// Mark one record read and stamp `read_at`. Idempotent: an
  /// already-read record is returned unchanged.
  fn mark_read(
    &self,
    recipient: Uuid,
    notification_id: Uuid,
  ) -> impl Future<Output = Result<NotificationRecord, Self::Error>> + Send + '_;

  /// Mark every unread record read. Returns how many records changed.
  fn mark_all_read(
    &self,
    recipient: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete one record unconditionally.
  fn remove_notification(
    &self,
    recipient: Uuid,
    notification_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete the recipient's whole ledger. Returns how many records were
  /// removed.
  fn remove_all_notifications(
    &self,
    recipient: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// The recipient's full feed, descending by `created_at`, with the
  /// derived unread count.
  fn notifications(
    &self,
    recipient: Uuid,
  ) -> impl Future<Output = Result<NotificationFeed, Self::Error>> + Send + '_;

  /// Recipients holding at least one read notification — the ledgers a
  /// retention sweep must visit.
  fn recipients_with_read_notifications(
    &self,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Atomically delete the recipient's notifications read before `cutoff`
  /// (single delete-matching statement, not read-modify-write). Records
  /// with a null `read_at` are never touched, read or not.
  fn prune_read_before(
    &self,
    recipient: Uuid,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Full surface ────────────────────────────────────────────────────────────

/// Convenience bound for backends implementing the full store surface with
/// a single error type. Blanket-implemented; backends never implement this
/// directly.
pub trait SocialStore:
  IdentityStore<Error = <Self as SocialStore>::BackendError>
  + RelationshipStore<Error = <Self as SocialStore>::BackendError>
  + NotificationStore<Error = <Self as SocialStore>::BackendError>
{
  type BackendError: std::error::Error + AsDomainError + Send + Sync + 'static;
}

impl<T, E> SocialStore for T
where
  E: std::error::Error + AsDomainError + Send + Sync + 'static,
  T: IdentityStore<Error = E>
    + RelationshipStore<Error = E>
    + NotificationStore<Error = E>,
{
  type BackendError = E;
}
