//! Integration tests for `SqliteStore` against an in-memory database.
//!
//! The mention pipeline and the retention sweep are exercised here too,
//! since both are generic over the store traits and this is the concrete
//! backend they ship with.

use chrono::{Duration, Utc};
use kawan_core::{
  error::ConflictKind,
  identity::{Identity, NewIdentity},
  notification::{NewNotification, NotificationKind},
  notifier::process_content,
  relationship::{RelationshipStatus, RelationshipView, ResponseDecision},
  retention::RetentionSweeper,
  store::{IdentityStore, NotificationStore, RelationshipStore},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, handle: &str) -> Identity {
  s.add_identity(NewIdentity {
    handle:       handle.to_owned(),
    display_name: handle.to_owned(),
  })
  .await
  .unwrap()
}

/// Make `a` and `b` accepted friends via the normal request/accept flow.
async fn befriend(s: &SqliteStore, a: &Identity, b: &Identity) {
  let edge = s.request(a.user_id, b.user_id).await.unwrap();
  s.respond(edge.edge_id, b.user_id, ResponseDecision::Accept)
    .await
    .unwrap();
}

fn mention_input(from: &Identity, to: &Identity, content_ref: Uuid) -> NewNotification {
  NewNotification {
    recipient:   to.user_id,
    kind:        NotificationKind::Mention,
    from_user:   from.user_id,
    from_handle: from.handle.clone(),
    content_ref,
    message:     format!("@{} mentioned you in a post", from.handle),
  }
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_identity() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let fetched = s.identity(alice.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, alice.user_id);
  assert_eq!(fetched.handle, "alice");
}

#[tokio::test]
async fn identity_missing_returns_none() {
  let s = store().await;
  assert!(s.identity(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn handle_lookup_is_case_insensitive() {
  let s = store().await;
  let alice = user(&s, "Alice").await;

  let fetched = s.identity_by_handle("aLiCe").await.unwrap().unwrap();
  assert_eq!(fetched.user_id, alice.user_id);

  assert!(s.identity_by_handle("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn handle_collision_is_case_insensitive() {
  let s = store().await;
  user(&s, "alice").await;

  let err = s
    .add_identity(NewIdentity {
      handle:       "ALICE".to_owned(),
      display_name: "other".to_owned(),
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::HandleTaken(_))
  ));
}

// ─── Relationship requests ───────────────────────────────────────────────────

#[tokio::test]
async fn request_creates_pending_edge() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let edge = s.request(alice.user_id, bob.user_id).await.unwrap();
  assert_eq!(edge.requester, alice.user_id);
  assert_eq!(edge.recipient, bob.user_id);
  assert_eq!(edge.status, RelationshipStatus::Pending);
}

#[tokio::test]
async fn request_to_self_errors() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let err = s.request(alice.user_id, alice.user_id).await.unwrap_err();
  assert!(matches!(err, Error::Domain(kawan_core::Error::SelfReference)));
}

#[tokio::test]
async fn request_to_unknown_user_errors() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let ghost = Uuid::new_v4();

  let err = s.request(alice.user_id, ghost).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::UserNotFound(id)) if id == ghost
  ));
}

#[tokio::test]
async fn duplicate_request_reports_pending_conflict() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  s.request(alice.user_id, bob.user_id).await.unwrap();
  let err = s.request(alice.user_id, bob.user_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::Conflict(ConflictKind::RequestPending))
  ));
}

#[tokio::test]
async fn reverse_request_collapses_into_single_conflict() {
  // A requests B; before B responds, B independently requests A. The
  // second request must fail and exactly one edge must exist.
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  s.request(alice.user_id, bob.user_id).await.unwrap();
  let err = s.request(bob.user_id, alice.user_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::Conflict(ConflictKind::RequestPending))
  ));

  assert_eq!(s.incoming_requests(bob.user_id).await.unwrap().len(), 1);
  assert!(s.incoming_requests(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn request_against_accepted_edge_reports_already_friends() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  befriend(&s, &alice, &bob).await;

  // Both directions hit the same edge.
  for (from, to) in [(&alice, &bob), (&bob, &alice)] {
    let err = s.request(from.user_id, to.user_id).await.unwrap_err();
    assert!(matches!(
      err,
      Error::Domain(kawan_core::Error::Conflict(ConflictKind::AlreadyFriends))
    ));
  }
}

// ─── Responding ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn accept_makes_friends_in_both_directions() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let edge = s.request(alice.user_id, bob.user_id).await.unwrap();
  let edge = s
    .respond(edge.edge_id, bob.user_id, ResponseDecision::Accept)
    .await
    .unwrap();
  assert_eq!(edge.status, RelationshipStatus::Accepted);

  assert!(s.are_friends(alice.user_id, bob.user_id).await.unwrap());
  assert!(s.are_friends(bob.user_id, alice.user_id).await.unwrap());
}

#[tokio::test]
async fn reject_leaves_pair_blocked_from_rerequest() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let edge = s.request(alice.user_id, bob.user_id).await.unwrap();
  s.respond(edge.edge_id, bob.user_id, ResponseDecision::Reject)
    .await
    .unwrap();

  assert!(!s.are_friends(alice.user_id, bob.user_id).await.unwrap());

  let err = s.request(alice.user_id, bob.user_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::Conflict(ConflictKind::RequestRejected))
  ));
}

#[tokio::test]
async fn only_recipient_may_respond() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  let edge = s.request(alice.user_id, bob.user_id).await.unwrap();

  for actor in [alice.user_id, carol.user_id] {
    let err = s
      .respond(edge.edge_id, actor, ResponseDecision::Accept)
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      Error::Domain(kawan_core::Error::NotRecipient)
    ));
  }
}

#[tokio::test]
async fn responding_twice_is_invalid_and_leaves_edge_unchanged() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let edge = s.request(alice.user_id, bob.user_id).await.unwrap();
  s.respond(edge.edge_id, bob.user_id, ResponseDecision::Accept)
    .await
    .unwrap();

  let err = s
    .respond(edge.edge_id, bob.user_id, ResponseDecision::Reject)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::NotPending(RelationshipStatus::Accepted))
  ));

  // The edge stays accepted.
  assert!(s.are_friends(alice.user_id, bob.user_id).await.unwrap());
}

#[tokio::test]
async fn respond_on_unknown_edge_errors() {
  let s = store().await;
  let bob = user(&s, "bob").await;

  let err = s
    .respond(Uuid::new_v4(), bob.user_id, ResponseDecision::Accept)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::EdgeNotFound(_))
  ));
}

// ─── Unfriending ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_frees_pair_for_new_request() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  befriend(&s, &alice, &bob).await;

  // Either party may unfriend; order of arguments is irrelevant.
  s.remove(bob.user_id, alice.user_id).await.unwrap();
  assert!(!s.are_friends(alice.user_id, bob.user_id).await.unwrap());

  // The previous edge is gone entirely, so a fresh request succeeds.
  let edge = s.request(alice.user_id, bob.user_id).await.unwrap();
  assert_eq!(edge.status, RelationshipStatus::Pending);
}

#[tokio::test]
async fn remove_without_accepted_edge_errors() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let err = s.remove(alice.user_id, bob.user_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::FriendshipNotFound(..))
  ));

  // A pending request is not removable either; it is settled via respond.
  s.request(alice.user_id, bob.user_id).await.unwrap();
  let err = s.remove(alice.user_id, bob.user_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::FriendshipNotFound(..))
  ));
}

// ─── Status views and listings ───────────────────────────────────────────────

#[tokio::test]
async fn status_between_reflects_viewpoint() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  let edge = s.request(alice.user_id, bob.user_id).await.unwrap();
  assert_eq!(
    s.status_between(alice.user_id, bob.user_id).await.unwrap(),
    RelationshipView::PendingSent
  );
  assert_eq!(
    s.status_between(bob.user_id, alice.user_id).await.unwrap(),
    RelationshipView::PendingReceived
  );
  assert_eq!(
    s.status_between(alice.user_id, carol.user_id).await.unwrap(),
    RelationshipView::None
  );

  s.respond(edge.edge_id, bob.user_id, ResponseDecision::Accept)
    .await
    .unwrap();
  assert_eq!(
    s.status_between(alice.user_id, bob.user_id).await.unwrap(),
    RelationshipView::Accepted
  );
  assert_eq!(
    s.status_between(bob.user_id, alice.user_id).await.unwrap(),
    RelationshipView::Accepted
  );
}

#[tokio::test]
async fn incoming_and_outgoing_requests() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  s.request(alice.user_id, bob.user_id).await.unwrap();
  s.request(carol.user_id, bob.user_id).await.unwrap();

  let incoming = s.incoming_requests(bob.user_id).await.unwrap();
  assert_eq!(incoming.len(), 2);
  assert!(incoming.iter().all(|e| e.recipient == bob.user_id));

  let outgoing = s.outgoing_requests(alice.user_id).await.unwrap();
  assert_eq!(outgoing.len(), 1);
  assert_eq!(outgoing[0].recipient, bob.user_id);

  assert!(s.incoming_requests(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn friends_of_lists_both_sides_of_the_edge() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  befriend(&s, &alice, &bob).await;
  befriend(&s, &carol, &alice).await;

  let friends: Vec<_> = s
    .friends_of(alice.user_id)
    .await
    .unwrap()
    .into_iter()
    .map(|i| i.handle)
    .collect();
  assert_eq!(friends.len(), 2);
  assert!(friends.contains(&"bob".to_owned()));
  assert!(friends.contains(&"carol".to_owned()));

  let friends_of_bob = s.friends_of(bob.user_id).await.unwrap();
  assert_eq!(friends_of_bob.len(), 1);
  assert_eq!(friends_of_bob[0].user_id, alice.user_id);
}

// ─── Notification ledger ─────────────────────────────────────────────────────

#[tokio::test]
async fn append_and_list_newest_first() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  s.append(mention_input(&carol, &bob, Uuid::new_v4())).await.unwrap();

  let feed = s.notifications(bob.user_id).await.unwrap();
  assert_eq!(feed.notifications.len(), 2);
  assert_eq!(feed.unread_count, 2);
  assert!(
    feed.notifications[0].created_at >= feed.notifications[1].created_at
  );
  assert!(feed.notifications.iter().all(|n| n.recipient == bob.user_id));
}

#[tokio::test]
async fn append_same_triple_is_deduplicated() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let post = Uuid::new_v4();

  let first = s.append(mention_input(&alice, &bob, post)).await.unwrap();
  assert!(!first.is_duplicate());

  let second = s.append(mention_input(&alice, &bob, post)).await.unwrap();
  assert!(second.is_duplicate());
  assert_eq!(
    second.record().notification_id,
    first.record().notification_id
  );

  let feed = s.notifications(bob.user_id).await.unwrap();
  assert_eq!(feed.notifications.len(), 1);
}

#[tokio::test]
async fn same_author_different_content_notifies_again() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();

  let feed = s.notifications(bob.user_id).await.unwrap();
  assert_eq!(feed.notifications.len(), 2);
}

#[tokio::test]
async fn mark_read_stamps_read_at_once() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let outcome = s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  let id = outcome.record().notification_id;

  let read = s.mark_read(bob.user_id, id).await.unwrap();
  assert!(read.is_read);
  let stamped = read.read_at.expect("read_at stamped");

  // Idempotent: a second mark keeps the original stamp.
  let again = s.mark_read(bob.user_id, id).await.unwrap();
  assert_eq!(again.read_at, Some(stamped));

  let feed = s.notifications(bob.user_id).await.unwrap();
  assert_eq!(feed.unread_count, 0);
}

#[tokio::test]
async fn mark_read_is_scoped_to_the_recipient() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let outcome = s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  let id = outcome.record().notification_id;

  // Alice cannot touch Bob's ledger.
  let err = s.mark_read(alice.user_id, id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::NotificationNotFound(_))
  ));
  assert_eq!(s.notifications(bob.user_id).await.unwrap().unread_count, 1);
}

#[tokio::test]
async fn mark_all_read_counts_changed_records() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  s.append(mention_input(&carol, &bob, Uuid::new_v4())).await.unwrap();

  assert_eq!(s.mark_all_read(bob.user_id).await.unwrap(), 2);
  // Already read: nothing left to change.
  assert_eq!(s.mark_all_read(bob.user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn remove_notification_and_remove_all() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  let first = s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  s.append(mention_input(&carol, &bob, Uuid::new_v4())).await.unwrap();

  s.remove_notification(bob.user_id, first.record().notification_id)
    .await
    .unwrap();
  assert_eq!(s.notifications(bob.user_id).await.unwrap().notifications.len(), 1);

  let err = s
    .remove_notification(bob.user_id, first.record().notification_id)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Domain(kawan_core::Error::NotificationNotFound(_))
  ));

  assert_eq!(s.remove_all_notifications(bob.user_id).await.unwrap(), 1);
  assert!(s.notifications(bob.user_id).await.unwrap().notifications.is_empty());
}

// ─── Mention pipeline ────────────────────────────────────────────────────────

#[tokio::test]
async fn friend_mention_notifies() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  befriend(&s, &alice, &bob).await;

  let summary =
    process_content(&s, alice.user_id, Uuid::new_v4(), "@bob hello!").await;
  assert_eq!(summary.notified, 1);

  let feed = s.notifications(bob.user_id).await.unwrap();
  assert_eq!(feed.unread_count, 1);
  assert_eq!(feed.notifications[0].from_user, alice.user_id);
  assert_eq!(
    feed.notifications[0].message,
    "@alice mentioned you in a post"
  );
}

#[tokio::test]
async fn non_friend_mention_is_silent() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let carol = user(&s, "carol").await;

  let summary = process_content(
    &s,
    alice.user_id,
    Uuid::new_v4(),
    "@carol you are not my friend yet",
  )
  .await;
  assert_eq!(summary.notified, 0);
  assert_eq!(summary.skipped_not_friend, 1);

  assert!(s.notifications(carol.user_id).await.unwrap().notifications.is_empty());
}

#[tokio::test]
async fn pending_friendship_does_not_notify() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  s.request(alice.user_id, bob.user_id).await.unwrap();

  let summary =
    process_content(&s, alice.user_id, Uuid::new_v4(), "@bob soon?").await;
  assert_eq!(summary.skipped_not_friend, 1);
  assert!(s.notifications(bob.user_id).await.unwrap().notifications.is_empty());
}

#[tokio::test]
async fn self_mention_never_notifies() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let summary =
    process_content(&s, alice.user_id, Uuid::new_v4(), "@alice me @ALICE")
      .await;
  assert_eq!(summary.skipped_self, 1);
  assert_eq!(summary.notified, 0);
  assert!(s.notifications(alice.user_id).await.unwrap().notifications.is_empty());
}

#[tokio::test]
async fn unknown_handle_is_skipped_silently() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let summary = process_content(
    &s,
    alice.user_id,
    Uuid::new_v4(),
    "@nobody knows this handle",
  )
  .await;
  assert_eq!(summary.skipped_unknown, 1);
  assert_eq!(summary.failures, 0);
}

#[tokio::test]
async fn repeated_handle_notifies_once() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  befriend(&s, &alice, &bob).await;

  let summary = process_content(
    &s,
    alice.user_id,
    Uuid::new_v4(),
    "@bob @Bob @BOB three times",
  )
  .await;
  assert_eq!(summary.candidates, 1);
  assert_eq!(summary.notified, 1);

  let feed = s.notifications(bob.user_id).await.unwrap();
  assert_eq!(feed.notifications.len(), 1);
  assert_eq!(feed.unread_count, 1);
}

#[tokio::test]
async fn reprocessing_same_content_is_idempotent() {
  // An edit re-fires the content-created event with the same content_ref;
  // the recipient must not be notified twice.
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  befriend(&s, &alice, &bob).await;

  let post = Uuid::new_v4();
  let first = process_content(&s, alice.user_id, post, "@bob v1").await;
  assert_eq!(first.notified, 1);

  let second = process_content(&s, alice.user_id, post, "@bob v2 edited").await;
  assert_eq!(second.notified, 0);
  assert_eq!(second.duplicates, 1);

  assert_eq!(s.notifications(bob.user_id).await.unwrap().notifications.len(), 1);
}

#[tokio::test]
async fn mention_resolution_is_case_insensitive() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "Bob").await;
  befriend(&s, &alice, &bob).await;

  let summary =
    process_content(&s, alice.user_id, Uuid::new_v4(), "hi @bOb").await;
  assert_eq!(summary.notified, 1);
  assert_eq!(s.notifications(bob.user_id).await.unwrap().unread_count, 1);
}

#[tokio::test]
async fn mixed_candidates_are_processed_independently() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;
  befriend(&s, &alice, &bob).await;

  let summary = process_content(
    &s,
    alice.user_id,
    Uuid::new_v4(),
    "@bob @carol @ghost @alice all of you",
  )
  .await;
  assert_eq!(summary.candidates, 4);
  assert_eq!(summary.notified, 1);
  assert_eq!(summary.skipped_not_friend, 1);
  assert_eq!(summary.skipped_unknown, 1);
  assert_eq!(summary.skipped_self, 1);

  assert_eq!(s.notifications(bob.user_id).await.unwrap().unread_count, 1);
  assert!(s.notifications(carol.user_id).await.unwrap().notifications.is_empty());
}

// ─── Retention sweep ─────────────────────────────────────────────────────────

/// Backdate a notification's read state directly, bypassing `mark_read`'s
/// now-stamp, to simulate records read in the past.
async fn backdate_read(s: &SqliteStore, notification_id: Uuid, read_at: chrono::DateTime<Utc>) {
  let id_str = notification_id.hyphenated().to_string();
  let at_str = read_at.to_rfc3339();
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE notifications SET is_read = 1, read_at = ?1
         WHERE notification_id = ?2",
        rusqlite::params![at_str, id_str],
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn sweep_removes_only_expired_read_notifications() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let stale = s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  let fresh = s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();

  backdate_read(&s, stale.record().notification_id, Utc::now() - Duration::hours(25)).await;
  backdate_read(&s, fresh.record().notification_id, Utc::now() - Duration::hours(1)).await;

  let sweeper = RetentionSweeper::new(s.clone(), Duration::hours(24));
  let summary = sweeper.run_once(Utc::now()).await;
  assert!(!summary.skipped);
  assert_eq!(summary.removed, 1);
  assert_eq!(summary.failed_ledgers, 0);

  let feed = s.notifications(bob.user_id).await.unwrap();
  assert_eq!(feed.notifications.len(), 1);
  assert_eq!(
    feed.notifications[0].notification_id,
    fresh.record().notification_id
  );
}

#[tokio::test]
async fn sweep_never_removes_unread_notifications() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  // Unread, but created long ago: age alone never qualifies a record.
  let outcome = s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  let id = outcome.record().notification_id;
  let id_str = id.hyphenated().to_string();
  let old = (Utc::now() - Duration::days(30)).to_rfc3339();
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE notifications SET created_at = ?1 WHERE notification_id = ?2",
        rusqlite::params![old, id_str],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let sweeper = RetentionSweeper::new(s.clone(), Duration::hours(24));
  let summary = sweeper.run_once(Utc::now()).await;
  assert_eq!(summary.removed, 0);
  assert_eq!(s.notifications(bob.user_id).await.unwrap().notifications.len(), 1);
}

#[tokio::test]
async fn sweep_ignores_read_flag_without_timestamp() {
  // Defensive invariant: a read flag with a null read_at must never be
  // pruned, however it came to exist.
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;

  let outcome = s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  let id_str = outcome.record().notification_id.hyphenated().to_string();
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE notifications SET is_read = 1, read_at = NULL
         WHERE notification_id = ?1",
        rusqlite::params![id_str],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let sweeper = RetentionSweeper::new(s.clone(), Duration::hours(24));
  let summary = sweeper.run_once(Utc::now()).await;
  assert_eq!(summary.removed, 0);
  assert_eq!(s.notifications(bob.user_id).await.unwrap().notifications.len(), 1);
}

#[tokio::test]
async fn sweep_visits_every_ledger() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;

  let to_bob = s.append(mention_input(&alice, &bob, Uuid::new_v4())).await.unwrap();
  let to_carol = s.append(mention_input(&alice, &carol, Uuid::new_v4())).await.unwrap();

  let expired = Utc::now() - Duration::hours(48);
  backdate_read(&s, to_bob.record().notification_id, expired).await;
  backdate_read(&s, to_carol.record().notification_id, expired).await;

  let sweeper = RetentionSweeper::new(s.clone(), Duration::hours(24));
  let summary = sweeper.run_once(Utc::now()).await;
  assert_eq!(summary.ledgers, 2);
  assert_eq!(summary.removed, 2);

  assert!(s.notifications(bob.user_id).await.unwrap().notifications.is_empty());
  assert!(s.notifications(carol.user_id).await.unwrap().notifications.is_empty());
}

#[tokio::test]
async fn sweep_on_empty_store_is_a_no_op() {
  let s = store().await;
  let sweeper = RetentionSweeper::new(s, Duration::hours(24));
  let summary = sweeper.run_once(Utc::now()).await;
  assert!(!summary.skipped);
  assert_eq!(summary.ledgers, 0);
  assert_eq!(summary.removed, 0);
}
