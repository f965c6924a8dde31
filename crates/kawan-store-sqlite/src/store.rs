//! [`SqliteStore`] — the SQLite implementation of the Kawan store traits.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use kawan_core::{
  identity::{Identity, NewIdentity},
  notification::{
    AppendOutcome, NewNotification, NotificationFeed, NotificationRecord,
  },
  relationship::{
    PairKey, RelationshipEdge, RelationshipStatus, RelationshipView,
    ResponseDecision,
  },
  store::{IdentityStore, NotificationStore, RelationshipStore},
};

use crate::{
  encode::{
    RawEdge, RawIdentity, RawNotification, decode_status, encode_dt,
    encode_kind, encode_status, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

const EDGE_COLUMNS: &str =
  "edge_id, requester, recipient, status, created_at, updated_at";

const NOTIFICATION_COLUMNS: &str =
  "notification_id, recipient, kind, from_user, from_handle, content_ref, \
   message, is_read, read_at, created_at";

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

fn edge_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEdge> {
  Ok(RawEdge {
    edge_id:    row.get(0)?,
    requester:  row.get(1)?,
    recipient:  row.get(2)?,
    status:     row.get(3)?,
    created_at: row.get(4)?,
    updated_at: row.get(5)?,
  })
}

fn notification_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawNotification> {
  Ok(RawNotification {
    notification_id: row.get(0)?,
    recipient:       row.get(1)?,
    kind:            row.get(2)?,
    from_user:       row.get(3)?,
    from_handle:     row.get(4)?,
    content_ref:     row.get(5)?,
    message:         row.get(6)?,
    is_read:         row.get(7)?,
    read_at:         row.get(8)?,
    created_at:      row.get(9)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kawan store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised onto one connection thread, so a multi-statement closure
/// observes no interleaving from other store calls.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn edge_by_id(&self, edge_id: Uuid) -> Result<Option<RelationshipEdge>> {
    let id_str = encode_uuid(edge_id);

    let raw: Option<RawEdge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EDGE_COLUMNS} FROM relationships WHERE edge_id = ?1"
              ),
              rusqlite::params![id_str],
              edge_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEdge::into_edge).transpose()
  }

  async fn edge_by_pair(&self, pair: PairKey) -> Result<Option<RelationshipEdge>> {
    let lo_str = encode_uuid(pair.lo);
    let hi_str = encode_uuid(pair.hi);

    let raw: Option<RawEdge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EDGE_COLUMNS} FROM relationships
                 WHERE pair_lo = ?1 AND pair_hi = ?2"
              ),
              rusqlite::params![lo_str, hi_str],
              edge_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEdge::into_edge).transpose()
  }
}

// ─── IdentityStore impl ──────────────────────────────────────────────────────

impl IdentityStore for SqliteStore {
  type Error = Error;

  async fn add_identity(&self, input: NewIdentity) -> Result<Identity> {
    let identity = Identity {
      user_id:      Uuid::new_v4(),
      handle:       input.handle.trim().to_owned(),
      display_name: input.display_name,
      created_at:   Utc::now(),
    };

    let id_str       = encode_uuid(identity.user_id);
    let handle       = identity.handle.clone();
    let display_name = identity.display_name.clone();
    let at_str       = encode_dt(identity.created_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO users (user_id, handle, display_name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, handle, display_name, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(kawan_core::Error::HandleTaken(identity.handle).into());
    }
    Ok(identity)
  }

  async fn identity(&self, user_id: Uuid) -> Result<Option<Identity>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, handle, display_name, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawIdentity {
                  user_id:      row.get(0)?,
                  handle:       row.get(1)?,
                  display_name: row.get(2)?,
                  created_at:   row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn identity_by_handle(&self, handle: &str) -> Result<Option<Identity>> {
    // The handle column carries COLLATE NOCASE, so equality here is
    // case-insensitive.
    let handle = handle.trim().to_owned();

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, handle, display_name, created_at
               FROM users WHERE handle = ?1",
              rusqlite::params![handle],
              |row| {
                Ok(RawIdentity {
                  user_id:      row.get(0)?,
                  handle:       row.get(1)?,
                  display_name: row.get(2)?,
                  created_at:   row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }
}

// ─── RelationshipStore impl ──────────────────────────────────────────────────

/// What the insert attempt inside [`RelationshipStore::request`] observed.
enum RequestAttempt {
  Created,
  RequesterMissing,
  RecipientMissing,
  Conflict(String),
}

impl RelationshipStore for SqliteStore {
  type Error = Error;

  async fn request(
    &self,
    requester: Uuid,
    recipient: Uuid,
  ) -> Result<RelationshipEdge> {
    if requester == recipient {
      return Err(kawan_core::Error::SelfReference.into());
    }

    let now = Utc::now();
    let edge = RelationshipEdge {
      edge_id: Uuid::new_v4(),
      requester,
      recipient,
      status: RelationshipStatus::Pending,
      created_at: now,
      updated_at: now,
    };
    let pair = edge.pair();

    let edge_id_str   = encode_uuid(edge.edge_id);
    let requester_str = encode_uuid(requester);
    let recipient_str = encode_uuid(recipient);
    let status_str    = encode_status(edge.status).to_owned();
    let at_str        = encode_dt(now);
    let lo_str        = encode_uuid(pair.lo);
    let hi_str        = encode_uuid(pair.hi);

    let attempt: RequestAttempt = self
      .conn
      .call(move |conn| {
        let requester_exists: bool = conn
          .query_row(
            "SELECT 1 FROM users WHERE user_id = ?1",
            rusqlite::params![requester_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !requester_exists {
          return Ok(RequestAttempt::RequesterMissing);
        }

        let recipient_exists: bool = conn
          .query_row(
            "SELECT 1 FROM users WHERE user_id = ?1",
            rusqlite::params![recipient_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !recipient_exists {
          return Ok(RequestAttempt::RecipientMissing);
        }

        // Check-then-insert is race-safe here: the unique (pair_lo,
        // pair_hi) index is the arbiter, and this closure runs without
        // interleaving on the serialised connection.
        match conn.execute(
          "INSERT INTO relationships (
             edge_id, requester, recipient, status,
             created_at, updated_at, pair_lo, pair_hi
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?7)",
          rusqlite::params![
            edge_id_str,
            requester_str,
            recipient_str,
            status_str,
            at_str,
            lo_str,
            hi_str,
          ],
        ) {
          Ok(_) => Ok(RequestAttempt::Created),
          Err(e) if is_unique_violation(&e) => {
            let status: String = conn.query_row(
              "SELECT status FROM relationships
               WHERE pair_lo = ?1 AND pair_hi = ?2",
              rusqlite::params![lo_str, hi_str],
              |row| row.get(0),
            )?;
            Ok(RequestAttempt::Conflict(status))
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match attempt {
      RequestAttempt::Created => Ok(edge),
      RequestAttempt::RequesterMissing => {
        Err(kawan_core::Error::UserNotFound(requester).into())
      }
      RequestAttempt::RecipientMissing => {
        Err(kawan_core::Error::UserNotFound(recipient).into())
      }
      RequestAttempt::Conflict(status) => {
        let status = decode_status(&status)?;
        Err(kawan_core::Error::Conflict(status.conflict_kind()).into())
      }
    }
  }

  async fn respond(
    &self,
    edge_id: Uuid,
    acting_user: Uuid,
    decision: ResponseDecision,
  ) -> Result<RelationshipEdge> {
    let edge = self
      .edge_by_id(edge_id)
      .await?
      .ok_or(kawan_core::Error::EdgeNotFound(edge_id))?;

    let target = edge.respond(acting_user, decision)?;
    let updated_at = Utc::now();

    let status_str = encode_status(target).to_owned();
    let at_str     = encode_dt(updated_at);
    let id_str     = encode_uuid(edge_id);

    // The `status = 'pending'` guard makes the transition atomic: a raced
    // second response observes zero affected rows.
    let rows: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE relationships SET status = ?1, updated_at = ?2
           WHERE edge_id = ?3 AND status = 'pending'",
          rusqlite::params![status_str, at_str, id_str],
        )?)
      })
      .await?;

    if rows == 0 {
      let current = self
        .edge_by_id(edge_id)
        .await?
        .ok_or(kawan_core::Error::EdgeNotFound(edge_id))?;
      return Err(kawan_core::Error::NotPending(current.status).into());
    }

    Ok(RelationshipEdge { status: target, updated_at, ..edge })
  }

  async fn remove(&self, user_a: Uuid, user_b: Uuid) -> Result<()> {
    let pair = PairKey::new(user_a, user_b);
    let lo_str = encode_uuid(pair.lo);
    let hi_str = encode_uuid(pair.hi);

    // Hard removal, and only of accepted edges: pending requests are
    // settled through respond, and the freed pair may re-request later.
    let rows: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM relationships
           WHERE pair_lo = ?1 AND pair_hi = ?2 AND status = 'accepted'",
          rusqlite::params![lo_str, hi_str],
        )?)
      })
      .await?;

    if rows == 0 {
      return Err(kawan_core::Error::FriendshipNotFound(user_a, user_b).into());
    }
    Ok(())
  }

  async fn are_friends(&self, user_a: Uuid, user_b: Uuid) -> Result<bool> {
    let pair = PairKey::new(user_a, user_b);
    let lo_str = encode_uuid(pair.lo);
    let hi_str = encode_uuid(pair.hi);

    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM relationships
               WHERE pair_lo = ?1 AND pair_hi = ?2 AND status = 'accepted'",
              rusqlite::params![lo_str, hi_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(found)
  }

  async fn status_between(
    &self,
    viewpoint: Uuid,
    other: Uuid,
  ) -> Result<RelationshipView> {
    let edge = self.edge_by_pair(PairKey::new(viewpoint, other)).await?;
    Ok(match edge {
      Some(edge) => edge.view_for(viewpoint),
      None => RelationshipView::None,
    })
  }

  async fn incoming_requests(&self, user: Uuid) -> Result<Vec<RelationshipEdge>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawEdge> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EDGE_COLUMNS} FROM relationships
           WHERE recipient = ?1 AND status = 'pending'
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], edge_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEdge::into_edge).collect()
  }

  async fn outgoing_requests(&self, user: Uuid) -> Result<Vec<RelationshipEdge>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawEdge> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EDGE_COLUMNS} FROM relationships
           WHERE requester = ?1 AND status = 'pending'
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], edge_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEdge::into_edge).collect()
  }

  async fn friends_of(&self, user: Uuid) -> Result<Vec<Identity>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawIdentity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT u.user_id, u.handle, u.display_name, u.created_at
           FROM relationships r
           JOIN users u ON u.user_id = CASE
             WHEN r.requester = ?1 THEN r.recipient
             ELSE r.requester
           END
           WHERE (r.requester = ?1 OR r.recipient = ?1)
             AND r.status = 'accepted'
           ORDER BY r.updated_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| {
            Ok(RawIdentity {
              user_id:      row.get(0)?,
              handle:       row.get(1)?,
              display_name: row.get(2)?,
              created_at:   row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIdentity::into_identity).collect()
  }
}

// ─── NotificationStore impl ──────────────────────────────────────────────────

/// What the insert attempt inside [`NotificationStore::append`] observed.
enum AppendAttempt {
  Inserted,
  Existing(RawNotification),
}

impl NotificationStore for SqliteStore {
  type Error = Error;

  async fn append(&self, input: NewNotification) -> Result<AppendOutcome> {
    let record = NotificationRecord {
      notification_id: Uuid::new_v4(),
      recipient:       input.recipient,
      kind:            input.kind,
      from_user:       input.from_user,
      from_handle:     input.from_handle,
      content_ref:     input.content_ref,
      message:         input.message,
      is_read:         false,
      read_at:         None,
      created_at:      Utc::now(),
    };

    let id_str          = encode_uuid(record.notification_id);
    let recipient_str   = encode_uuid(record.recipient);
    let kind_str        = encode_kind(record.kind).to_owned();
    let from_user_str   = encode_uuid(record.from_user);
    let from_handle     = record.from_handle.clone();
    let content_ref_str = encode_uuid(record.content_ref);
    let message         = record.message.clone();
    let created_at_str  = encode_dt(record.created_at);

    let attempt: AppendAttempt = self
      .conn
      .call(move |conn| {
        // Insert-if-absent against the dedup index, then read back the
        // occupying row in the same serialised closure — never
        // fetch-then-save.
        let inserted = conn.execute(
          "INSERT INTO notifications (
             notification_id, recipient, kind, from_user, from_handle,
             content_ref, message, is_read, read_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, ?8)
           ON CONFLICT (recipient, from_user, content_ref) DO NOTHING",
          rusqlite::params![
            id_str,
            recipient_str,
            kind_str,
            from_user_str,
            from_handle,
            content_ref_str,
            message,
            created_at_str,
          ],
        )?;

        if inserted > 0 {
          return Ok(AppendAttempt::Inserted);
        }

        let existing = conn.query_row(
          &format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE recipient = ?1 AND from_user = ?2 AND content_ref = ?3"
          ),
          rusqlite::params![recipient_str, from_user_str, content_ref_str],
          notification_from_row,
        )?;
        Ok(AppendAttempt::Existing(existing))
      })
      .await?;

    match attempt {
      AppendAttempt::Inserted => Ok(AppendOutcome::Inserted(record)),
      AppendAttempt::Existing(raw) => {
        Ok(AppendOutcome::Duplicate(raw.into_record()?))
      }
    }
  }

  async fn mark_read(
    &self,
    recipient: Uuid,
    notification_id: Uuid,
  ) -> Result<NotificationRecord> {
    let recipient_str = encode_uuid(recipient);
    let id_str        = encode_uuid(notification_id);
    let read_at_str   = encode_dt(Utc::now());

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        // The `is_read = 0` guard keeps the first read_at stamp: marking
        // an already-read record again is a no-op.
        conn.execute(
          "UPDATE notifications SET is_read = 1, read_at = ?1
           WHERE recipient = ?2 AND notification_id = ?3 AND is_read = 0",
          rusqlite::params![read_at_str, recipient_str, id_str],
        )?;

        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE recipient = ?1 AND notification_id = ?2"
              ),
              rusqlite::params![recipient_str, id_str],
              notification_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => Ok(raw.into_record()?),
      None => {
        Err(kawan_core::Error::NotificationNotFound(notification_id).into())
      }
    }
  }

  async fn mark_all_read(&self, recipient: Uuid) -> Result<u64> {
    let recipient_str = encode_uuid(recipient);
    let read_at_str   = encode_dt(Utc::now());

    let rows: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1, read_at = ?1
           WHERE recipient = ?2 AND is_read = 0",
          rusqlite::params![read_at_str, recipient_str],
        )?)
      })
      .await?;

    Ok(rows as u64)
  }

  async fn remove_notification(
    &self,
    recipient: Uuid,
    notification_id: Uuid,
  ) -> Result<()> {
    let recipient_str = encode_uuid(recipient);
    let id_str        = encode_uuid(notification_id);

    let rows: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications
           WHERE recipient = ?1 AND notification_id = ?2",
          rusqlite::params![recipient_str, id_str],
        )?)
      })
      .await?;

    if rows == 0 {
      return Err(
        kawan_core::Error::NotificationNotFound(notification_id).into(),
      );
    }
    Ok(())
  }

  async fn remove_all_notifications(&self, recipient: Uuid) -> Result<u64> {
    let recipient_str = encode_uuid(recipient);

    let rows: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications WHERE recipient = ?1",
          rusqlite::params![recipient_str],
        )?)
      })
      .await?;

    Ok(rows as u64)
  }

  async fn notifications(&self, recipient: Uuid) -> Result<NotificationFeed> {
    let recipient_str = encode_uuid(recipient);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLUMNS} FROM notifications
           WHERE recipient = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![recipient_str], notification_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let notifications: Vec<NotificationRecord> = raws
      .into_iter()
      .map(RawNotification::into_record)
      .collect::<Result<_>>()?;

    let unread_count = notifications.iter().filter(|n| !n.is_read).count();

    Ok(NotificationFeed { notifications, unread_count })
  }

  async fn recipients_with_read_notifications(&self) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT recipient FROM notifications
           WHERE is_read = 1 AND read_at IS NOT NULL",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids
      .iter()
      .map(|s| Uuid::parse_str(s).map_err(Error::Uuid))
      .collect()
  }

  async fn prune_read_before(
    &self,
    recipient: Uuid,
    cutoff: DateTime<Utc>,
  ) -> Result<u64> {
    let recipient_str = encode_uuid(recipient);
    let cutoff_str    = encode_dt(cutoff);

    // One delete-matching statement per ledger; concurrent mark-read and
    // delete calls are never clobbered by a stale read. The explicit
    // `read_at IS NOT NULL` keeps a read flag without a timestamp from
    // ever qualifying.
    let rows: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications
           WHERE recipient = ?1
             AND is_read = 1
             AND read_at IS NOT NULL
             AND read_at < ?2",
          rusqlite::params![recipient_str, cutoff_str],
        )?)
      })
      .await?;

    Ok(rows as u64)
  }
}
