//! SQL schema for the Kawan SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    handle       TEXT NOT NULL COLLATE NOCASE UNIQUE,
    display_name TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

-- One row per unordered user pair. pair_lo/pair_hi are the two user ids
-- in ascending order; the unique index collapses simultaneous
-- bidirectional requests into a single conflict.
CREATE TABLE IF NOT EXISTS relationships (
    edge_id    TEXT PRIMARY KEY,
    requester  TEXT NOT NULL REFERENCES users(user_id),
    recipient  TEXT NOT NULL REFERENCES users(user_id),
    status     TEXT NOT NULL,   -- 'pending' | 'accepted' | 'rejected' | 'blocked'
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    pair_lo    TEXT NOT NULL,
    pair_hi    TEXT NOT NULL,
    UNIQUE (pair_lo, pair_hi),
    CHECK  (requester != recipient)
);

-- Per-recipient notification ledgers. The (recipient, from_user,
-- content_ref) index is the dedup constraint: one author notifies one
-- recipient at most once per piece of content.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    recipient       TEXT NOT NULL REFERENCES users(user_id),
    kind            TEXT NOT NULL,   -- 'mention'
    from_user       TEXT NOT NULL REFERENCES users(user_id),
    from_handle     TEXT NOT NULL,
    content_ref     TEXT NOT NULL,
    message         TEXT NOT NULL,
    is_read         INTEGER NOT NULL DEFAULT 0,
    read_at         TEXT,
    created_at      TEXT NOT NULL,
    UNIQUE (recipient, from_user, content_ref)
);

CREATE INDEX IF NOT EXISTS relationships_recipient_status_idx
    ON relationships(recipient, status);
CREATE INDEX IF NOT EXISTS relationships_requester_status_idx
    ON relationships(requester, status);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx
    ON notifications(recipient, created_at);
CREATE INDEX IF NOT EXISTS notifications_read_idx
    ON notifications(is_read, read_at);

PRAGMA user_version = 1;
";
