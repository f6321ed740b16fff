//! SQL schema for the Tagalong SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id           TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    email             TEXT NOT NULL,
    face_signature_id TEXT,
    created_at        TEXT NOT NULL
);

-- The invitee list is one JSON document so a list mutation is one UPDATE.
CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    creator_id  TEXT NOT NULL REFERENCES users(user_id),
    title       TEXT NOT NULL,
    description TEXT,
    starts_at   TEXT,
    created_at  TEXT NOT NULL,
    invitees    TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS photos (
    photo_id        TEXT PRIMARY KEY,
    event_id        TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    uploader_id     TEXT NOT NULL REFERENCES users(user_id),
    storage_locator TEXT NOT NULL,
    content_type    TEXT NOT NULL,
    is_processed    INTEGER NOT NULL DEFAULT 0,
    faces           TEXT NOT NULL DEFAULT '[]',   -- JSON array of DetectedFace
    created_at      TEXT NOT NULL
);

-- photo_id carries no foreign key: notifications outlive deleted photos.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    recipient_id    TEXT REFERENCES users(user_id),
    recipient_email TEXT,
    kind            TEXT NOT NULL,   -- 'event_invite' | 'photo_tagged' | ...
    title           TEXT NOT NULL,
    message         TEXT NOT NULL,
    event_id        TEXT REFERENCES events(event_id),
    photo_id        TEXT,
    is_read         INTEGER NOT NULL DEFAULT 0,
    is_sent         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS photos_event_idx         ON photos(event_id);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx ON notifications(recipient_id);

PRAGMA user_version = 1;
";
