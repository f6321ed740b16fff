//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 strings (nanoseconds,
//! `Z` suffix) so they sort lexically. The invitee list and the
//! face list are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use tagalong_core::{
  event::{Event, Invitee},
  notification::{Notification, NotificationKind},
  photo::{DetectedFace, Photo},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NotificationKind ─────────────────────────────────────────────────────────

pub fn encode_kind(k: NotificationKind) -> String { k.to_string() }

pub fn decode_kind(s: &str) -> Result<NotificationKind> {
  NotificationKind::from_str(s).map_err(|_| Error::UnknownVariant {
    column: "kind",
    value:  s.to_owned(),
  })
}

// ─── JSON documents ───────────────────────────────────────────────────────────

pub fn encode_invitees(invitees: &[Invitee]) -> Result<String> {
  Ok(serde_json::to_string(invitees)?)
}

pub fn encode_faces(faces: &[DetectedFace]) -> Result<String> {
  Ok(serde_json::to_string(faces)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:           String,
  pub name:              String,
  pub email:             String,
  pub face_signature_id: Option<String>,
  pub created_at:        String,
}

impl RawUser {
  pub const COLUMNS: &'static str =
    "user_id, name, email, face_signature_id, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:           row.get(0)?,
      name:              row.get(1)?,
      email:             row.get(2)?,
      face_signature_id: row.get(3)?,
      created_at:        row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:           decode_uuid(&self.user_id)?,
      name:              self.name,
      email:             self.email,
      face_signature_id: self.face_signature_id,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:    String,
  pub creator_id:  String,
  pub title:       String,
  pub description: Option<String>,
  pub starts_at:   Option<String>,
  pub created_at:  String,
  pub invitees:    String,
}

impl RawEvent {
  pub const COLUMNS: &'static str =
    "event_id, creator_id, title, description, starts_at, created_at, invitees";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      creator_id:  row.get(1)?,
      title:       row.get(2)?,
      description: row.get(3)?,
      starts_at:   row.get(4)?,
      created_at:  row.get(5)?,
      invitees:    row.get(6)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:    decode_uuid(&self.event_id)?,
      creator_id:  decode_uuid(&self.creator_id)?,
      title:       self.title,
      description: self.description,
      starts_at:   self.starts_at.as_deref().map(decode_dt).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      invitees:    serde_json::from_str(&self.invitees)?,
    })
  }
}

/// Raw strings read directly from a `photos` row.
pub struct RawPhoto {
  pub photo_id:        String,
  pub event_id:        String,
  pub uploader_id:     String,
  pub storage_locator: String,
  pub content_type:    String,
  pub is_processed:    bool,
  pub faces:           String,
  pub created_at:      String,
}

impl RawPhoto {
  pub const COLUMNS: &'static str = "photo_id, event_id, uploader_id, \
     storage_locator, content_type, is_processed, faces, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      photo_id:        row.get(0)?,
      event_id:        row.get(1)?,
      uploader_id:     row.get(2)?,
      storage_locator: row.get(3)?,
      content_type:    row.get(4)?,
      is_processed:    row.get(5)?,
      faces:           row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_photo(self) -> Result<Photo> {
    Ok(Photo {
      photo_id:        decode_uuid(&self.photo_id)?,
      event_id:        decode_uuid(&self.event_id)?,
      uploader_id:     decode_uuid(&self.uploader_id)?,
      storage_locator: self.storage_locator,
      content_type:    self.content_type,
      is_processed:    self.is_processed,
      faces:           serde_json::from_str(&self.faces)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub recipient_id:    Option<String>,
  pub recipient_email: Option<String>,
  pub kind:            String,
  pub title:           String,
  pub message:         String,
  pub event_id:        Option<String>,
  pub photo_id:        Option<String>,
  pub is_read:         bool,
  pub is_sent:         bool,
  pub created_at:      String,
}

impl RawNotification {
  pub const COLUMNS: &'static str = "notification_id, recipient_id, \
     recipient_email, kind, title, message, event_id, photo_id, is_read, \
     is_sent, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      recipient_id:    row.get(1)?,
      recipient_email: row.get(2)?,
      kind:            row.get(3)?,
      title:           row.get(4)?,
      message:         row.get(5)?,
      event_id:        row.get(6)?,
      photo_id:        row.get(7)?,
      is_read:         row.get(8)?,
      is_sent:         row.get(9)?,
      created_at:      row.get(10)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      recipient_id:    decode_opt_uuid(self.recipient_id.as_deref())?,
      recipient_email: self.recipient_email,
      kind:            decode_kind(&self.kind)?,
      title:           self.title,
      message:         self.message,
      event_id:        decode_opt_uuid(self.event_id.as_deref())?,
      photo_id:        decode_opt_uuid(self.photo_id.as_deref())?,
      is_read:         self.is_read,
      is_sent:         self.is_sent,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
