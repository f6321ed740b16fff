//! [`SqliteStore`]: the SQLite implementation of [`Store`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tagalong_core::{
  event::{Event, Invitee, NewEvent},
  notification::{NewNotification, Notification},
  photo::{DetectedFace, NewPhoto, Photo},
  store::Store,
  user::{NewUser, User},
};

use crate::{
  Result,
  encode::{
    RawEvent, RawNotification, RawPhoto, RawUser, encode_dt, encode_faces,
    encode_invitees, encode_kind, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tagalong store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
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

  /// Run a single-statement UPDATE/DELETE and report whether a row changed.
  async fn touch(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str])?))
      .await?;
    Ok(changed > 0)
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:           Uuid::new_v4(),
      name:              input.name,
      email:             input.email,
      face_signature_id: None,
      created_at:        Utc::now(),
    };

    let id_str = encode_uuid(user.user_id);
    let name   = user.name.clone();
    let email  = user.email.clone();
    let at_str = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, email, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn set_face_signature(&self, user_id: Uuid, signature_id: String) -> Result<bool> {
    let id_str = encode_uuid(user_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET face_signature_id = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, signature_id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn add_event(&self, input: NewEvent) -> Result<Event> {
    let event = Event {
      event_id:    Uuid::new_v4(),
      creator_id:  input.creator_id,
      title:       input.title,
      description: input.description,
      starts_at:   input.starts_at,
      created_at:  Utc::now(),
      invitees:    Vec::new(),
    };

    let id_str      = encode_uuid(event.event_id);
    let creator_str = encode_uuid(event.creator_id);
    let title       = event.title.clone();
    let description = event.description.clone();
    let starts_str  = event.starts_at.map(encode_dt);
    let at_str      = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (event_id, creator_id, title, description, starts_at, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, creator_str, title, description, starts_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM events WHERE event_id = ?1", RawEvent::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawEvent::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn save_invitees(&self, event_id: Uuid, invitees: Vec<Invitee>) -> Result<bool> {
    let id_str = encode_uuid(event_id);
    let json   = encode_invitees(&invitees)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE events SET invitees = ?2 WHERE event_id = ?1",
          rusqlite::params![id_str, json],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Photos ────────────────────────────────────────────────────────────────

  async fn add_photo(&self, input: NewPhoto) -> Result<Photo> {
    let photo = Photo {
      photo_id:        Uuid::new_v4(),
      event_id:        input.event_id,
      uploader_id:     input.uploader_id,
      storage_locator: input.storage_locator,
      content_type:    input.content_type,
      is_processed:    false,
      faces:           Vec::new(),
      created_at:      Utc::now(),
    };

    let id_str       = encode_uuid(photo.photo_id);
    let event_str    = encode_uuid(photo.event_id);
    let uploader_str = encode_uuid(photo.uploader_id);
    let locator      = photo.storage_locator.clone();
    let content_type = photo.content_type.clone();
    let at_str       = encode_dt(photo.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO photos (photo_id, event_id, uploader_id, storage_locator, content_type, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, event_str, uploader_str, locator, content_type, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(photo)
  }

  async fn get_photo(&self, id: Uuid) -> Result<Option<Photo>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPhoto> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM photos WHERE photo_id = ?1", RawPhoto::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawPhoto::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPhoto::into_photo).transpose()
  }

  async fn list_photos(&self, event_id: Uuid) -> Result<Vec<Photo>> {
    let id_str = encode_uuid(event_id);

    let raws: Vec<RawPhoto> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM photos WHERE event_id = ?1 ORDER BY created_at, rowid",
          RawPhoto::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawPhoto::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPhoto::into_photo).collect()
  }

  async fn complete_photo(&self, photo_id: Uuid, faces: Vec<DetectedFace>) -> Result<bool> {
    let id_str = encode_uuid(photo_id);
    let json   = encode_faces(&faces)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE photos SET faces = ?2, is_processed = 1 WHERE photo_id = ?1",
          rusqlite::params![id_str, json],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_photo(&self, photo_id: Uuid) -> Result<bool> {
    self.touch("DELETE FROM photos WHERE photo_id = ?1", photo_id).await
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn add_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      recipient_id:    input.recipient_id,
      recipient_email: input.recipient_email,
      kind:            input.kind,
      title:           input.title,
      message:         input.message,
      event_id:        input.event_id,
      photo_id:        input.photo_id,
      is_read:         false,
      is_sent:         false,
      created_at:      Utc::now(),
    };

    let id_str        = encode_uuid(notification.notification_id);
    let recipient_str = notification.recipient_id.map(encode_uuid);
    let email         = notification.recipient_email.clone();
    let kind_str      = encode_kind(notification.kind);
    let title         = notification.title.clone();
    let message       = notification.message.clone();
    let event_str     = notification.event_id.map(encode_uuid);
    let photo_str     = notification.photo_id.map(encode_uuid);
    let at_str        = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (
             notification_id, recipient_id, recipient_email, kind, title,
             message, event_id, photo_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            recipient_str,
            email,
            kind_str,
            title,
            message,
            event_str,
            photo_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn get_notification(&self, id: Uuid) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM notifications WHERE notification_id = ?1",
          RawNotification::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawNotification::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNotification::into_notification).transpose()
  }

  async fn list_notifications(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
    let id_str = encode_uuid(recipient_id);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM notifications WHERE recipient_id = ?1
           ORDER BY created_at DESC, rowid DESC",
          RawNotification::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn mark_notification_sent(&self, id: Uuid) -> Result<bool> {
    self
      .touch("UPDATE notifications SET is_sent = 1 WHERE notification_id = ?1", id)
      .await
  }

  async fn mark_notification_read(&self, id: Uuid) -> Result<bool> {
    self
      .touch("UPDATE notifications SET is_read = 1 WHERE notification_id = ?1", id)
      .await
  }
}
