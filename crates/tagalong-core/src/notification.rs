//! Notification records.
//!
//! A record is created once. `is_sent` reflects the single delivery attempt
//! made at creation time; `is_read` belongs to the recipient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
  EventInvite,
  PhotoTagged,
  EventReminder,
  System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub recipient_id:    Option<Uuid>,
  /// Fallback recipient and delivery address.
  pub recipient_email: Option<String>,
  pub kind:            NotificationKind,
  pub title:           String,
  pub message:         String,
  pub event_id:        Option<Uuid>,
  pub photo_id:        Option<Uuid>,
  pub is_read:         bool,
  pub is_sent:         bool,
  pub created_at:      DateTime<Utc>,
}

/// Input for the engine's `Dispatcher::notify` and for
/// [`Store::add_notification`](crate::store::Store::add_notification).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
  pub recipient_id:    Option<Uuid>,
  pub recipient_email: Option<String>,
  pub kind:            NotificationKind,
  pub title:           String,
  pub message:         String,
  pub event_id:        Option<Uuid>,
  pub photo_id:        Option<Uuid>,
}

impl NewNotification {
  pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      recipient_id: None,
      recipient_email: None,
      kind,
      title: title.into(),
      message: message.into(),
      event_id: None,
      photo_id: None,
    }
  }

  pub fn to_user(mut self, user_id: Uuid, email: Option<String>) -> Self {
    self.recipient_id = Some(user_id);
    self.recipient_email = email;
    self
  }

  pub fn to_email(mut self, email: impl Into<String>) -> Self {
    self.recipient_email = Some(email.into());
    self
  }

  pub fn about_event(mut self, event_id: Uuid) -> Self {
    self.event_id = Some(event_id);
    self
  }

  pub fn about_photo(mut self, photo_id: Uuid) -> Self {
    self.photo_id = Some(photo_id);
    self
  }
}
