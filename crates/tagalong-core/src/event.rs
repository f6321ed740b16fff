//! Events and their invitee lists.
//!
//! An event is stored as a single document: the invitee list is read,
//! modified in memory, and written back whole. The helpers here keep the
//! list's uniqueness rules in one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

// ─── Invitees ────────────────────────────────────────────────────────────────

/// Where an invitee stands in the invitation lifecycle.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InviteStatus {
  #[default]
  Pending,
  Accepted,
  Declined,
}

impl InviteStatus {
  /// Parse a response submitted by an invitee. Only `accepted` and
  /// `declined` are valid answers; `pending` is not something one responds
  /// with.
  pub fn parse_response(s: &str) -> Option<Self> {
    match s.parse::<Self>() {
      Ok(Self::Pending) | Err(_) => None,
      Ok(status) => Some(status),
    }
  }
}

/// One entry of an event's invitee list.
///
/// When `user_id` is set it is the deduplication key; `email` then only
/// serves as the delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitee {
  pub invitee_id:   Uuid,
  pub user_id:      Option<Uuid>,
  pub email:        Option<String>,
  /// Opaque bearer token; unique within the event and never reissued.
  pub code:         String,
  pub status:       InviteStatus,
  pub created_at:   DateTime<Utc>,
  pub responded_at: Option<DateTime<Utc>>,
}

/// What an organizer submits to invite someone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InviteeSpec {
  pub user_id: Option<Uuid>,
  pub email:   Option<String>,
}

/// Canonical form used when comparing email addresses.
pub fn normalize_email(email: &str) -> String { email.trim().to_ascii_lowercase() }

// ─── Events ──────────────────────────────────────────────────────────────────

/// An event document together with its invitee list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:    Uuid,
  pub creator_id:  Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub starts_at:   Option<DateTime<Utc>>,
  pub created_at:  DateTime<Utc>,
  pub invitees:    Vec<Invitee>,
}

impl Event {
  pub fn is_creator(&self, user_id: Uuid) -> bool { self.creator_id == user_id }

  /// Creator or a listed invitee bound to `user_id`.
  pub fn is_participant(&self, user_id: Uuid) -> bool {
    self.is_creator(user_id) || self.invitee_for_user(user_id).is_some()
  }

  pub fn invitee_for_user(&self, user_id: Uuid) -> Option<&Invitee> {
    self.invitees.iter().find(|i| i.user_id == Some(user_id))
  }

  /// Any entry carrying `email`, whether or not it is also bound to a user.
  pub fn has_email(&self, email: &str) -> bool {
    let wanted = normalize_email(email);
    self
      .invitees
      .iter()
      .filter_map(|i| i.email.as_deref())
      .any(|e| normalize_email(e) == wanted)
  }

  pub fn has_code(&self, code: &str) -> bool {
    self.invitees.iter().any(|i| i.code == code)
  }

  pub fn invitee_by_code_mut(&mut self, code: &str) -> Option<&mut Invitee> {
    self.invitees.iter_mut().find(|i| i.code == code)
  }

  /// The public face of the event: everything but the invitee list.
  pub fn summary(&self) -> EventSummary {
    EventSummary {
      event_id:    self.event_id,
      title:       self.title.clone(),
      description: self.description.clone(),
      starts_at:   self.starts_at,
    }
  }
}

/// Input for [`Store::add_event`](crate::store::Store::add_event).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
  pub creator_id:  Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub starts_at:   Option<DateTime<Utc>>,
}

/// An event with no invitee identities or emails in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
  pub event_id:    Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub starts_at:   Option<DateTime<Utc>>,
}
