//! [`Invitations`]: the invitee list of an event and its state machine.
//!
//! Every mutation is a read-modify-write of the event document followed by a
//! single [`Store::save_invitees`] call. There is no version check: two
//! concurrent writers to the same event can lose one another's update.
//!
//! ```text
//!             respond(accepted)
//!   pending ───────────────────▶ accepted
//!      │                          ▲   │
//!      │ respond(declined)        │   │ respond(declined)
//!      ▼                          │   ▼
//!   declined ─────────────────────┘ declined
//! ```
//!
//! Responses may be resubmitted to change the answer. Binding a user to an
//! email-only entry happens at most once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tagalong_core::{
  Error, Result,
  event::{
    Event, EventSummary, InviteStatus, Invitee, InviteeSpec, NewEvent, normalize_email,
  },
  notification::{NewNotification, NotificationKind},
  store::Store,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Backend, Dispatcher, invite_code};

// ─── Request / result types ──────────────────────────────────────────────────

/// Input for [`Invitations::create_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
  pub title:       String,
  pub description: Option<String>,
  pub starts_at:   Option<DateTime<Utc>>,
}

/// Why an entry of an `add_invitees` batch was not added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
  /// Neither a user id nor an email was given.
  Empty,
  /// The user id does not resolve to a user.
  UnknownUser,
  /// The user or email is already on the list.
  Duplicate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Skipped {
  pub spec:   InviteeSpec,
  pub reason: SkipReason,
}

/// Result of [`Invitations::add_invitees`]: the list as saved, partitioned
/// into what this call added and what it skipped.
#[derive(Debug, Clone, Serialize)]
pub struct AddedInvitees {
  pub invitees: Vec<Invitee>,
  pub added:    Vec<Invitee>,
  pub skipped:  Vec<Skipped>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedSend {
  pub invitee_id: Uuid,
  pub reason:     String,
}

/// Result of [`Invitations::send_invitations`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SentInvitations {
  pub sent:   Vec<Uuid>,
  pub failed: Vec<FailedSend>,
}

/// What a code holder may see: the event's public fields and their own entry.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationView {
  pub event:      EventSummary,
  pub invitee_id: Uuid,
  pub status:     InviteStatus,
  pub code:       String,
}

// ─── Manager ─────────────────────────────────────────────────────────────────

pub struct Invitations<B: Backend> {
  store:      Arc<B::Store>,
  dispatcher: Dispatcher<B>,
}

impl<B: Backend> Clone for Invitations<B> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), dispatcher: self.dispatcher.clone() }
  }
}

impl<B: Backend> Invitations<B> {
  pub fn new(store: Arc<B::Store>, dispatcher: Dispatcher<B>) -> Self {
    Self { store, dispatcher }
  }

  async fn load(&self, event_id: Uuid) -> Result<Event> {
    self
      .store
      .get_event(event_id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::NotFound(format!("event {event_id}")))
  }

  async fn save(&self, event: &Event) -> Result<()> {
    let saved = self
      .store
      .save_invitees(event.event_id, event.invitees.clone())
      .await
      .map_err(Error::persistence)?;
    if !saved {
      return Err(Error::NotFound(format!("event {}", event.event_id)));
    }
    Ok(())
  }

  // ── Events ────────────────────────────────────────────────────────────

  pub async fn create_event(&self, creator: Uuid, input: CreateEvent) -> Result<Event> {
    let title = input.title.trim();
    if title.is_empty() {
      return Err(Error::InvalidInput("event title must not be empty".into()));
    }

    self
      .store
      .get_user(creator)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::NotFound(format!("user {creator}")))?;

    let event = self
      .store
      .add_event(NewEvent {
        creator_id:  creator,
        title:       title.to_owned(),
        description: input.description,
        starts_at:   input.starts_at,
      })
      .await
      .map_err(Error::persistence)?;

    info!(event_id = %event.event_id, creator_id = %creator, "event created");
    Ok(event)
  }

  /// The creator sees the whole invitee list; an invitee sees only their own
  /// entry; anyone else is refused.
  pub async fn get_event(&self, event_id: Uuid, viewer: Uuid) -> Result<Event> {
    let mut event = self.load(event_id).await?;
    if event.is_creator(viewer) {
      return Ok(event);
    }
    if event.invitee_for_user(viewer).is_none() {
      return Err(Error::Unauthorized);
    }
    event.invitees.retain(|i| i.user_id == Some(viewer));
    Ok(event)
  }

  // ── Invitee list ──────────────────────────────────────────────────────

  /// Add invitees, skipping unresolvable and duplicate entries.
  ///
  /// Only the creator may call this. The list is saved once, and only if
  /// something was added.
  pub async fn add_invitees(
    &self,
    event_id: Uuid,
    requester: Uuid,
    specs: Vec<InviteeSpec>,
  ) -> Result<AddedInvitees> {
    let mut event = self.load(event_id).await?;
    if !event.is_creator(requester) {
      return Err(Error::Unauthorized);
    }

    let mut added = Vec::new();
    let mut skipped = Vec::new();

    for spec in specs {
      let email = spec
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty());

      let (user_id, email) = match (spec.user_id, email) {
        (Some(user_id), email) => {
          let user = self.store.get_user(user_id).await.map_err(Error::persistence)?;
          let Some(user) = user else {
            skipped.push(Skipped { spec, reason: SkipReason::UnknownUser });
            continue;
          };
          if event.invitee_for_user(user_id).is_some() {
            skipped.push(Skipped { spec, reason: SkipReason::Duplicate });
            continue;
          }
          (Some(user_id), Some(email.unwrap_or_else(|| normalize_email(&user.email))))
        }
        (None, Some(email)) => {
          if event.has_email(&email) {
            skipped.push(Skipped { spec, reason: SkipReason::Duplicate });
            continue;
          }
          (None, Some(email))
        }
        (None, None) => {
          skipped.push(Skipped { spec, reason: SkipReason::Empty });
          continue;
        }
      };

      let code = invite_code::generate_unique(|c| event.has_code(c));
      let invitee = Invitee {
        invitee_id: Uuid::new_v4(),
        user_id,
        email,
        code,
        status: InviteStatus::Pending,
        created_at: Utc::now(),
        responded_at: None,
      };
      event.invitees.push(invitee.clone());
      added.push(invitee);
    }

    if !added.is_empty() {
      self.save(&event).await?;
    }

    info!(
      event_id = %event_id,
      added = added.len(),
      skipped = skipped.len(),
      "invitees added"
    );

    Ok(AddedInvitees { invitees: event.invitees, added, skipped })
  }

  pub async fn remove_invitee(
    &self,
    event_id: Uuid,
    requester: Uuid,
    invitee_id: Uuid,
  ) -> Result<Vec<Invitee>> {
    let mut event = self.load(event_id).await?;
    if !event.is_creator(requester) {
      return Err(Error::Unauthorized);
    }

    let before = event.invitees.len();
    event.invitees.retain(|i| i.invitee_id != invitee_id);
    if event.invitees.len() == before {
      return Err(Error::NotFound(format!("invitee {invitee_id}")));
    }

    self.save(&event).await?;
    info!(event_id = %event_id, invitee_id = %invitee_id, "invitee removed");
    Ok(event.invitees)
  }

  // ── Code holders ──────────────────────────────────────────────────────

  /// Record an answer to an invitation identified by its code.
  ///
  /// `responder` is the authenticated caller, if any. An email-only entry is
  /// bound to the first authenticated responder that names a known user;
  /// later responders never rebind it.
  pub async fn respond_to_invite(
    &self,
    event_id: Uuid,
    responder: Option<Uuid>,
    code: &str,
    status: &str,
  ) -> Result<Invitee> {
    let status = InviteStatus::parse_response(status).ok_or_else(|| {
      Error::InvalidInput(format!("status must be accepted or declined, got {status:?}"))
    })?;
    if code.is_empty() {
      return Err(Error::InvalidInput("missing invite code".into()));
    }

    let mut event = self.load(event_id).await?;

    let responder_exists = match responder {
      Some(r) => self.store.get_user(r).await.map_err(Error::persistence)?.is_some(),
      None => false,
    };

    // Binding must not give one user two entries in the same list.
    let responder_has_entry = responder
      .and_then(|r| event.invitee_for_user(r))
      .map(|i| i.code != code)
      .unwrap_or(false);

    let invitee = event
      .invitee_by_code_mut(code)
      .ok_or_else(|| Error::InvalidInput("unknown invite code".into()))?;

    invitee.status = status;
    invitee.responded_at = Some(Utc::now());

    if let (None, Some(responder)) = (invitee.user_id, responder) {
      if !responder_exists {
        warn!(
          event_id = %event_id,
          invitee_id = %invitee.invitee_id,
          responder = %responder,
          "responder names no known user; not binding"
        );
      } else if responder_has_entry {
        warn!(
          event_id = %event_id,
          invitee_id = %invitee.invitee_id,
          responder = %responder,
          "responder already holds another entry; not binding"
        );
      } else {
        invitee.user_id = Some(responder);
      }
    }

    let updated = invitee.clone();
    self.save(&event).await?;

    info!(
      event_id = %event_id,
      invitee_id = %updated.invitee_id,
      status = %updated.status,
      "invitation answered"
    );
    Ok(updated)
  }

  /// Public, read-only lookup of an invitation by code.
  pub async fn verify_invitation(&self, event_id: Uuid, code: &str) -> Result<InvitationView> {
    let event = self.load(event_id).await?;
    let invitee = event
      .invitees
      .iter()
      .find(|i| i.code == code)
      .ok_or_else(|| Error::NotFound("invitation".into()))?;

    Ok(InvitationView {
      event:      event.summary(),
      invitee_id: invitee.invitee_id,
      status:     invitee.status,
      code:       invitee.code.clone(),
    })
  }

  /// Send an `event_invite` notification to every pending invitee.
  ///
  /// A failure for one invitee is reported in the result and does not stop
  /// the others.
  pub async fn send_invitations(&self, event_id: Uuid, requester: Uuid) -> Result<SentInvitations> {
    let event = self.load(event_id).await?;
    if !event.is_creator(requester) {
      return Err(Error::Unauthorized);
    }

    let mut outcome = SentInvitations::default();

    for invitee in &event.invitees {
      if invitee.status != InviteStatus::Pending {
        continue;
      }
      match self.invite_one(&event, invitee).await {
        Ok(()) => outcome.sent.push(invitee.invitee_id),
        Err(e) => {
          warn!(event_id = %event_id, invitee_id = %invitee.invitee_id, error = %e, "invitation not sent");
          outcome.failed.push(FailedSend { invitee_id: invitee.invitee_id, reason: e.to_string() });
        }
      }
    }

    Ok(outcome)
  }

  async fn invite_one(&self, event: &Event, invitee: &Invitee) -> Result<()> {
    let email = match (&invitee.email, invitee.user_id) {
      (Some(email), _) => Some(email.clone()),
      (None, Some(user_id)) => self
        .store
        .get_user(user_id)
        .await
        .map_err(Error::persistence)?
        .map(|u| u.email),
      (None, None) => None,
    };
    let email = email.ok_or_else(|| Error::InvalidInput("no deliverable address".into()))?;

    let mut notification = NewNotification::new(
      NotificationKind::EventInvite,
      format!("You're invited to {}", event.title),
      format!(
        "You have been invited to {}. Respond with invite code {}.",
        event.title, invitee.code
      ),
    )
    .about_event(event.event_id);

    notification = match invitee.user_id {
      Some(user_id) => notification.to_user(user_id, Some(email)),
      None => notification.to_email(email),
    };

    self.dispatcher.notify(notification).await.map(|_| ())
  }
}
