//! Handlers for events and their invitee lists.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/events` | Body: [`CreateEvent`]; returns 201 |
//! | `GET`    | `/events/:event_id` | Invitees see only their own entry |
//! | `POST`   | `/events/:event_id/invitees` | Body: [`AddInviteesBody`]; creator only |
//! | `DELETE` | `/events/:event_id/invitees/:invitee_id` | Creator only; returns the remaining list |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tagalong_core::event::{Event, Invitee, InviteeSpec};
use tagalong_engine::{
  Backend, Engine,
  invitations::{AddedInvitees, CreateEvent},
};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

/// `POST /events`
pub async fn create<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Json(body): Json<CreateEvent>,
) -> Result<impl IntoResponse, ApiError> {
  let event = engine.invitations.create_event(caller, body).await?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/:event_id`
pub async fn get_one<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path(event_id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
  Ok(Json(engine.invitations.get_event(event_id, caller).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddInviteesBody {
  pub invitees: Vec<InviteeSpec>,
}

/// `POST /events/:event_id/invitees`: skipped entries are reported in the
/// body, not as an error.
pub async fn add_invitees<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path(event_id): Path<Uuid>,
  Json(body): Json<AddInviteesBody>,
) -> Result<Json<AddedInvitees>, ApiError> {
  let result = engine
    .invitations
    .add_invitees(event_id, caller, body.invitees)
    .await?;
  Ok(Json(result))
}

/// `DELETE /events/:event_id/invitees/:invitee_id`
pub async fn remove_invitee<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path((event_id, invitee_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Invitee>>, ApiError> {
  let remaining = engine
    .invitations
    .remove_invitee(event_id, caller, invitee_id)
    .await?;
  Ok(Json(remaining))
}
