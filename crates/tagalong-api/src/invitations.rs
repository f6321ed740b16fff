//! Handlers for invite codes.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/events/:event_id/respond` | Body: `{"code":"…","status":"accepted"}`; caller optional |
//! | `GET`  | `/events/:event_id/invitations/:code` | Public |
//! | `POST` | `/events/:event_id/invitations/send` | Creator only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use tagalong_core::event::Invitee;
use tagalong_engine::{
  Backend, Engine,
  invitations::{InvitationView, SentInvitations},
};
use uuid::Uuid;

use crate::{
  caller::{Caller, MaybeCaller},
  error::ApiError,
};

/// Missing fields deserialize empty and are rejected by the engine.
#[derive(Debug, Deserialize)]
pub struct RespondBody {
  #[serde(default)]
  pub code:   String,
  #[serde(default)]
  pub status: String,
}

/// `POST /events/:event_id/respond`
pub async fn respond<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  MaybeCaller(caller): MaybeCaller,
  Path(event_id): Path<Uuid>,
  Json(body): Json<RespondBody>,
) -> Result<Json<Invitee>, ApiError> {
  let invitee = engine
    .invitations
    .respond_to_invite(event_id, caller, &body.code, &body.status)
    .await?;
  Ok(Json(invitee))
}

/// `GET /events/:event_id/invitations/:code`
pub async fn verify<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Path((event_id, code)): Path<(Uuid, String)>,
) -> Result<Json<InvitationView>, ApiError> {
  Ok(Json(engine.invitations.verify_invitation(event_id, &code).await?))
}

/// `POST /events/:event_id/invitations/send`
pub async fn send<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path(event_id): Path<Uuid>,
) -> Result<Json<SentInvitations>, ApiError> {
  Ok(Json(engine.invitations.send_invitations(event_id, caller).await?))
}
