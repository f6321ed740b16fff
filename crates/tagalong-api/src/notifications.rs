//! Handlers for the caller's notifications.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notifications` | Newest first |
//! | `POST` | `/notifications/:notification_id/read` | Recipient only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use tagalong_core::notification::Notification;
use tagalong_engine::{Backend, Engine};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

/// `GET /notifications`
pub async fn list<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<Notification>>, ApiError> {
  Ok(Json(engine.notifications.list_for(caller).await?))
}

/// `POST /notifications/:notification_id/read`
pub async fn mark_read<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
  Ok(Json(engine.notifications.mark_read(notification_id, caller).await?))
}
