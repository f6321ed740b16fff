//! Handlers for photos.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/events/:event_id/photos` | Raw image body with its `Content-Type`; returns 202 |
//! | `GET`    | `/events/:event_id/photos` | Upload order |
//! | `GET`    | `/photos/:photo_id` | Participants only |
//! | `DELETE` | `/photos/:photo_id` | Uploader or event creator; returns 204 |
//!
//! Uploads answer before face matching runs, so the returned photo is
//! always unprocessed.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use bytes::Bytes;
use tagalong_core::photo::Photo;
use tagalong_engine::{Backend, Engine};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError};

/// `POST /events/:event_id/photos`
pub async fn upload<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path(event_id): Path<Uuid>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default();

  // The ingestion handle is dropped; the run carries on detached.
  let upload = engine
    .photos
    .upload(event_id, caller, &body, content_type)
    .await?;
  Ok((StatusCode::ACCEPTED, Json(upload.photo)))
}

/// `GET /events/:event_id/photos`
pub async fn list<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Photo>>, ApiError> {
  Ok(Json(engine.photos.list(event_id, caller).await?))
}

/// `GET /photos/:photo_id`
pub async fn get_one<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path(photo_id): Path<Uuid>,
) -> Result<Json<Photo>, ApiError> {
  Ok(Json(engine.photos.get(photo_id, caller).await?))
}

/// `DELETE /photos/:photo_id`
pub async fn delete_one<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  Path(photo_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.photos.delete(photo_id, caller).await?;
  Ok(StatusCode::NO_CONTENT)
}
