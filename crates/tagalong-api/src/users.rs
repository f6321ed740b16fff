//! Handlers for user endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: `{"name":"…","email":"…"}`; returns 201 |
//! | `GET`  | `/me` | The calling user |
//! | `PUT`  | `/me/face` | Raw image body; enrolls the caller's face |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bytes::Bytes;
use tagalong_core::user::{NewUser, User};
use tagalong_engine::{Backend, Engine};

use crate::{caller::Caller, error::ApiError};

/// `POST /users`
pub async fn create<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
  let user = engine.profiles.create_user(body).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /me`
pub async fn me<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
) -> Result<Json<User>, ApiError> {
  Ok(Json(engine.profiles.get_user(caller).await?))
}

/// `PUT /me/face`
pub async fn register_face<B: Backend>(
  State(engine): State<Arc<Engine<B>>>,
  Caller(caller): Caller,
  body: Bytes,
) -> Result<Json<User>, ApiError> {
  Ok(Json(engine.profiles.register_face(caller, &body).await?))
}
