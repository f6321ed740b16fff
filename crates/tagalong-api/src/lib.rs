//! JSON REST API for Tagalong.
//!
//! Exposes an axum [`Router`] over a shared [`Engine`]. Authentication is
//! the caller's responsibility: an upstream proxy verifies the user and
//! forwards their id in the `x-user-id` header (see [`caller`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tagalong_api::api_router(engine.clone()))
//! ```

pub mod caller;
pub mod error;
pub mod events;
pub mod invitations;
pub mod notifications;
pub mod photos;
pub mod users;


use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post, put},
};
use tagalong_engine::{Backend, Engine};

pub use caller::{CALLER_HEADER, Caller, MaybeCaller};
pub use error::ApiError;

/// Largest request body accepted, sized for photo uploads.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<B: Backend>(engine: Arc<Engine<B>>) -> Router<()> {
  Router::new()
    // Users
    .route("/users", post(users::create::<B>))
    .route("/me", get(users::me::<B>))
    .route("/me/face", put(users::register_face::<B>))
    // Events and invitee lists
    .route("/events", post(events::create::<B>))
    .route("/events/{event_id}", get(events::get_one::<B>))
    .route("/events/{event_id}/invitees", post(events::add_invitees::<B>))
    .route(
      "/events/{event_id}/invitees/{invitee_id}",
      delete(events::remove_invitee::<B>),
    )
    // Invitations
    .route("/events/{event_id}/respond", post(invitations::respond::<B>))
    .route("/events/{event_id}/invitations/send", post(invitations::send::<B>))
    .route("/events/{event_id}/invitations/{code}", get(invitations::verify::<B>))
    // Photos
    .route(
      "/events/{event_id}/photos",
      get(photos::list::<B>).post(photos::upload::<B>),
    )
    .route("/photos/{photo_id}", get(photos::get_one::<B>).delete(photos::delete_one::<B>))
    // Notifications
    .route("/notifications", get(notifications::list::<B>))
    .route("/notifications/{notification_id}/read", post(notifications::mark_read::<B>))
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .with_state(engine)
}
