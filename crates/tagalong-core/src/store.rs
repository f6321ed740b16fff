//! The `Store` trait: the persistence seam.
//!
//! The trait is implemented by storage backends (e.g. `tagalong-store-sqlite`).
//! Higher layers (`tagalong-engine`, `tagalong-api`) depend on this
//! abstraction, not on any concrete backend.
//!
//! Events and photos are documents: each mutating method below replaces one
//! document's mutable part in a single write, so a caller never observes a
//! half-applied change.

use std::future::Future;

use uuid::Uuid;

use crate::{
  event::{Event, Invitee, NewEvent},
  notification::{NewNotification, Notification},
  photo::{DetectedFace, NewPhoto, Photo},
  user::{NewUser, User},
};

/// Abstraction over a Tagalong store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`) and from spawned
/// ingestion tasks.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by UUID. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Attach a registry signature to a user. Returns `false` if the user does
  /// not exist.
  fn set_face_signature(
    &self,
    user_id: Uuid,
    signature_id: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Create an event with an empty invitee list.
  fn add_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Replace the whole invitee list of an event in one write.
  ///
  /// Last write wins; there is no version check. Returns `false` if the event
  /// no longer exists.
  fn save_invitees(
    &self,
    event_id: Uuid,
    invitees: Vec<Invitee>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Photos ────────────────────────────────────────────────────────────

  /// Create an unprocessed photo record with no faces.
  fn add_photo(
    &self,
    input: NewPhoto,
  ) -> impl Future<Output = Result<Photo, Self::Error>> + Send + '_;

  fn get_photo(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Photo>, Self::Error>> + Send + '_;

  /// All photos of an event, oldest first.
  fn list_photos(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Photo>, Self::Error>> + Send + '_;

  /// Store the face list and set `is_processed` in one write. Returns `false`
  /// if the photo no longer exists.
  fn complete_photo(
    &self,
    photo_id: Uuid,
    faces: Vec<DetectedFace>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if the photo did not exist.
  fn delete_photo(
    &self,
    photo_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn add_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn get_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  /// Notifications addressed to a user, newest first.
  fn list_notifications(
    &self,
    recipient_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  fn mark_notification_sent(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn mark_notification_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
