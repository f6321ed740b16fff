//! External collaborators the engine consumes but does not implement.
//!
//! - [`FaceRegistry`]: the face-signature engine, treated as a black box.
//! - [`BlobStore`]: raw photo storage addressed by an opaque locator.
//! - [`NotificationChannel`]: best-effort, email-shaped outbound delivery.
//!
//! Like [`Store`](crate::store::Store), every method returns a `Send` future
//! so implementations can be shared across tokio worker threads.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::photo::BoundingBox;

/// Registry search cutoff applied server-side, in percent similarity.
pub const MATCH_THRESHOLD: f32 = 90.0;

/// Maximum number of matches requested per search.
pub const MAX_MATCHES: usize = 5;

// ─── Face registry ───────────────────────────────────────────────────────────

/// A face found by [`FaceRegistry::detect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
  pub bounding_box: BoundingBox,
  /// Detector confidence that this region is a face, 0–100.
  pub confidence:   f32,
}

/// A registered signature matched by [`FaceRegistry::search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
  pub signature_id:     String,
  /// The identity the signature was registered under; see
  /// [`User::external_id`](crate::user::User::external_id).
  pub external_user_id: String,
  pub bounding_box:     BoundingBox,
  pub confidence:       f32,
}

pub trait FaceRegistry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Index the face in `image` under `user_id`; returns the signature id.
  fn register<'a>(
    &'a self,
    user_id: Uuid,
    image: &'a [u8],
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  fn detect<'a>(
    &'a self,
    image: &'a [u8],
  ) -> impl Future<Output = Result<Vec<DetectedRegion>, Self::Error>> + Send + 'a;

  /// Ranked matches at or above `threshold`, at most `max_results` of them.
  fn search<'a>(
    &'a self,
    image: &'a [u8],
    threshold: f32,
    max_results: usize,
  ) -> impl Future<Output = Result<Vec<FaceMatch>, Self::Error>> + Send + 'a;
}

// ─── Blob storage ────────────────────────────────────────────────────────────

pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `bytes` and return the locator to retrieve them with.
  fn put<'a>(
    &'a self,
    bytes: &'a [u8],
    content_type: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  fn get<'a>(
    &'a self,
    locator: &'a str,
  ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send + 'a;

  fn delete<'a>(
    &'a self,
    locator: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Outbound delivery ───────────────────────────────────────────────────────

pub trait NotificationChannel: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn deliver<'a>(
    &'a self,
    address: &'a str,
    subject: &'a str,
    body: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
