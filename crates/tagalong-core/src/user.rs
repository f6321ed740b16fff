//! Users: the identities invitees, uploaders and notification recipients
//! resolve to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered application user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:           Uuid,
  pub name:              String,
  pub email:             String,
  /// Registry-assigned signature of the user's profile face, once registered.
  pub face_signature_id: Option<String>,
  pub created_at:        DateTime<Utc>,
}

impl User {
  /// The identity string handed to the face registry for this user.
  ///
  /// Search results carry it back as `external_user_id`.
  pub fn external_id(&self) -> String { self.user_id.hyphenated().to_string() }
}

/// Input for [`Store::add_user`](crate::store::Store::add_user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub name:  String,
  pub email: String,
}
