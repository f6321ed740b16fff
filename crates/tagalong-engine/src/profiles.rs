//! [`Profiles`]: user records and face enrollment.

use std::sync::Arc;

use tagalong_core::{
  Error, Result,
  event::normalize_email,
  ports::FaceRegistry,
  store::Store,
  user::{NewUser, User},
};
use tracing::info;
use uuid::Uuid;

use crate::Backend;

pub struct Profiles<B: Backend> {
  store:    Arc<B::Store>,
  registry: Arc<B::Registry>,
}

impl<B: Backend> Clone for Profiles<B> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), registry: self.registry.clone() }
  }
}

impl<B: Backend> Profiles<B> {
  pub fn new(store: Arc<B::Store>, registry: Arc<B::Registry>) -> Self {
    Self { store, registry }
  }

  pub async fn create_user(&self, input: NewUser) -> Result<User> {
    let name = input.name.trim();
    if name.is_empty() {
      return Err(Error::InvalidInput("name must not be empty".into()));
    }
    let email = normalize_email(&input.email);
    if !email.contains('@') {
      return Err(Error::InvalidInput(format!("not an email address: {email:?}")));
    }

    let user = self
      .store
      .add_user(NewUser { name: name.to_owned(), email })
      .await
      .map_err(Error::persistence)?;
    info!(user_id = %user.user_id, "user created");
    Ok(user)
  }

  pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
    self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
  }

  /// Enroll the face in `image` under the user's id so later photos can be
  /// matched back to them. Re-enrolling replaces the stored signature.
  pub async fn register_face(&self, user_id: Uuid, image: &[u8]) -> Result<User> {
    let mut user = self.get_user(user_id).await?;
    if image.is_empty() {
      return Err(Error::InvalidInput("image is empty".into()));
    }

    let signature_id = self
      .registry
      .register(user_id, image)
      .await
      .map_err(Error::external)?;

    let updated = self
      .store
      .set_face_signature(user_id, signature_id.clone())
      .await
      .map_err(Error::persistence)?;
    if !updated {
      return Err(Error::NotFound(format!("user {user_id}")));
    }

    info!(%user_id, %signature_id, "face registered");
    user.face_signature_id = Some(signature_id);
    Ok(user)
  }
}
