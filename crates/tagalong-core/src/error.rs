//! Error taxonomy shared by every Tagalong layer.
//!
//! Backends keep their own error types; the engine folds them into
//! [`Error::Persistence`] or [`Error::ExternalService`] so no backend-specific
//! shape reaches a caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The actor lacks the required relationship to the resource.
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A durable write or read against the store failed.
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The face registry, blob storage, or a delivery channel failed.
  #[error("external service error: {0}")]
  ExternalService(String),
}

impl Error {
  pub fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(e))
  }

  pub fn external<E: std::fmt::Display>(e: E) -> Self {
    Self::ExternalService(e.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
