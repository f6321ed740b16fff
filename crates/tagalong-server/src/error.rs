//! Error type shared by the server's port implementations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// A remote service answered with a non-success status.
  #[error("{service} answered {status}: {body}")]
  Upstream {
    service: &'static str,
    status:  reqwest::StatusCode,
    body:    String,
  },

  /// A locator that would escape the blob directory.
  #[error("invalid blob locator: {0:?}")]
  InvalidLocator(String),
}
