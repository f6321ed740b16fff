//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tagalong_core::Error as CoreError;
use thiserror::Error;
use tracing::{error, warn};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No usable caller identity on a request that needs one.
  #[error("missing or malformed x-user-id header")]
  MissingCaller,

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::MissingCaller => StatusCode::UNAUTHORIZED,
      ApiError::Core(CoreError::Unauthorized) => StatusCode::FORBIDDEN,
      ApiError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
      ApiError::Core(CoreError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
      ApiError::Core(CoreError::Persistence(_)) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::Core(CoreError::ExternalService(_)) => StatusCode::BAD_GATEWAY,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      // Storage details stay in the log.
      ApiError::Core(CoreError::Persistence(e)) => {
        error!(error = %e, "persistence failure");
        "internal error".to_string()
      }
      ApiError::Core(CoreError::ExternalService(m)) => {
        warn!(error = %m, "upstream service failure");
        self.to_string()
      }
      _ => self.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
