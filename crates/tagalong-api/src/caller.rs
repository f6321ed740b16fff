//! Caller-identity extractors.
//!
//! The id in [`CALLER_HEADER`] is trusted as-is; verifying it is the job of
//! whatever sits in front of this router.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const CALLER_HEADER: &str = "x-user-id";

/// The authenticated user making the request. Rejects with 401 when absent.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Uuid);

/// The caller if one was identified; for endpoints open to code holders.
#[derive(Debug, Clone, Copy)]
pub struct MaybeCaller(pub Option<Uuid>);

/// A present but unparseable header counts as an error, not as anonymous.
fn read_caller(parts: &Parts) -> Result<Option<Uuid>, ApiError> {
  let Some(value) = parts.headers.get(CALLER_HEADER) else {
    return Ok(None);
  };
  value
    .to_str()
    .ok()
    .and_then(|s| Uuid::parse_str(s.trim()).ok())
    .map(Some)
    .ok_or(ApiError::MissingCaller)
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    read_caller(parts)?.map(Caller).ok_or(ApiError::MissingCaller)
  }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeCaller {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    read_caller(parts).map(MaybeCaller)
  }
}
