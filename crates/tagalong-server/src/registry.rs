//! [`HttpFaceRegistry`]: the face-signature service over HTTP.
//!
//! Images travel as raw `application/octet-stream` bodies; answers are JSON.
//!
//! | Call | Request | Response |
//! |------|---------|----------|
//! | register | `POST /faces/{external_id}` | `{"signature_id":"…"}` |
//! | detect   | `POST /detect` | `{"faces":[DetectedRegion]}` |
//! | search   | `POST /search?threshold=…&max_results=…` | `{"matches":[FaceMatch]}` |

use std::time::Duration;

use reqwest::{Client, RequestBuilder, header};
use serde::{Deserialize, de::DeserializeOwned};
use tagalong_core::ports::{DetectedRegion, FaceMatch, FaceRegistry};
use uuid::Uuid;

use crate::Error;

const SERVICE: &str = "face registry";

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpFaceRegistry {
  client:   Client,
  base_url: String,
}

#[derive(Deserialize)]
struct Registered {
  signature_id: String,
}

#[derive(Deserialize)]
struct Detected {
  faces: Vec<DetectedRegion>,
}

#[derive(Deserialize)]
struct Matches {
  matches: Vec<FaceMatch>,
}

impl HttpFaceRegistry {
  pub fn new(base_url: &str) -> Result<Self, Error> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  async fn send_image<T: DeserializeOwned>(
    &self,
    request: RequestBuilder,
    image: &[u8],
  ) -> Result<T, Error> {
    let resp = request
      .header(header::CONTENT_TYPE, "application/octet-stream")
      .body(image.to_vec())
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Upstream { service: SERVICE, status, body });
    }
    Ok(resp.json().await?)
  }
}

impl FaceRegistry for HttpFaceRegistry {
  type Error = Error;

  async fn register(&self, user_id: Uuid, image: &[u8]) -> Result<String, Error> {
    let url = self.url(&format!("/faces/{}", user_id.hyphenated()));
    let registered: Registered = self.send_image(self.client.post(url), image).await?;
    Ok(registered.signature_id)
  }

  async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedRegion>, Error> {
    let detected: Detected = self
      .send_image(self.client.post(self.url("/detect")), image)
      .await?;
    Ok(detected.faces)
  }

  async fn search(
    &self,
    image: &[u8],
    threshold: f32,
    max_results: usize,
  ) -> Result<Vec<FaceMatch>, Error> {
    let request = self.client.post(self.url("/search")).query(&[
      ("threshold", threshold.to_string()),
      ("max_results", max_results.to_string()),
    ]);
    let found: Matches = self.send_image(request, image).await?;
    Ok(found.matches)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::post,
  };
  use bytes::Bytes;
  use serde_json::{Value, json};

  use super::*;
  use crate::test_util::serve;

  fn fake_registry() -> Router {
    Router::new()
      .route(
        "/faces/{id}",
        post(|Path(id): Path<String>, body: Bytes| async move {
          Json(json!({ "signature_id": format!("{id}:{}", body.len()) }))
        }),
      )
      .route(
        "/detect",
        post(|| async {
          Json(json!({ "faces": [
            { "bounding_box": { "width": 0.2, "height": 0.2, "left": 0.1, "top": 0.1 }, "confidence": 99.5 }
          ] }))
        }),
      )
      .route(
        "/search",
        post(|Query(q): Query<HashMap<String, String>>| async move {
          Json(json!({ "matches": [{
            "signature_id": "s-1",
            "external_user_id": format!("{}/{}", q["threshold"], q["max_results"]),
            "bounding_box": { "width": 0.2, "height": 0.2, "left": 0.1, "top": 0.1 },
            "confidence": 93.0
          }] }))
        }),
      )
  }

  #[tokio::test]
  async fn speaks_the_registry_protocol() {
    let registry = HttpFaceRegistry::new(&serve(fake_registry()).await).unwrap();
    let user_id = Uuid::new_v4();

    let signature = registry.register(user_id, b"face").await.unwrap();
    assert_eq!(signature, format!("{user_id}:4"));

    let faces = registry.detect(b"img").await.unwrap();
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].confidence, 99.5);

    let matches = registry.search(b"img", 90.0, 5).await.unwrap();
    assert_eq!(matches[0].external_user_id, "90/5");
    assert_eq!(matches[0].confidence, 93.0);
  }

  #[tokio::test]
  async fn non_success_status_is_upstream_error() {
    let failing = Router::new().route(
      "/detect",
      post(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(Value::Null)) }),
    );
    let registry = HttpFaceRegistry::new(&serve(failing).await).unwrap();

    let err = registry.detect(b"img").await.unwrap_err();
    assert!(
      matches!(err, Error::Upstream { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE),
      "{err}"
    );
  }
}
