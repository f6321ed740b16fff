//! Production wiring for Tagalong.
//!
//! Supplies the live port implementations (filesystem blobs, HTTP face
//! registry, mail relay), bundles them with the SQLite store as [`Live`], and
//! mounts the JSON API under `/api`.

pub mod blobs;
pub mod error;
pub mod mail;
pub mod registry;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use tagalong_engine::{Backend, Engine, EngineConfig};
use tagalong_store_sqlite::SqliteStore;
use tower_http::trace::TraceLayer;

use blobs::FsBlobStore;
use mail::MailChannel;
use registry::HttpFaceRegistry;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TAGALONG_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub blob_dir:          PathBuf,
  pub face_registry_url: String,
  /// Unset means notifications are logged instead of mailed.
  #[serde(default)]
  pub mail_relay_url:    Option<String>,
  #[serde(default = "default_ingest_workers")]
  pub ingest_workers:    usize,
}

fn default_ingest_workers() -> usize { EngineConfig::default().ingest_workers }

impl ServerConfig {
  pub fn engine(&self) -> EngineConfig { EngineConfig { ingest_workers: self.ingest_workers } }
}

// ─── Backend ──────────────────────────────────────────────────────────────────

/// The deployed set of collaborators.
pub struct Live;

impl Backend for Live {
  type Store = SqliteStore;
  type Registry = HttpFaceRegistry;
  type Blobs = FsBlobStore;
  type Channel = MailChannel;
}

/// Open every collaborator named by `config` and wire up the engine.
pub async fn build_engine(config: &ServerConfig) -> Result<Engine<Live>, BuildError> {
  let store = SqliteStore::open(&config.store_path)
    .await
    .map_err(BuildError::Store)?;
  let blobs = FsBlobStore::open(&config.blob_dir).await?;
  let registry = HttpFaceRegistry::new(&config.face_registry_url)?;
  let channel = MailChannel::from_config(config.mail_relay_url.as_deref())?;

  Ok(Engine::new(
    Arc::new(store),
    Arc::new(registry),
    Arc::new(blobs),
    Arc::new(channel),
    &config.engine(),
  ))
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
  #[error("failed to open store: {0}")]
  Store(#[source] tagalong_store_sqlite::Error),

  #[error(transparent)]
  Port(#[from] Error),
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full HTTP surface: `/healthz` plus the API under `/api`.
pub fn app<B: Backend>(engine: Arc<Engine<B>>) -> Router {
  Router::new()
    .route("/healthz", get(|| async { "ok" }))
    .nest("/api", tagalong_api::api_router(engine))
    .layer(TraceLayer::new_for_http())
}

// ─── Test support ─────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
  use std::{
    sync::{Arc, Mutex},
    time::Duration,
  };

  use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode, header},
    routing::post,
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;
  use crate::test_util::{scratch_dir, serve};

  /// A registry that sees one face and matches it to whoever is in `tagged`.
  fn fake_registry(tagged: Arc<Mutex<String>>) -> Router {
    let bbox = json!({ "width": 0.3, "height": 0.3, "left": 0.2, "top": 0.2 });
    let detect_box = bbox.clone();
    Router::new()
      .route(
        "/detect",
        post(move || async move {
          Json(json!({ "faces": [{ "bounding_box": detect_box, "confidence": 99.0 }] }))
        }),
      )
      .route(
        "/search",
        post(move || async move {
          let external = tagged.lock().unwrap().clone();
          Json(json!({ "matches": [{
            "signature_id": "sig-1",
            "external_user_id": external,
            "bounding_box": bbox,
            "confidence": 97.0
          }] }))
        }),
      )
  }

  async fn call(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  fn json_request(method: &str, uri: &str, caller: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    if let Some(caller) = caller {
      builder = builder.header(tagalong_api::CALLER_HEADER, caller);
    }
    builder.body(Body::from(body.to_string())).unwrap()
  }

  #[tokio::test]
  async fn upload_is_tagged_end_to_end() {
    let tagged = Arc::new(Mutex::new(String::new()));
    let blob_dir = scratch_dir();
    let config = ServerConfig {
      host:              "127.0.0.1".into(),
      port:              0,
      store_path:        ":memory:".into(),
      blob_dir:          blob_dir.clone(),
      face_registry_url: serve(fake_registry(tagged.clone())).await,
      mail_relay_url:    None,
      ingest_workers:    2,
    };
    let router = app(Arc::new(build_engine(&config).await.unwrap()));

    let (status, _) = call(
      &router,
      Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, user) = call(
      &router,
      json_request("POST", "/api/users", None, json!({ "name": "Ada", "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ada = user["user_id"].as_str().unwrap().to_string();
    *tagged.lock().unwrap() = ada.clone();

    let (_, event) = call(
      &router,
      json_request("POST", "/api/events", Some(&ada), json!({ "title": "Launch" })),
    )
    .await;
    let event_id = event["event_id"].as_str().unwrap().to_string();

    let upload = Request::builder()
      .method("POST")
      .uri(format!("/api/events/{event_id}/photos"))
      .header(tagalong_api::CALLER_HEADER, &ada)
      .header(header::CONTENT_TYPE, "image/png")
      .body(Body::from(&b"\x89PNG"[..]))
      .unwrap();
    let (status, photo) = call(&router, upload).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let photo_id = photo["photo_id"].as_str().unwrap().to_string();

    let mut processed = Value::Null;
    for _ in 0..100 {
      let get = Request::builder()
        .uri(format!("/api/photos/{photo_id}"))
        .header(tagalong_api::CALLER_HEADER, &ada)
        .body(Body::empty())
        .unwrap();
      let (_, photo) = call(&router, get).await;
      if photo["is_processed"] == true {
        processed = photo;
        break;
      }
      tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(processed["faces"][0]["user_id"], ada.as_str());

    let inbox = Request::builder()
      .uri("/api/notifications")
      .header(tagalong_api::CALLER_HEADER, &ada)
      .body(Body::empty())
      .unwrap();
    let (_, inbox) = call(&router, inbox).await;
    assert_eq!(inbox[0]["kind"], "photo_tagged");

    std::fs::remove_dir_all(blob_dir).ok();
  }
}
