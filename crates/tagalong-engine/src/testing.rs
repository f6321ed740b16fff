//! Test doubles for the engine's ports, plus a harness wiring them to an
//! in-memory SQLite store.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use tagalong_core::{
  photo::BoundingBox,
  ports::{BlobStore, DetectedRegion, FaceMatch, FaceRegistry, NotificationChannel},
  store::Store,
  user::{NewUser, User},
};
use tagalong_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{Backend, Engine, EngineConfig};

#[derive(Debug, thiserror::Error)]
#[error("fake failure: {0}")]
pub struct FakeError(pub &'static str);

// ─── Face registry ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeRegistry {
  regions:     Mutex<Vec<DetectedRegion>>,
  matches:     Mutex<Vec<FaceMatch>>,
  fail_detect: AtomicBool,
  fail_search: AtomicBool,
  searches:    AtomicUsize,
  registered:  Mutex<Vec<Uuid>>,
  doomed:      Mutex<Option<(Arc<SqliteStore>, Uuid)>>,
}

impl FakeRegistry {
  /// Make `detect` report `n` faces.
  pub fn with_faces(&self, n: usize) {
    *self.regions.lock().unwrap() = (0..n)
      .map(|_| DetectedRegion { bounding_box: BoundingBox::default(), confidence: 99.0 })
      .collect();
  }

  pub fn with_match(&self, external_user_id: impl Into<String>, confidence: f32) {
    let mut matches = self.matches.lock().unwrap();
    let n = matches.len();
    matches.push(FaceMatch {
      signature_id: format!("sig-{n}"),
      external_user_id: external_user_id.into(),
      bounding_box: BoundingBox { width: 0.25, height: 0.25, left: 0.1, top: 0.1 },
      confidence,
    });
  }

  pub fn fail_detect(&self) { self.fail_detect.store(true, Ordering::SeqCst); }

  pub fn fail_search(&self) { self.fail_search.store(true, Ordering::SeqCst); }

  /// Delete `photo_id` from `store` during the next `search` call.
  pub fn delete_during_search(&self, store: Arc<SqliteStore>, photo_id: Uuid) {
    *self.doomed.lock().unwrap() = Some((store, photo_id));
  }

  pub fn searches(&self) -> usize { self.searches.load(Ordering::SeqCst) }

  pub fn registered(&self) -> Vec<Uuid> { self.registered.lock().unwrap().clone() }
}

impl FaceRegistry for FakeRegistry {
  type Error = FakeError;

  async fn register(&self, user_id: Uuid, _image: &[u8]) -> Result<String, FakeError> {
    self.registered.lock().unwrap().push(user_id);
    Ok(format!("sig-for-{user_id}"))
  }

  async fn detect(&self, _image: &[u8]) -> Result<Vec<DetectedRegion>, FakeError> {
    if self.fail_detect.load(Ordering::SeqCst) {
      return Err(FakeError("detect"));
    }
    Ok(self.regions.lock().unwrap().clone())
  }

  async fn search(
    &self,
    _image: &[u8],
    threshold: f32,
    max_results: usize,
  ) -> Result<Vec<FaceMatch>, FakeError> {
    self.searches.fetch_add(1, Ordering::SeqCst);
    let doomed = self.doomed.lock().unwrap().take();
    if let Some((store, photo_id)) = doomed {
      store.delete_photo(photo_id).await.map_err(|_| FakeError("delete"))?;
    }
    if self.fail_search.load(Ordering::SeqCst) {
      return Err(FakeError("search"));
    }
    Ok(
      self
        .matches
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m.confidence >= threshold)
        .take(max_results)
        .cloned()
        .collect(),
    )
  }
}

// ─── Blob storage ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryBlobs {
  blobs:    Mutex<HashMap<String, Vec<u8>>>,
  fail_put: AtomicBool,
}

impl MemoryBlobs {
  pub fn contains(&self, locator: &str) -> bool {
    self.blobs.lock().unwrap().contains_key(locator)
  }

  pub fn len(&self) -> usize { self.blobs.lock().unwrap().len() }

  pub fn fail_puts(&self) { self.fail_put.store(true, Ordering::SeqCst); }
}

impl BlobStore for MemoryBlobs {
  type Error = FakeError;

  async fn put(&self, bytes: &[u8], _content_type: &str) -> Result<String, FakeError> {
    if self.fail_put.load(Ordering::SeqCst) {
      return Err(FakeError("put"));
    }
    let locator = Uuid::new_v4().to_string();
    self.blobs.lock().unwrap().insert(locator.clone(), bytes.to_vec());
    Ok(locator)
  }

  async fn get(&self, locator: &str) -> Result<Vec<u8>, FakeError> {
    self
      .blobs
      .lock()
      .unwrap()
      .get(locator)
      .cloned()
      .ok_or(FakeError("missing blob"))
  }

  async fn delete(&self, locator: &str) -> Result<(), FakeError> {
    self.blobs.lock().unwrap().remove(locator);
    Ok(())
  }
}

// ─── Delivery channel ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingChannel {
  delivered: Mutex<Vec<(String, String)>>,
  attempts:  AtomicUsize,
  fail:      AtomicBool,
}

impl RecordingChannel {
  /// `(address, subject)` of every successful delivery, in order.
  pub fn deliveries(&self) -> Vec<(String, String)> { self.delivered.lock().unwrap().clone() }

  pub fn attempts(&self) -> usize { self.attempts.load(Ordering::SeqCst) }

  pub fn fail_deliveries(&self, fail: bool) { self.fail.store(fail, Ordering::SeqCst); }
}

impl NotificationChannel for RecordingChannel {
  type Error = FakeError;

  async fn deliver(&self, address: &str, subject: &str, _body: &str) -> Result<(), FakeError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    if self.fail.load(Ordering::SeqCst) {
      return Err(FakeError("deliver"));
    }
    self
      .delivered
      .lock()
      .unwrap()
      .push((address.to_owned(), subject.to_owned()));
    Ok(())
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

pub struct TestBackend;

impl Backend for TestBackend {
  type Store = SqliteStore;
  type Registry = FakeRegistry;
  type Blobs = MemoryBlobs;
  type Channel = RecordingChannel;
}

pub struct Harness {
  pub engine:   Engine<TestBackend>,
  pub store:    Arc<SqliteStore>,
  pub registry: Arc<FakeRegistry>,
  pub blobs:    Arc<MemoryBlobs>,
  pub channel:  Arc<RecordingChannel>,
}

impl Harness {
  pub async fn new() -> Self {
    let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
    let registry = Arc::new(FakeRegistry::default());
    let blobs = Arc::new(MemoryBlobs::default());
    let channel = Arc::new(RecordingChannel::default());

    let engine = Engine::new(
      store.clone(),
      registry.clone(),
      blobs.clone(),
      channel.clone(),
      &EngineConfig { ingest_workers: 2 },
    );

    Self { engine, store, registry, blobs, channel }
  }

  pub async fn user(&self, name: &str) -> User {
    self
      .store
      .add_user(NewUser {
        name:  name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
      })
      .await
      .unwrap()
  }
}
