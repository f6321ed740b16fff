//! Orchestration for Tagalong: invitations, notification dispatch, and the
//! asynchronous photo-ingestion pipeline.
//!
//! Every component is generic over a [`Backend`], a type-level bundle naming
//! the concrete store and ports. Components hold their collaborators behind
//! `Arc`, so cloning one is cheap and a clone can be moved into a spawned
//! task.

pub mod dispatch;
pub mod ingest;
pub mod invitations;
pub mod invite_code;
pub mod photos;
pub mod profiles;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use serde::Deserialize;
use tagalong_core::{
  ports::{BlobStore, FaceRegistry, NotificationChannel},
  store::Store,
};

pub use dispatch::Dispatcher;
pub use ingest::{IngestOutcome, IngestPipeline};
pub use invitations::Invitations;
pub use photos::Photos;
pub use profiles::Profiles;

/// Names the concrete implementations a deployment plugs in.
pub trait Backend: Send + Sync + 'static {
  type Store: Store + 'static;
  type Registry: FaceRegistry + 'static;
  type Blobs: BlobStore + 'static;
  type Channel: NotificationChannel + 'static;
}

/// Tunables for the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
  /// Upper bound on ingestion runs executing at once.
  #[serde(default = "default_ingest_workers")]
  pub ingest_workers: usize,
}

fn default_ingest_workers() -> usize { 4 }

impl Default for EngineConfig {
  fn default() -> Self { Self { ingest_workers: default_ingest_workers() } }
}

/// All engine components wired to one set of collaborators.
pub struct Engine<B: Backend> {
  pub invitations:   Invitations<B>,
  pub notifications: Dispatcher<B>,
  pub photos:        Photos<B>,
  pub profiles:      Profiles<B>,
}

impl<B: Backend> Engine<B> {
  pub fn new(
    store: Arc<B::Store>,
    registry: Arc<B::Registry>,
    blobs: Arc<B::Blobs>,
    channel: Arc<B::Channel>,
    config: &EngineConfig,
  ) -> Self {
    let notifications = Dispatcher::new(store.clone(), channel);
    let pipeline = IngestPipeline::new(
      store.clone(),
      registry.clone(),
      blobs.clone(),
      notifications.clone(),
      config.ingest_workers,
    );

    Self {
      invitations: Invitations::new(store.clone(), notifications.clone()),
      photos: Photos::new(store.clone(), blobs, pipeline),
      profiles: Profiles::new(store, registry),
      notifications,
    }
  }
}
