//! [`IngestPipeline`]: per-photo face detection, matching and tagging.
//!
//! Each uploaded photo gets exactly one ingestion run, submitted as a tokio
//! task and gated by a semaphore so at most `workers` runs execute at once.
//! The task is spawned before it takes a permit, so the number of runs
//! waiting for a permit is unbounded; each waiting run costs one parked task.
//! Runs are unordered and never retried. Once submitted they cannot be
//! cancelled.
//!
//! Failure policy:
//! - photo or event missing on reload: the run ends quietly (the photo may
//!   have been deleted while the run was queued);
//! - blob read, `detect` or `search` failure: logged, the photo is left with
//!   `is_processed = false` for good;
//! - a failed notification: logged, the face is still recorded.
//!
//! The face list and the processed flag are written together, once, after
//! every registry call has finished.

use std::sync::Arc;

use tagalong_core::{
  event::Event,
  notification::{NewNotification, NotificationKind},
  photo::{DetectedFace, Photo},
  ports::{BlobStore, FaceMatch, FaceRegistry, MATCH_THRESHOLD, MAX_MATCHES},
  store::Store,
  user::User,
};
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::{Instrument as _, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{Backend, Dispatcher};

/// How an ingestion run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
  /// The photo or its event no longer exists.
  Missing,
  /// Storage, registry or store failure; the photo stays unprocessed.
  Failed,
  /// `detect` found nothing; the photo is processed with no faces.
  NoFaces,
  /// Matches were recorded.
  Tagged { faces: usize, notified: usize },
  /// The photo was deleted before its results could be written.
  Vanished,
}

pub struct IngestPipeline<B: Backend> {
  store:      Arc<B::Store>,
  registry:   Arc<B::Registry>,
  blobs:      Arc<B::Blobs>,
  dispatcher: Dispatcher<B>,
  permits:    Arc<Semaphore>,
}

impl<B: Backend> Clone for IngestPipeline<B> {
  fn clone(&self) -> Self {
    Self {
      store:      self.store.clone(),
      registry:   self.registry.clone(),
      blobs:      self.blobs.clone(),
      dispatcher: self.dispatcher.clone(),
      permits:    self.permits.clone(),
    }
  }
}

impl<B: Backend> IngestPipeline<B> {
  pub fn new(
    store: Arc<B::Store>,
    registry: Arc<B::Registry>,
    blobs: Arc<B::Blobs>,
    dispatcher: Dispatcher<B>,
    workers: usize,
  ) -> Self {
    Self {
      store,
      registry,
      blobs,
      dispatcher,
      permits: Arc::new(Semaphore::new(workers.max(1))),
    }
  }

  /// Schedule an ingestion run and return immediately.
  ///
  /// The handle may be dropped; the run continues regardless. The spawned
  /// task waits for a permit, so queued runs are not capped.
  pub fn submit(&self, photo_id: Uuid) -> JoinHandle<IngestOutcome> {
    let pipeline = self.clone();
    let span = info_span!("ingest", %photo_id);

    tokio::spawn(
      async move {
        let Ok(_permit) = pipeline.permits.clone().acquire_owned().await else {
          error!("ingest semaphore closed");
          return IngestOutcome::Failed;
        };
        let outcome = pipeline.ingest(photo_id).await;
        debug!(?outcome, "ingest finished");
        outcome
      }
      .instrument(span),
    )
  }

  /// Run ingestion for one photo to completion.
  pub async fn ingest(&self, photo_id: Uuid) -> IngestOutcome {
    let Some((photo, event)) = self.reload(photo_id).await else {
      return IngestOutcome::Missing;
    };

    let image = match self.blobs.get(&photo.storage_locator).await {
      Ok(image) => image,
      Err(e) => {
        warn!(locator = %photo.storage_locator, error = %e, "could not read photo; leaving unprocessed");
        return IngestOutcome::Failed;
      }
    };

    let regions = match self.registry.detect(&image).await {
      Ok(regions) => regions,
      Err(e) => {
        warn!(error = %e, "face detection failed; leaving unprocessed");
        return IngestOutcome::Failed;
      }
    };

    if regions.is_empty() {
      debug!("no faces detected");
      return self.finish(photo_id, Vec::new(), IngestOutcome::NoFaces).await;
    }

    let matches = match self.registry.search(&image, MATCH_THRESHOLD, MAX_MATCHES).await {
      Ok(matches) => matches,
      Err(e) => {
        warn!(error = %e, "face search failed; leaving unprocessed");
        return IngestOutcome::Failed;
      }
    };

    debug!(detected = regions.len(), matched = matches.len(), "registry answered");

    let mut faces = Vec::with_capacity(matches.len());
    let mut notified = 0;

    for m in matches {
      let Some(user) = self.resolve(&m).await else {
        debug!(signature_id = %m.signature_id, "match does not resolve to a user; skipping");
        continue;
      };

      faces.push(DetectedFace {
        signature_id: m.signature_id,
        user_id:      Some(user.user_id),
        bounding_box: m.bounding_box.clamped(),
        confidence:   m.confidence.clamp(0.0, 100.0),
      });

      match self.dispatcher.notify(tagged(&user, &event, &photo)).await {
        Ok(_) => notified += 1,
        Err(e) => warn!(user_id = %user.user_id, error = %e, "tag notification not recorded"),
      }
    }

    let count = faces.len();
    self
      .finish(photo_id, faces, IngestOutcome::Tagged { faces: count, notified })
      .await
  }

  async fn reload(&self, photo_id: Uuid) -> Option<(Photo, Event)> {
    let photo = match self.store.get_photo(photo_id).await {
      Ok(Some(photo)) => photo,
      Ok(None) => {
        info!("photo no longer exists; nothing to ingest");
        return None;
      }
      Err(e) => {
        error!(error = %e, "could not load photo");
        return None;
      }
    };

    match self.store.get_event(photo.event_id).await {
      Ok(Some(event)) => Some((photo, event)),
      Ok(None) => {
        info!(event_id = %photo.event_id, "owning event no longer exists");
        None
      }
      Err(e) => {
        error!(event_id = %photo.event_id, error = %e, "could not load event");
        None
      }
    }
  }

  /// Map a registry identity back to a user, if it still names one.
  async fn resolve(&self, m: &FaceMatch) -> Option<User> {
    let user_id = Uuid::parse_str(&m.external_user_id).ok()?;
    match self.store.get_user(user_id).await {
      Ok(user) => user,
      Err(e) => {
        warn!(%user_id, error = %e, "could not resolve matched user");
        None
      }
    }
  }

  async fn finish(
    &self,
    photo_id: Uuid,
    faces: Vec<DetectedFace>,
    outcome: IngestOutcome,
  ) -> IngestOutcome {
    match self.store.complete_photo(photo_id, faces).await {
      Ok(true) => {
        info!(?outcome, "photo processed");
        outcome
      }
      Ok(false) => {
        info!("photo deleted during ingestion; results dropped");
        IngestOutcome::Vanished
      }
      Err(e) => {
        error!(error = %e, "could not store ingestion results");
        IngestOutcome::Failed
      }
    }
  }
}

fn tagged(user: &User, event: &Event, photo: &Photo) -> NewNotification {
  NewNotification::new(
    NotificationKind::PhotoTagged,
    format!("You were tagged in a photo from {}", event.title),
    format!("Hi {}, a new photo from {} has you in it.", user.name, event.title),
  )
  .to_user(user.user_id, Some(user.email.clone()))
  .about_event(event.event_id)
  .about_photo(photo.photo_id)
}
