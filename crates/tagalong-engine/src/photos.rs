//! [`Photos`]: upload, listing and removal of event photos.
//!
//! An upload stores the bytes, records the photo unprocessed, and hands it to
//! the [`IngestPipeline`] without waiting for the result.

use std::sync::Arc;

use tagalong_core::{
  Error, Result,
  event::Event,
  photo::{NewPhoto, Photo},
  ports::BlobStore,
  store::Store,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Backend, IngestOutcome, IngestPipeline};

/// A freshly stored photo and the handle of its ingestion run.
#[derive(Debug)]
pub struct Upload {
  pub photo:     Photo,
  pub ingestion: JoinHandle<IngestOutcome>,
}

pub struct Photos<B: Backend> {
  store:    Arc<B::Store>,
  blobs:    Arc<B::Blobs>,
  pipeline: IngestPipeline<B>,
}

impl<B: Backend> Clone for Photos<B> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      blobs:    self.blobs.clone(),
      pipeline: self.pipeline.clone(),
    }
  }
}

impl<B: Backend> Photos<B> {
  pub fn new(store: Arc<B::Store>, blobs: Arc<B::Blobs>, pipeline: IngestPipeline<B>) -> Self {
    Self { store, blobs, pipeline }
  }

  pub fn pipeline(&self) -> &IngestPipeline<B> { &self.pipeline }

  async fn event(&self, event_id: Uuid) -> Result<Event> {
    self
      .store
      .get_event(event_id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::NotFound(format!("event {event_id}")))
  }

  async fn photo(&self, photo_id: Uuid) -> Result<Photo> {
    self
      .store
      .get_photo(photo_id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::NotFound(format!("photo {photo_id}")))
  }

  /// Store a photo for an event and schedule its ingestion.
  ///
  /// Only the creator and invitees bound to a user may upload.
  pub async fn upload(
    &self,
    event_id: Uuid,
    uploader: Uuid,
    bytes: &[u8],
    content_type: &str,
  ) -> Result<Upload> {
    let event = self.event(event_id).await?;
    if !event.is_participant(uploader) {
      return Err(Error::Unauthorized);
    }
    if bytes.is_empty() {
      return Err(Error::InvalidInput("photo is empty".into()));
    }
    let content_type = content_type.trim().to_ascii_lowercase();
    if !content_type.starts_with("image/") {
      return Err(Error::InvalidInput(format!("not an image: {content_type:?}")));
    }

    let locator = self
      .blobs
      .put(bytes, &content_type)
      .await
      .map_err(Error::external)?;

    let photo = match self
      .store
      .add_photo(NewPhoto {
        event_id,
        uploader_id: uploader,
        storage_locator: locator.clone(),
        content_type,
      })
      .await
    {
      Ok(photo) => photo,
      Err(e) => {
        if let Err(cleanup) = self.blobs.delete(&locator).await {
          warn!(%locator, error = %cleanup, "orphaned blob after failed photo insert");
        }
        return Err(Error::persistence(e));
      }
    };

    info!(photo_id = %photo.photo_id, %event_id, size = bytes.len(), "photo uploaded");
    let ingestion = self.pipeline.submit(photo.photo_id);

    Ok(Upload { photo, ingestion })
  }

  /// A single photo, visible to participants of its event.
  pub async fn get(&self, photo_id: Uuid, viewer: Uuid) -> Result<Photo> {
    let photo = self.photo(photo_id).await?;
    let event = self.event(photo.event_id).await?;
    if !event.is_participant(viewer) {
      return Err(Error::Unauthorized);
    }
    Ok(photo)
  }

  /// Photos of an event in upload order.
  pub async fn list(&self, event_id: Uuid, viewer: Uuid) -> Result<Vec<Photo>> {
    let event = self.event(event_id).await?;
    if !event.is_participant(viewer) {
      return Err(Error::Unauthorized);
    }
    self
      .store
      .list_photos(event_id)
      .await
      .map_err(Error::persistence)
  }

  /// Remove a photo and release its bytes. Allowed for the uploader and the
  /// event creator.
  pub async fn delete(&self, photo_id: Uuid, requester: Uuid) -> Result<()> {
    let photo = self.photo(photo_id).await?;
    if photo.uploader_id != requester {
      let event = self.event(photo.event_id).await?;
      if !event.is_creator(requester) {
        return Err(Error::Unauthorized);
      }
    }

    let removed = self
      .store
      .delete_photo(photo_id)
      .await
      .map_err(Error::persistence)?;
    if !removed {
      return Err(Error::NotFound(format!("photo {photo_id}")));
    }

    if let Err(e) = self.blobs.delete(&photo.storage_locator).await {
      warn!(%photo_id, locator = %photo.storage_locator, error = %e, "could not release photo bytes");
    }
    info!(%photo_id, "photo deleted");
    Ok(())
  }
}
