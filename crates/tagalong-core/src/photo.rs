//! Photos and the faces found in them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A face region in relative coordinates; every field is on a 0.0–1.0 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
  pub width:  f32,
  pub height: f32,
  pub left:   f32,
  pub top:    f32,
}

impl BoundingBox {
  /// Clamp every component into the 0.0–1.0 range.
  pub fn clamped(self) -> Self {
    let unit = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    Self {
      width:  unit(self.width),
      height: unit(self.height),
      left:   unit(self.left),
      top:    unit(self.top),
    }
  }
}

/// A registry hit recorded on a photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
  pub signature_id: String,
  pub user_id:      Option<Uuid>,
  pub bounding_box: BoundingBox,
  /// Similarity score, 0–100.
  pub confidence:   f32,
}

/// An uploaded photo.
///
/// `faces` keeps discovery order. `is_processed` flips to `true` exactly once,
/// when the ingestion run writes its results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
  pub photo_id:        Uuid,
  pub event_id:        Uuid,
  pub uploader_id:     Uuid,
  /// Opaque key understood by the configured [`BlobStore`](crate::ports::BlobStore).
  pub storage_locator: String,
  pub content_type:    String,
  pub is_processed:    bool,
  pub faces:           Vec<DetectedFace>,
  pub created_at:      DateTime<Utc>,
}

/// Input for [`Store::add_photo`](crate::store::Store::add_photo).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhoto {
  pub event_id:        Uuid,
  pub uploader_id:     Uuid,
  pub storage_locator: String,
  pub content_type:    String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clamped_bounds_stay_in_unit_range() {
    let b = BoundingBox { width: 1.4, height: -0.2, left: f32::NAN, top: 0.5 }.clamped();
    assert_eq!(b, BoundingBox { width: 1.0, height: 0.0, left: 0.0, top: 0.5 });
  }
}
