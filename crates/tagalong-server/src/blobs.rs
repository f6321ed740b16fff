//! [`FsBlobStore`]: photo bytes as files under one directory.
//!
//! Locators are relative paths of the form `ab/<uuid>.<ext>`, sharded on the
//! first two hex digits of the id. Writes land in a `.part` file first and
//! are renamed into place, so a reader never sees a half-written photo.

use std::path::{Component, Path, PathBuf};

use tagalong_core::ports::BlobStore;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::Error;

pub struct FsBlobStore {
  root: PathBuf,
}

impl FsBlobStore {
  /// Open (creating if needed) the blob directory at `root`.
  pub async fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
    let root = root.into();
    fs::create_dir_all(&root).await?;
    Ok(Self { root })
  }

  fn resolve(&self, locator: &str) -> Result<PathBuf, Error> {
    let relative = Path::new(locator);
    let well_formed = !locator.is_empty()
      && relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !well_formed {
      return Err(Error::InvalidLocator(locator.to_owned()));
    }
    Ok(self.root.join(relative))
  }
}

fn extension_for(content_type: &str) -> &'static str {
  match content_type {
    "image/jpeg" | "image/jpg" => "jpg",
    "image/png" => "png",
    "image/gif" => "gif",
    "image/webp" => "webp",
    "image/heic" => "heic",
    _ => "bin",
  }
}

/// Write to a `.part` sibling, then rename it over `path`. The partial file
/// is removed if either step fails.
async fn write_into_place(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
  let partial = path.with_extension("part");
  let written = match fs::write(&partial, bytes).await {
    Ok(()) => fs::rename(&partial, path).await,
    Err(e) => Err(e),
  };
  if written.is_err() {
    fs::remove_file(&partial).await.ok();
  }
  written
}

impl BlobStore for FsBlobStore {
  type Error = Error;

  async fn put(&self, bytes: &[u8], content_type: &str) -> Result<String, Error> {
    let id = Uuid::new_v4().simple().to_string();
    let locator = format!("{}/{id}.{}", &id[..2], extension_for(content_type));
    let path = self.resolve(&locator)?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }
    write_into_place(&path, bytes).await?;

    debug!(%locator, size = bytes.len(), "blob stored");
    Ok(locator)
  }

  async fn get(&self, locator: &str) -> Result<Vec<u8>, Error> {
    Ok(fs::read(self.resolve(locator)?).await?)
  }

  /// Removing a blob that is already gone succeeds.
  async fn delete(&self, locator: &str) -> Result<(), Error> {
    match fs::remove_file(self.resolve(locator)?).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_util::scratch_dir;

  #[tokio::test]
  async fn put_get_delete() {
    let dir = scratch_dir();
    let blobs = FsBlobStore::open(&dir).await.unwrap();

    let locator = blobs.put(b"\xff\xd8jpeg", "image/jpeg").await.unwrap();
    assert!(locator.ends_with(".jpg"));
    assert_eq!(&locator[..2], &locator[3..5]);
    assert_eq!(blobs.get(&locator).await.unwrap(), b"\xff\xd8jpeg");

    blobs.delete(&locator).await.unwrap();
    assert!(blobs.get(&locator).await.is_err());
    blobs.delete(&locator).await.unwrap();

    std::fs::remove_dir_all(dir).ok();
  }

  #[tokio::test]
  async fn failed_rename_removes_partial_file() {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    // Renaming a file over a non-empty directory fails.
    let target = dir.join("ab.jpg");
    std::fs::create_dir_all(target.join("occupied")).unwrap();

    assert!(write_into_place(&target, b"jpeg").await.is_err());
    assert!(!dir.join("ab.part").exists());
    assert!(target.join("occupied").is_dir());

    std::fs::remove_dir_all(dir).ok();
  }

  #[tokio::test]
  async fn unknown_types_get_a_generic_extension() {
    let dir = scratch_dir();
    let blobs = FsBlobStore::open(&dir).await.unwrap();
    let locator = blobs.put(b"raw", "image/x-raw").await.unwrap();
    assert!(locator.ends_with(".bin"));
    std::fs::remove_dir_all(dir).ok();
  }

  #[tokio::test]
  async fn locators_cannot_escape_the_root() {
    let dir = scratch_dir();
    let blobs = FsBlobStore::open(&dir).await.unwrap();

    for locator in ["", "../secret", "/etc/passwd", "ab/../../x"] {
      let err = blobs.get(locator).await.unwrap_err();
      assert!(matches!(err, Error::InvalidLocator(_)), "{locator:?}");
    }
    std::fs::remove_dir_all(dir).ok();
  }
}
