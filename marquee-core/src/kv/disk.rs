use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::debug;

use super::KeyValueStore;
use crate::error::{Result, StoreError};

/// Durable store on top of `cacache`.
///
/// The directory is managed by `cacache` (index buckets + content-addressed
/// blobs). Removal writes a tombstone into the index and leaves the blob in
/// place, since identical documents under different keys share one blob.
#[derive(Clone, PartialEq, Eq)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl fmt::Debug for DiskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DiskStore").field(&self.root).finish()
    }
}

#[async_trait]
impl KeyValueStore for DiskStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let bytes = match cacache::read(self.root.as_path(), key).await {
            Ok(bytes) => bytes,
            Err(cacache::Error::EntryNotFound(_, _)) => return Ok(None),
            Err(cacache::Error::IntegrityError(err)) => {
                return Err(StoreError::Corrupted(format!(
                    "entry failed integrity check: {key} ({err})"
                )));
            }
            Err(cacache::Error::SizeMismatch(wanted, actual)) => {
                return Err(StoreError::Corrupted(format!(
                    "entry size mismatch: key={key}, wanted={wanted}, \
                     actual={actual}"
                )));
            }
            Err(cacache::Error::IoError(_, msg)) => {
                return Err(StoreError::Backend(format!(
                    "cacache read I/O error: {msg}"
                )));
            }
            Err(cacache::Error::SerdeError(_, msg)) => {
                return Err(StoreError::Backend(format!(
                    "cacache read serde error: {msg}"
                )));
            }
        };

        String::from_utf8(bytes).map(Some).map_err(|err| {
            StoreError::Corrupted(format!("entry is not UTF-8: {key} ({err})"))
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let integrity =
            cacache::write(self.root.as_path(), key, value.as_bytes())
                .await
                .map_err(|e| {
                    StoreError::Backend(format!("cacache write failed: {e}"))
                })?;
        debug!(key, %integrity, bytes = value.len(), "stored entry");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        cacache::remove(self.root.as_path(), key)
            .await
            .map_err(|e| {
                StoreError::Backend(format!("cacache remove failed: {e}"))
            })
    }
}
