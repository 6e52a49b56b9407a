//! Image persistence seam
//!
//! Persistence is attempted exactly once per successful fetch and is never
//! retried by the engine; a failure here becomes a terminal storage failure
//! for the URL. The [`ImageStore`] trait keeps the engine ignorant of *how*
//! bytes are stored.

use crate::error::StoreError;
use std::path::{Path, PathBuf};

/// Abstraction over where fetched images end up
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Where the image for `url` already lives, if anywhere
    ///
    /// A `Some` answer makes the engine skip the task without a fetch.
    async fn existing(&self, url: &str) -> Option<PathBuf>;

    /// Persist the fetched bytes for `url`, returning where they landed
    async fn persist(&self, url: &str, bytes: &[u8]) -> Result<PathBuf, StoreError>;
}

/// Production [`ImageStore`] writing one file per URL into an output folder
///
/// The filename is derived deterministically from the URL's final path
/// segment. Collisions between distinct URLs that share a filename are out
/// of scope: last write wins.
pub struct DiskStore {
    folder: PathBuf,
}

impl DiskStore {
    /// Create a store rooted at `folder`
    ///
    /// The folder itself is created lazily on the first write.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// The output folder this store writes into
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Derive the output path for `url` from its final path segment
    fn file_path(&self, url: &str) -> Result<PathBuf, StoreError> {
        let parsed = url::Url::parse(url).map_err(|_| StoreError::NoFilename {
            url: url.to_string(),
        })?;
        let name = parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| StoreError::NoFilename {
                url: url.to_string(),
            })?;
        Ok(self.folder.join(name))
    }
}

#[async_trait::async_trait]
impl ImageStore for DiskStore {
    async fn existing(&self, url: &str) -> Option<PathBuf> {
        let path = self.file_path(url).ok()?;
        tokio::fs::try_exists(&path)
            .await
            .unwrap_or(false)
            .then_some(path)
    }

    async fn persist(&self, url: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.file_path(url)?;
        tokio::fs::create_dir_all(&self.folder).await.map_err(|e| {
            StoreError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "failed to create output folder '{}': {}",
                    self.folder.display(),
                    e
                ),
            ))
        })?;
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}
