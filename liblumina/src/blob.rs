//! Blob storage for uploaded files
//!
//! Profile photos are stored under a path keyed by the user id. Uploading
//! returns a URL that can be saved on the profile.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{LuminaError, Result, StorageError};

/// Supported profile photo formats
const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Maximum accepted photo size (5MB)
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Storage path for a user's profile photo
pub fn profile_photo_path(user_id: &str, extension: &str) -> String {
    format!("profile-photos/{}.{}", user_id, extension.to_lowercase())
}

/// Extension of a stored profile photo, taken from its URL
pub fn photo_url_extension(url: &str) -> Option<String> {
    let file_name = url.rsplit('/').next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    Some(extension.to_lowercase())
}

/// Check a photo upload before it is stored
pub fn validate_photo(extension: &str, bytes: &[u8]) -> Result<()> {
    let extension = extension.to_lowercase();
    if !PHOTO_EXTENSIONS.contains(&extension.as_str()) {
        return Err(LuminaError::InvalidInput(format!(
            "Unsupported photo format '{}'. Supported: {}",
            extension,
            PHOTO_EXTENSIONS.join(", ")
        )));
    }
    if bytes.is_empty() {
        return Err(LuminaError::InvalidInput("Photo file is empty".to_string()));
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(LuminaError::InvalidInput(format!(
            "Photo is too large: {} bytes (max {})",
            bytes.len(),
            MAX_PHOTO_BYTES
        )));
    }
    Ok(())
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `bytes` at `path` (relative, `/`-separated) and return a public URL
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String>;

    /// Remove the blob at `path`; missing blobs are not an error
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Blob storage backed by a local directory
#[derive(Debug, Clone)]
pub struct FsBlobStorage {
    root: PathBuf,
}

impl FsBlobStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(LuminaError::InvalidInput(format!(
                    "Invalid blob path: {}",
                    path
                )));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }
}

#[async_trait]
impl BlobStorage for FsBlobStorage {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::Io)?;
        }

        tokio::fs::write(&target, bytes)
            .await
            .map_err(StorageError::Io)?;

        tracing::debug!(path, size = bytes.len(), "blob uploaded");
        Ok(format!("file://{}", target.display()))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }
}
