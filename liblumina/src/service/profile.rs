//! User profiles
//!
//! Updating a profile touches three places one after another: the photo is
//! uploaded to blob storage, then the session user (and account) is updated,
//! then the profile document. A failure part way leaves the earlier steps in
//! place; nothing is rolled back.

use std::path::Path;
use std::sync::Arc;

use super::events::{Event, EventBus};
use crate::blob::{photo_url_extension, profile_photo_path, validate_photo, BlobStorage};
use crate::db::ProfileDocument;
use crate::error::{LuminaError, Result, StorageError};
use crate::store::SessionStore;
use crate::types::{now_millis, User};
use crate::Database;

/// A photo to attach to the profile
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// File extension without the dot, e.g. `png`
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Read a photo from disk, taking the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| {
                LuminaError::InvalidInput(format!(
                    "Cannot tell the image format of {}",
                    path.display()
                ))
            })?;
        let bytes = std::fs::read(path).map_err(StorageError::Io)?;
        Ok(Self { extension, bytes })
    }
}

/// Changes requested for the signed-in user's profile
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo: Option<PhotoUpload>,
}

#[derive(Clone)]
pub struct ProfileService {
    db: Arc<Database>,
    session: SessionStore,
    blobs: Arc<dyn BlobStorage>,
    event_bus: EventBus,
}

impl ProfileService {
    pub fn new(
        db: Arc<Database>,
        session: SessionStore,
        blobs: Arc<dyn BlobStorage>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            db,
            session,
            blobs,
            event_bus,
        }
    }

    /// The user's profile document, created on first access
    pub async fn get_or_create(&self, user: &User) -> Result<ProfileDocument> {
        if let Some(profile) = self.db.get_profile(&user.id).await? {
            return Ok(profile);
        }

        let profile = ProfileDocument::for_user(user);
        self.db.save_profile(&profile).await?;
        tracing::debug!(user_id = %user.id, "profile created");
        Ok(profile)
    }

    /// Profile of the signed-in user
    pub async fn current_profile(&self) -> Result<ProfileDocument> {
        let user = self.session.current().ok_or(LuminaError::NotAuthenticated)?;
        self.get_or_create(&user).await
    }

    /// Apply `update` to the signed-in user and return the updated user
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        let mut user = self.session.current().ok_or(LuminaError::NotAuthenticated)?;

        let display_name = match update.display_name.as_deref().map(str::trim) {
            Some("") => {
                return Err(LuminaError::InvalidInput(
                    "Display name cannot be empty".to_string(),
                ))
            }
            Some(name) => Some(name.to_string()),
            None => None,
        };
        if let Some(photo) = &update.photo {
            validate_photo(&photo.extension, &photo.bytes)?;
        }

        // Step 1: blob storage
        if let Some(photo) = &update.photo {
            let path = profile_photo_path(&user.id, &photo.extension);
            let url = self.blobs.upload(&path, &photo.bytes).await?;
            tracing::debug!(user_id = %user.id, %url, "profile photo uploaded");

            // A photo in another format lives at a different path
            if let Some(previous) = user.photo_url.as_deref().and_then(photo_url_extension) {
                if previous != photo.extension.to_lowercase() {
                    let stale = profile_photo_path(&user.id, &previous);
                    if let Err(e) = self.blobs.delete(&stale).await {
                        tracing::warn!(
                            user_id = %user.id,
                            path = %stale,
                            error = %e,
                            "failed to delete old profile photo"
                        );
                    }
                }
            }
            user.photo_url = Some(url);
        }
        if let Some(name) = display_name {
            user.display_name = name;
        }

        // Step 2: session user and account
        self.session.set(user.clone())?;
        self.db
            .update_account_profile(&user.id, &user.display_name, user.photo_url.as_deref())
            .await?;

        // Step 3: profile document
        let mut profile = self.get_or_create(&user).await?;
        profile.display_name = user.display_name.clone();
        profile.photo_url = user.photo_url.clone();
        profile.updated_at = now_millis();
        self.db.save_profile(&profile).await?;

        tracing::info!(user_id = %user.id, "profile updated");
        self.event_bus.emit(Event::ProfileUpdated {
            user_id: user.id.clone(),
        });
        Ok(user)
    }
}
