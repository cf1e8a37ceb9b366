//! Photo strategies: profile, cover and destination photos, singular and grouped

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{
    actor_thumbnail, actor_title, optional, optional_batch, plural, require, RenderingStrategy,
};
use crate::error::Result;
use crate::feed_item::RenderedItem;
use crate::traits::{Collaborators, DestinationRepository, PhotoRepository, ProfileRepository};

// ============================================================================
// NEW_PROFILE_PHOTO
// ============================================================================

/// A user set a new profile picture
pub struct NewProfilePhotoStrategy {
    photo_id: i64,
    user_id: i64,
    photos: Arc<dyn PhotoRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl NewProfilePhotoStrategy {
    pub fn new(photo_id: i64, user_id: i64, collaborators: &Collaborators) -> Self {
        Self {
            photo_id,
            user_id,
            photos: collaborators.photos.clone(),
            profiles: collaborators.profiles.clone(),
        }
    }
}

#[async_trait]
impl RenderingStrategy for NewProfilePhotoStrategy {
    fn name(&self) -> &'static str {
        "new_profile_photo"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (profile, photo) = tokio::join!(
            self.profiles.find_profile(self.user_id),
            self.photos.find_photo(self.photo_id)
        );
        let profile = require(profile, "profile", self.user_id)?;
        let photo = optional(photo, "photo", self.photo_id);

        Ok(RenderedItem::new("has a new profile picture")
            .with_title(profile.display_name())
            .with_thumbnail(photo.as_ref().map(|p| p.thumbnail_filename.clone()))
            .with_payload(json!({ "profile": profile, "photo": photo })))
    }
}

// ============================================================================
// NEW_PROFILE_COVER_PHOTO
// ============================================================================

/// A user set a new cover picture
pub struct NewCoverPhotoStrategy {
    photo_id: i64,
    user_id: i64,
    photos: Arc<dyn PhotoRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl NewCoverPhotoStrategy {
    pub fn new(photo_id: i64, user_id: i64, collaborators: &Collaborators) -> Self {
        Self {
            photo_id,
            user_id,
            photos: collaborators.photos.clone(),
            profiles: collaborators.profiles.clone(),
        }
    }
}

#[async_trait]
impl RenderingStrategy for NewCoverPhotoStrategy {
    fn name(&self) -> &'static str {
        "new_cover_photo"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (profile, photo) = tokio::join!(
            self.profiles.find_profile(self.user_id),
            self.photos.find_photo(self.photo_id)
        );
        let profile = require(profile, "profile", self.user_id)?;
        let photo = optional(photo, "photo", self.photo_id);

        Ok(RenderedItem::new("has updated their cover photo")
            .with_title(profile.display_name())
            .with_thumbnail(actor_thumbnail(Some(&profile)))
            .with_payload(json!({ "profile": profile, "photo": photo })))
    }
}

// ============================================================================
// NEW_PRIMARY_DESTINATION_PHOTO
// ============================================================================

/// A destination got a new primary photo
pub struct NewPrimaryDestinationPhotoStrategy {
    photo_id: i64,
    destination_id: i64,
    photos: Arc<dyn PhotoRepository>,
    destinations: Arc<dyn DestinationRepository>,
}

impl NewPrimaryDestinationPhotoStrategy {
    pub fn new(photo_id: i64, destination_id: i64, collaborators: &Collaborators) -> Self {
        Self {
            photo_id,
            destination_id,
            photos: collaborators.photos.clone(),
            destinations: collaborators.destinations.clone(),
        }
    }
}

#[async_trait]
impl RenderingStrategy for NewPrimaryDestinationPhotoStrategy {
    fn name(&self) -> &'static str {
        "new_primary_destination_photo"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (destination, photo) = tokio::join!(
            self.destinations.find_destination(self.destination_id),
            self.photos.find_photo(self.photo_id)
        );
        let destination = require(destination, "destination", self.destination_id)?;
        let photo = optional(photo, "photo", self.photo_id);

        Ok(RenderedItem::new("has a new primary photo")
            .with_title(destination.name.clone())
            .with_thumbnail(photo.as_ref().map(|p| p.thumbnail_filename.clone()))
            .with_payload(json!({ "destination": destination, "photo": photo })))
    }
}

// ============================================================================
// MULTIPLE_GALLERY_PHOTOS (grouped UPLOADED_USER_PHOTO)
// ============================================================================

/// A user uploaded several gallery photos
pub struct GroupedUserProfilePhotosStrategy {
    user_id: i64,
    photo_ids: Vec<i64>,
    photos: Arc<dyn PhotoRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl GroupedUserProfilePhotosStrategy {
    pub fn new(user_id: i64, photo_ids: Vec<i64>, collaborators: &Collaborators) -> Self {
        Self {
            user_id,
            photo_ids,
            photos: collaborators.photos.clone(),
            profiles: collaborators.profiles.clone(),
        }
    }
}

#[async_trait]
impl RenderingStrategy for GroupedUserProfilePhotosStrategy {
    fn name(&self) -> &'static str {
        "grouped_user_profile_photos"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (profile, photos) = tokio::join!(
            self.profiles.find_profile(self.user_id),
            self.photos.find_photos(&self.photo_ids)
        );
        let profile = require(profile, "profile", self.user_id)?;
        let photos = optional_batch(photos, "photo");

        Ok(
            RenderedItem::new(format!("just added {} photo{}!", photos.len(), plural(photos.len())))
                .with_title(profile.display_name())
                .with_thumbnail(actor_thumbnail(Some(&profile)))
                .with_payload(json!({ "profile": profile, "photos": photos })),
        )
    }
}

// ============================================================================
// MULTIPLE_DESTINATION_PHOTO_LINKS (grouped LINK_DESTINATION_PHOTO)
// ============================================================================

/// A user linked several photos to one destination
pub struct GroupedDestinationPhotoLinksStrategy {
    destination_id: i64,
    user_id: i64,
    photo_ids: Vec<i64>,
    photos: Arc<dyn PhotoRepository>,
    destinations: Arc<dyn DestinationRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl GroupedDestinationPhotoLinksStrategy {
    pub fn new(
        destination_id: i64,
        user_id: i64,
        photo_ids: Vec<i64>,
        collaborators: &Collaborators,
    ) -> Self {
        Self {
            destination_id,
            user_id,
            photo_ids,
            photos: collaborators.photos.clone(),
            destinations: collaborators.destinations.clone(),
            profiles: collaborators.profiles.clone(),
        }
    }
}

#[async_trait]
impl RenderingStrategy for GroupedDestinationPhotoLinksStrategy {
    fn name(&self) -> &'static str {
        "grouped_destination_photo_links"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (destination, profile, photos) = tokio::join!(
            self.destinations.find_destination(self.destination_id),
            self.profiles.find_profile(self.user_id),
            self.photos.find_photos(&self.photo_ids)
        );
        let destination = require(destination, "destination", self.destination_id)?;
        let profile = optional(profile, "profile", self.user_id);
        let photos = optional_batch(photos, "photo");

        Ok(RenderedItem::new(format!(
            "just linked {} photo{} to the destination {}!",
            photos.len(),
            plural(photos.len()),
            destination.name
        ))
        .with_title(actor_title(profile.as_ref()))
        .with_thumbnail(actor_thumbnail(profile.as_ref()))
        .with_payload(json!({ "destination": destination, "photos": photos })))
    }
}
