// Core traits for pluggable backends
//
// The feed engine never talks to a database directly. It reads through:
// - EventStore: pages of raw events
// - ProfileRepository, PhotoRepository, TripRepository, DestinationRepository:
//   the entities strategies render
//
// In-memory implementations live in `memory`, Postgres ones in roamer-storage.

use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{Destination, Photo, Profile, Trip};
use crate::error::Result;
use crate::query::{EventPage, FeedFilter, PageRequest};

// ============================================================================
// EventStore - Source of raw events
// ============================================================================

/// Supplies pages of raw events, newest first
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetch one page of events matching the filter plus the total page count
    async fn get_paged_events(&self, filter: &FeedFilter, page: PageRequest) -> Result<EventPage>;
}

// ============================================================================
// Collaborator repositories - Entity lookups used by strategies
// ============================================================================

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile(&self, user_id: i64) -> Result<Option<Profile>>;
}

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn find_photo(&self, photo_id: i64) -> Result<Option<Photo>>;

    /// Batch lookup; returns the photos that exist, in the order of `photo_ids`
    async fn find_photos(&self, photo_ids: &[i64]) -> Result<Vec<Photo>> {
        let mut photos = Vec::with_capacity(photo_ids.len());
        for id in photo_ids {
            if let Some(photo) = self.find_photo(*id).await? {
                photos.push(photo);
            }
        }
        Ok(photos)
    }
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn find_trip(&self, trip_id: i64) -> Result<Option<Trip>>;
}

#[async_trait]
pub trait DestinationRepository: Send + Sync {
    async fn find_destination(&self, destination_id: i64) -> Result<Option<Destination>>;
}

/// The repositories handed to strategies
#[derive(Clone)]
pub struct Collaborators {
    pub profiles: Arc<dyn ProfileRepository>,
    pub photos: Arc<dyn PhotoRepository>,
    pub trips: Arc<dyn TripRepository>,
    pub destinations: Arc<dyn DestinationRepository>,
}

impl Collaborators {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        photos: Arc<dyn PhotoRepository>,
        trips: Arc<dyn TripRepository>,
        destinations: Arc<dyn DestinationRepository>,
    ) -> Self {
        Self {
            profiles,
            photos,
            trips,
            destinations,
        }
    }

    /// Use one backend for all four lookups
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProfileRepository + PhotoRepository + TripRepository + DestinationRepository + 'static,
    {
        Self {
            profiles: backend.clone(),
            photos: backend.clone(),
            trips: backend.clone(),
            destinations: backend,
        }
    }
}
