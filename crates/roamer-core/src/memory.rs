// In-memory implementations for demos and testing
//
// These keep all data in memory and back:
// - Unit and scenario tests of the engine
// - API tests that drive the router without a database
//
// Each store can be switched into a failing mode to exercise error paths.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::entities::{Destination, Photo, Profile, Trip};
use crate::error::{FeedError, Result};
use crate::event::RawEvent;
use crate::query::{EventPage, FeedFilter, PageRequest};
use crate::traits::{
    DestinationRepository, EventStore, PhotoRepository, ProfileRepository, TripRepository,
};

// ============================================================================
// InMemoryEventStore - Serves pages from a seeded event list
// ============================================================================

/// In-memory event store
///
/// Applies the same filter, ordering and paging rules as the Postgres store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<RawEvent>>>,
    failing: Arc<RwLock<bool>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with events
    pub async fn with_events(events: Vec<RawEvent>) -> Self {
        let store = Self::new();
        store.seed(events).await;
        store
    }

    /// Append events (useful for testing)
    pub async fn seed(&self, events: Vec<RawEvent>) {
        self.events.write().await.extend(events);
    }

    /// Make every fetch fail with an upstream error
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn get_paged_events(&self, filter: &FeedFilter, page: PageRequest) -> Result<EventPage> {
        if *self.failing.read().await {
            return Err(FeedError::upstream("in-memory event store is failing"));
        }

        let mut matching: Vec<RawEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total_pages = page.total_pages(matching.len() as u64);
        let events = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(EventPage {
            events,
            total_pages,
        })
    }
}

// ============================================================================
// InMemoryRepositories - Collaborator entities keyed by id
// ============================================================================

/// Which lookup an in-memory failure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Profile,
    Photo,
    Trip,
    Destination,
}

/// In-memory profile, photo, trip and destination repositories
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepositories {
    profiles: Arc<RwLock<HashMap<i64, Profile>>>,
    photos: Arc<RwLock<HashMap<i64, Photo>>>,
    trips: Arc<RwLock<HashMap<i64, Trip>>>,
    destinations: Arc<RwLock<HashMap<i64, Destination>>>,
    failing: Arc<RwLock<HashSet<LookupKind>>>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_profile(&self, profile: Profile) {
        self.profiles.write().await.insert(profile.user_id, profile);
    }

    pub async fn add_photo(&self, photo: Photo) {
        self.photos.write().await.insert(photo.id, photo);
    }

    pub async fn add_trip(&self, trip: Trip) {
        self.trips.write().await.insert(trip.id, trip);
    }

    pub async fn add_destination(&self, destination: Destination) {
        self.destinations
            .write()
            .await
            .insert(destination.id, destination);
    }

    /// Make lookups of one kind fail with an upstream error
    pub async fn fail_lookups(&self, kind: LookupKind) {
        self.failing.write().await.insert(kind);
    }

    async fn check(&self, kind: LookupKind) -> Result<()> {
        if self.failing.read().await.contains(&kind) {
            return Err(FeedError::upstream(format!("{kind:?} lookup failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepositories {
    async fn find_profile(&self, user_id: i64) -> Result<Option<Profile>> {
        self.check(LookupKind::Profile).await?;
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }
}

#[async_trait]
impl PhotoRepository for InMemoryRepositories {
    async fn find_photo(&self, photo_id: i64) -> Result<Option<Photo>> {
        self.check(LookupKind::Photo).await?;
        Ok(self.photos.read().await.get(&photo_id).cloned())
    }
}

#[async_trait]
impl TripRepository for InMemoryRepositories {
    async fn find_trip(&self, trip_id: i64) -> Result<Option<Trip>> {
        self.check(LookupKind::Trip).await?;
        Ok(self.trips.read().await.get(&trip_id).cloned())
    }
}

#[async_trait]
impl DestinationRepository for InMemoryRepositories {
    async fn find_destination(&self, destination_id: i64) -> Result<Option<Destination>> {
        self.check(LookupKind::Destination).await?;
        Ok(self.destinations.read().await.get(&destination_id).cloned())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Small entity builders for tests and demos
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::entities::{Destination, Photo, Profile, Trip, TripStop};

    pub fn profile(user_id: i64, first_name: &str, last_name: &str) -> Profile {
        Profile {
            user_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            profile_photo_thumbnail: Some(format!("avatar_{user_id}.jpg")),
        }
    }

    /// Photo whose thumbnail is `thumb_{id}.jpg`
    pub fn photo(id: i64, user_id: i64) -> Photo {
        Photo {
            id,
            user_id,
            filename: format!("photo_{id}.jpg"),
            thumbnail_filename: format!("thumb_{id}.jpg"),
            caption: None,
            is_public: true,
            uploaded_at: Utc
                .with_ymd_and_hms(2019, 9, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }

    pub fn destination(id: i64, name: &str) -> Destination {
        Destination {
            id,
            name: name.to_string(),
            district: None,
            country: Some("New Zealand".to_string()),
            latitude: -43.5,
            longitude: 172.6,
            is_public: true,
        }
    }

    /// Trip visiting `(destination id, name)` stops in order
    pub fn trip(id: i64, user_id: i64, stops: &[(i64, &str)]) -> Trip {
        Trip {
            id,
            user_id,
            is_public: true,
            stops: stops
                .iter()
                .enumerate()
                .map(|(position, (destination_id, name))| TripStop {
                    position: position as i32,
                    destination_id: *destination_id,
                    destination_name: name.to_string(),
                    arrival: None,
                    departure: None,
                })
                .collect(),
        }
    }
}
