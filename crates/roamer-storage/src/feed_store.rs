// Database-backed EventStore and collaborator repositories
//
// Thin adapters from the core traits onto `Database`. Query failures surface
// as FeedError::UpstreamFetch; an unknown stored event type surfaces as
// FeedError::UnknownEventType.

use async_trait::async_trait;
use roamer_core::{
    traits::{DestinationRepository, EventStore, PhotoRepository, ProfileRepository, TripRepository},
    Destination, EventPage, FeedError, FeedFilter, PageRequest, Photo, Profile, RawEvent, Result,
    Trip,
};
use tracing::debug;

use crate::repositories::Database;

fn upstream(e: anyhow::Error) -> FeedError {
    FeedError::upstream(e.to_string())
}

// ============================================================================
// DbEventStore - Reads the news_feed_events table
// ============================================================================

#[derive(Clone)]
pub struct DbEventStore {
    db: Database,
}

impl DbEventStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for DbEventStore {
    async fn get_paged_events(&self, filter: &FeedFilter, page: PageRequest) -> Result<EventPage> {
        let actor_ids = filter.actor_ids.as_deref();
        let destination_ids = filter.destination_ids.as_deref();
        let limit = i64::from(page.page_size);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let (rows, total) = tokio::try_join!(
            self.db
                .list_feed_events(actor_ids, destination_ids, limit, offset),
            self.db.count_feed_events(actor_ids, destination_ids),
        )
        .map_err(upstream)?;

        let events = rows
            .into_iter()
            .map(RawEvent::try_from)
            .collect::<Result<Vec<_>>>()?;
        let total_pages = page.total_pages(u64::try_from(total).unwrap_or_default());

        debug!(
            events = events.len(),
            total_rows = total,
            total_pages,
            "Loaded feed events"
        );

        Ok(EventPage {
            events,
            total_pages,
        })
    }
}

// ============================================================================
// DbRepositories - Profiles, photos, trips, destinations
// ============================================================================

#[derive(Clone)]
pub struct DbRepositories {
    db: Database,
}

impl DbRepositories {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for DbRepositories {
    async fn find_profile(&self, user_id: i64) -> Result<Option<Profile>> {
        let row = self.db.get_profile(user_id).await.map_err(upstream)?;
        Ok(row.map(Profile::from))
    }
}

#[async_trait]
impl PhotoRepository for DbRepositories {
    async fn find_photo(&self, photo_id: i64) -> Result<Option<Photo>> {
        let row = self.db.get_photo(photo_id).await.map_err(upstream)?;
        Ok(row.map(Photo::from))
    }

    async fn find_photos(&self, photo_ids: &[i64]) -> Result<Vec<Photo>> {
        if photo_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.db.list_photos(photo_ids).await.map_err(upstream)?;
        Ok(rows.into_iter().map(Photo::from).collect())
    }
}

#[async_trait]
impl TripRepository for DbRepositories {
    async fn find_trip(&self, trip_id: i64) -> Result<Option<Trip>> {
        let Some(trip) = self.db.get_trip(trip_id).await.map_err(upstream)? else {
            return Ok(None);
        };
        let stops = self.db.list_trip_stops(trip_id).await.map_err(upstream)?;
        Ok(Some(trip.into_trip(stops)))
    }
}

#[async_trait]
impl DestinationRepository for DbRepositories {
    async fn find_destination(&self, destination_id: i64) -> Result<Option<Destination>> {
        let row = self
            .db
            .get_destination(destination_id)
            .await
            .map_err(upstream)?;
        Ok(row.map(Destination::from))
    }
}
