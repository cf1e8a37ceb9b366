// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use roamer_core::{Destination, EventType, FeedError, Photo, Profile, RawEvent, Trip, TripStop};
use sqlx::FromRow;

// ============================================
// Feed events
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub event_type: String,
    pub actor_user_id: i64,
    pub target_destination_id: Option<i64>,
    pub reference_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Parses the stored type string; an unknown string is rejected here,
/// before the event reaches the grouper
impl TryFrom<EventRow> for RawEvent {
    type Error = FeedError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let event_type: EventType = row.event_type.parse()?;
        Ok(RawEvent {
            id: row.id,
            event_type,
            actor_user_id: row.actor_user_id,
            target_destination_id: row.target_destination_id,
            reference_id: row.reference_id,
            created_at: row.created_at,
        })
    }
}

// ============================================
// Collaborator entities
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub profile_photo_thumbnail: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            profile_photo_thumbnail: row.profile_photo_thumbnail,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PhotoRow {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub thumbnail_filename: String,
    pub caption: Option<String>,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Photo {
            id: row.id,
            user_id: row.user_id,
            filename: row.filename,
            thumbnail_filename: row.thumbnail_filename,
            caption: row.caption,
            is_public: row.is_public,
            uploaded_at: row.uploaded_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DestinationRow {
    pub id: i64,
    pub name: String,
    pub district: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_public: bool,
}

impl From<DestinationRow> for Destination {
    fn from(row: DestinationRow) -> Self {
        Destination {
            id: row.id,
            name: row.name,
            district: row.district,
            country: row.country,
            latitude: row.latitude,
            longitude: row.longitude,
            is_public: row.is_public,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TripRow {
    pub id: i64,
    pub user_id: i64,
    pub is_public: bool,
}

/// One stop joined with its destination's name
#[derive(Debug, Clone, FromRow)]
pub struct TripStopRow {
    pub trip_id: i64,
    pub position: i32,
    pub destination_id: i64,
    pub destination_name: String,
    pub arrival: Option<DateTime<Utc>>,
    pub departure: Option<DateTime<Utc>>,
}

impl From<TripStopRow> for TripStop {
    fn from(row: TripStopRow) -> Self {
        TripStop {
            position: row.position,
            destination_id: row.destination_id,
            destination_name: row.destination_name,
            arrival: row.arrival,
            departure: row.departure,
        }
    }
}

impl TripRow {
    /// Attach stops; they are ordered by position here regardless of query order
    pub fn into_trip(self, stops: Vec<TripStopRow>) -> Trip {
        let mut stops: Vec<TripStop> = stops.into_iter().map(TripStop::from).collect();
        stops.sort_by_key(|stop| stop.position);
        Trip {
            id: self.id,
            user_id: self.user_id,
            is_public: self.is_public,
            stops,
        }
    }
}
