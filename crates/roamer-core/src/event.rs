// Feed event types
//
// RawEvent is the immutable record written by the rest of the application
// whenever a trackable action happens. GroupedEvent is the request-scoped
// aggregate built by the grouper. FeedEvent is what the resolver consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FeedError;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Closed set of feed event types, raw and grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // User photo events
    /// New profile picture set; reference = photo id
    NewProfilePhoto,
    /// New cover picture set; reference = photo id
    NewProfileCoverPhoto,
    /// Public gallery photo uploaded; reference = photo id
    UploadedUserPhoto,

    // Destination events
    /// Photo linked to a public destination; reference = photo id, target = destination
    LinkDestinationPhoto,
    /// Destination primary photo changed; reference = photo id, target = destination
    NewPrimaryDestinationPhoto,
    /// Public destination created; reference = destination id
    CreatedNewDestination,
    /// Destination updated or made public; reference = destination id
    UpdatedExistingDestination,

    // Trip events
    /// Public trip created; reference = trip id
    CreatedNewTrip,
    /// Public trip updated; reference = trip id, target = destination added
    UpdatedExistingTrip,

    // Grouped variants
    MultipleGalleryPhotos,
    MultipleDestinationPhotoLinks,
    GroupedTripUpdates,
}

impl EventType {
    /// Every declared event type
    pub const ALL: [EventType; 12] = [
        EventType::NewProfilePhoto,
        EventType::NewProfileCoverPhoto,
        EventType::UploadedUserPhoto,
        EventType::LinkDestinationPhoto,
        EventType::NewPrimaryDestinationPhoto,
        EventType::CreatedNewDestination,
        EventType::UpdatedExistingDestination,
        EventType::CreatedNewTrip,
        EventType::UpdatedExistingTrip,
        EventType::MultipleGalleryPhotos,
        EventType::MultipleDestinationPhotoLinks,
        EventType::GroupedTripUpdates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::NewProfilePhoto => "NEW_PROFILE_PHOTO",
            EventType::NewProfileCoverPhoto => "NEW_PROFILE_COVER_PHOTO",
            EventType::UploadedUserPhoto => "UPLOADED_USER_PHOTO",
            EventType::LinkDestinationPhoto => "LINK_DESTINATION_PHOTO",
            EventType::NewPrimaryDestinationPhoto => "NEW_PRIMARY_DESTINATION_PHOTO",
            EventType::CreatedNewDestination => "CREATED_NEW_DESTINATION",
            EventType::UpdatedExistingDestination => "UPDATED_EXISTING_DESTINATION",
            EventType::CreatedNewTrip => "CREATED_NEW_TRIP",
            EventType::UpdatedExistingTrip => "UPDATED_EXISTING_TRIP",
            EventType::MultipleGalleryPhotos => "MULTIPLE_GALLERY_PHOTOS",
            EventType::MultipleDestinationPhotoLinks => "MULTIPLE_DESTINATION_PHOTO_LINKS",
            EventType::GroupedTripUpdates => "GROUPED_TRIP_UPDATES",
        }
    }

    /// The grouped variant this raw type merges into, if it is groupable
    pub fn grouped_variant(&self) -> Option<EventType> {
        match self {
            EventType::UploadedUserPhoto => Some(EventType::MultipleGalleryPhotos),
            EventType::LinkDestinationPhoto => Some(EventType::MultipleDestinationPhotoLinks),
            EventType::UpdatedExistingTrip => Some(EventType::GroupedTripUpdates),
            EventType::NewProfilePhoto
            | EventType::NewProfileCoverPhoto
            | EventType::NewPrimaryDestinationPhoto
            | EventType::CreatedNewDestination
            | EventType::UpdatedExistingDestination
            | EventType::CreatedNewTrip
            | EventType::MultipleGalleryPhotos
            | EventType::MultipleDestinationPhotoLinks
            | EventType::GroupedTripUpdates => None,
        }
    }

    pub fn is_groupable(&self) -> bool {
        self.grouped_variant().is_some()
    }

    /// Whether this type only ever describes a GroupedEvent
    pub fn is_grouped_variant(&self) -> bool {
        matches!(
            self,
            EventType::MultipleGalleryPhotos
                | EventType::MultipleDestinationPhotoLinks
                | EventType::GroupedTripUpdates
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FeedError::UnknownEventType(s.to_string()))
    }
}

/// One recorded user action, as supplied by the event store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: i64,
    pub event_type: EventType,
    pub actor_user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_destination_id: Option<i64>,
    pub reference_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Request-scoped aggregate of raw events sharing a type, key and time window
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedEvent {
    /// Always a grouped variant
    pub event_type: EventType,
    pub actor_user_id: i64,
    /// Destination for photo links, trip for trip updates
    pub target_id: Option<i64>,
    /// Creation time of the first member; never advanced
    pub anchor_created_at: DateTime<Utc>,
    pub member_reference_ids: Vec<i64>,
    pub member_event_ids: Vec<i64>,
    /// Destination ids carried by members, in member order
    pub member_destination_ids: Vec<i64>,
}

impl GroupedEvent {
    /// Start a group from its first member
    pub(crate) fn open(event_type: EventType, target_id: Option<i64>, first: &RawEvent) -> Self {
        let mut group = Self {
            event_type,
            actor_user_id: first.actor_user_id,
            target_id,
            anchor_created_at: first.created_at,
            member_reference_ids: Vec::new(),
            member_event_ids: Vec::new(),
            member_destination_ids: Vec::new(),
        };
        group.push(first);
        group
    }

    pub(crate) fn push(&mut self, member: &RawEvent) {
        self.member_reference_ids.push(member.reference_id);
        self.member_event_ids.push(member.id);
        if let Some(dest_id) = member.target_destination_id {
            self.member_destination_ids.push(dest_id);
        }
    }

    pub fn len(&self) -> usize {
        self.member_event_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_event_ids.is_empty()
    }
}

/// An event ready for strategy resolution
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Singular(RawEvent),
    Grouped(GroupedEvent),
}

impl FeedEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            FeedEvent::Singular(raw) => raw.event_type,
            FeedEvent::Grouped(group) => group.event_type,
        }
    }

    /// Canonical timestamp; the anchor for groups
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            FeedEvent::Singular(raw) => raw.created_at,
            FeedEvent::Grouped(group) => group.anchor_created_at,
        }
    }

    pub fn event_ids(&self) -> Vec<i64> {
        match self {
            FeedEvent::Singular(raw) => vec![raw.id],
            FeedEvent::Grouped(group) => group.member_event_ids.clone(),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, FeedEvent::Grouped(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_round_trip_through_from_str() {
        for ty in EventType::ALL {
            assert_eq!(ty.as_str().parse::<EventType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_type_string_fails_fast() {
        let err = "PHOTO_LIKED".parse::<EventType>().unwrap_err();
        assert!(matches!(err, FeedError::UnknownEventType(s) if s == "PHOTO_LIKED"));
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_value(EventType::MultipleDestinationPhotoLinks).unwrap();
        assert_eq!(json, "MULTIPLE_DESTINATION_PHOTO_LINKS");
    }

    #[test]
    fn test_groupable_set() {
        let groupable: Vec<_> = EventType::ALL
            .into_iter()
            .filter(EventType::is_groupable)
            .collect();
        assert_eq!(
            groupable,
            vec![
                EventType::UploadedUserPhoto,
                EventType::LinkDestinationPhoto,
                EventType::UpdatedExistingTrip,
            ]
        );
        for ty in groupable {
            assert!(ty.grouped_variant().unwrap().is_grouped_variant());
        }
    }
}
