// Strategy resolution
//
// Maps (singular or grouped, event type) to the strategy that renders it.
// The match is exhaustive over EventType with no wildcard arm, so adding a
// type without deciding how it renders does not compile.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{FeedError, Result};
use crate::event::{EventType, FeedEvent, GroupedEvent, RawEvent};
use crate::strategies::{
    CreateDestinationStrategy, CreateTripStrategy, GroupedDestinationPhotoLinksStrategy,
    GroupedTripUpdatesStrategy, GroupedUserProfilePhotosStrategy, NewCoverPhotoStrategy,
    NewPrimaryDestinationPhotoStrategy, NewProfilePhotoStrategy, RenderingStrategy,
    UpdateDestinationStrategy,
};
use crate::traits::Collaborators;

/// Builds one strategy per feed event
#[derive(Clone)]
pub struct StrategyResolver {
    collaborators: Collaborators,
}

impl StrategyResolver {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Pick the strategy for an event
    ///
    /// Fails with `UnmappedType` when the type has no strategy for the
    /// event's shape.
    pub fn resolve(&self, event: &FeedEvent) -> Result<Box<dyn RenderingStrategy>> {
        let strategy = match event {
            FeedEvent::Singular(raw) => self.resolve_singular(raw)?,
            FeedEvent::Grouped(group) => self.resolve_grouped(group)?,
        };
        debug!(
            event_type = %event.event_type(),
            strategy = strategy.name(),
            "Resolved strategy"
        );
        Ok(strategy)
    }

    fn resolve_singular(&self, raw: &RawEvent) -> Result<Box<dyn RenderingStrategy>> {
        let c = &self.collaborators;
        let strategy: Box<dyn RenderingStrategy> = match raw.event_type {
            EventType::NewProfilePhoto => Box::new(NewProfilePhotoStrategy::new(
                raw.reference_id,
                raw.actor_user_id,
                c,
            )),
            EventType::NewProfileCoverPhoto => Box::new(NewCoverPhotoStrategy::new(
                raw.reference_id,
                raw.actor_user_id,
                c,
            )),
            EventType::NewPrimaryDestinationPhoto => {
                let destination_id = raw
                    .target_destination_id
                    .ok_or_else(|| missing_target(raw.event_type, raw.id))?;
                Box::new(NewPrimaryDestinationPhotoStrategy::new(
                    raw.reference_id,
                    destination_id,
                    c,
                ))
            }
            EventType::CreatedNewDestination => Box::new(CreateDestinationStrategy::new(
                raw.reference_id,
                raw.actor_user_id,
                c,
            )),
            EventType::UpdatedExistingDestination => Box::new(UpdateDestinationStrategy::new(
                raw.reference_id,
                raw.actor_user_id,
                c,
            )),
            EventType::CreatedNewTrip => Box::new(CreateTripStrategy::new(
                raw.reference_id,
                raw.actor_user_id,
                c,
            )),
            EventType::UploadedUserPhoto
            | EventType::LinkDestinationPhoto
            | EventType::UpdatedExistingTrip
            | EventType::MultipleGalleryPhotos
            | EventType::MultipleDestinationPhotoLinks
            | EventType::GroupedTripUpdates => {
                return Err(FeedError::unmapped(raw.event_type, false))
            }
        };
        Ok(strategy)
    }

    fn resolve_grouped(&self, group: &GroupedEvent) -> Result<Box<dyn RenderingStrategy>> {
        let c = &self.collaborators;
        let strategy: Box<dyn RenderingStrategy> = match group.event_type {
            EventType::MultipleGalleryPhotos => Box::new(GroupedUserProfilePhotosStrategy::new(
                group.actor_user_id,
                group.member_reference_ids.clone(),
                c,
            )),
            EventType::MultipleDestinationPhotoLinks => {
                let destination_id = group
                    .target_id
                    .ok_or_else(|| missing_target(group.event_type, first_member(group)))?;
                Box::new(GroupedDestinationPhotoLinksStrategy::new(
                    destination_id,
                    group.actor_user_id,
                    group.member_reference_ids.clone(),
                    c,
                ))
            }
            EventType::GroupedTripUpdates => {
                let trip_id = group
                    .target_id
                    .ok_or_else(|| missing_target(group.event_type, first_member(group)))?;
                Box::new(GroupedTripUpdatesStrategy::new(
                    trip_id,
                    group.actor_user_id,
                    group.member_destination_ids.clone(),
                    c,
                ))
            }
            EventType::NewProfilePhoto
            | EventType::NewProfileCoverPhoto
            | EventType::UploadedUserPhoto
            | EventType::LinkDestinationPhoto
            | EventType::NewPrimaryDestinationPhoto
            | EventType::CreatedNewDestination
            | EventType::UpdatedExistingDestination
            | EventType::CreatedNewTrip
            | EventType::UpdatedExistingTrip => {
                return Err(FeedError::unmapped(group.event_type, true))
            }
        };
        Ok(strategy)
    }

    /// Check that every declared type reaches a strategy, directly or
    /// through its grouped variant
    pub fn validate_mappings(&self) -> Result<()> {
        for event_type in EventType::ALL {
            let probe = if event_type.is_grouped_variant() {
                FeedEvent::Grouped(probe_group(event_type))
            } else if let Some(grouped) = event_type.grouped_variant() {
                FeedEvent::Grouped(probe_group(grouped))
            } else {
                FeedEvent::Singular(probe_raw(event_type))
            };
            self.resolve(&probe)?;
        }
        debug!(types = EventType::ALL.len(), "All event types mapped");
        Ok(())
    }
}

fn missing_target(event_type: EventType, event_id: i64) -> FeedError {
    FeedError::Internal(anyhow::anyhow!(
        "{event_type} event {event_id} has no target id"
    ))
}

fn first_member(group: &GroupedEvent) -> i64 {
    group.member_event_ids.first().copied().unwrap_or_default()
}

fn probe_raw(event_type: EventType) -> RawEvent {
    RawEvent {
        id: 0,
        event_type,
        actor_user_id: 0,
        target_destination_id: Some(0),
        reference_id: 0,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

fn probe_group(event_type: EventType) -> GroupedEvent {
    GroupedEvent::open(event_type, Some(0), &probe_raw(event_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRepositories;
    use std::sync::Arc;

    fn resolver() -> StrategyResolver {
        StrategyResolver::new(Collaborators::from_backend(Arc::new(
            InMemoryRepositories::new(),
        )))
    }

    #[test]
    fn test_every_type_is_mapped() {
        resolver().validate_mappings().unwrap();
    }

    #[test]
    fn test_singular_types_resolve_to_expected_strategies() {
        let cases = [
            (EventType::NewProfilePhoto, "new_profile_photo"),
            (EventType::NewProfileCoverPhoto, "new_cover_photo"),
            (EventType::NewPrimaryDestinationPhoto, "new_primary_destination_photo"),
            (EventType::CreatedNewDestination, "create_destination"),
            (EventType::UpdatedExistingDestination, "update_destination"),
            (EventType::CreatedNewTrip, "create_trip"),
        ];
        for (event_type, name) in cases {
            let strategy = resolver()
                .resolve(&FeedEvent::Singular(probe_raw(event_type)))
                .unwrap();
            assert_eq!(strategy.name(), name);
        }
    }

    #[test]
    fn test_grouped_types_resolve_to_expected_strategies() {
        let cases = [
            (EventType::MultipleGalleryPhotos, "grouped_user_profile_photos"),
            (EventType::MultipleDestinationPhotoLinks, "grouped_destination_photo_links"),
            (EventType::GroupedTripUpdates, "grouped_trip_updates"),
        ];
        for (event_type, name) in cases {
            let strategy = resolver()
                .resolve(&FeedEvent::Grouped(probe_group(event_type)))
                .unwrap();
            assert_eq!(strategy.name(), name);
        }
    }

    #[test]
    fn test_singular_groupable_type_is_unmapped() {
        let result = resolver().resolve(&FeedEvent::Singular(probe_raw(EventType::UploadedUserPhoto)));
        assert!(matches!(
            result,
            Err(FeedError::UnmappedType {
                event_type: EventType::UploadedUserPhoto,
                grouped: false
            })
        ));
    }

    #[test]
    fn test_grouped_singular_type_is_unmapped() {
        let result = resolver().resolve(&FeedEvent::Grouped(probe_group(EventType::CreatedNewTrip)));
        assert!(matches!(
            result,
            Err(FeedError::UnmappedType {
                event_type: EventType::CreatedNewTrip,
                grouped: true
            })
        ));
    }

    #[test]
    fn test_primary_destination_photo_without_target_fails() {
        let mut raw = probe_raw(EventType::NewPrimaryDestinationPhoto);
        raw.target_destination_id = None;
        let result = resolver().resolve(&FeedEvent::Singular(raw));
        assert!(matches!(result, Err(FeedError::Internal(_))));
    }
}
