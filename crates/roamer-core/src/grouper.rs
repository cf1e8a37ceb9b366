// Event grouping
//
// Splits one page of raw events into singular events and grouped events.
// A groupable event joins an open group of the same grouped type when the
// group key matches and the event lies inside the window measured from the
// group's first member. The anchor never moves, so the window does not slide.

use chrono::Duration;
use tracing::debug;

use crate::config::grouping_window;
use crate::event::{EventType, GroupedEvent, RawEvent};

/// Key that decides which events may share a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey {
    Actor(i64),
    ActorDestination(i64, Option<i64>),
    Trip(i64),
}

impl GroupKey {
    /// Key for an event joining a group of `grouped_type`; raw types have none
    fn for_event(grouped_type: EventType, event: &RawEvent) -> Option<Self> {
        match grouped_type {
            EventType::MultipleGalleryPhotos => Some(GroupKey::Actor(event.actor_user_id)),
            EventType::MultipleDestinationPhotoLinks => Some(GroupKey::ActorDestination(
                event.actor_user_id,
                event.target_destination_id,
            )),
            EventType::GroupedTripUpdates => Some(GroupKey::Trip(event.reference_id)),
            EventType::NewProfilePhoto
            | EventType::NewProfileCoverPhoto
            | EventType::UploadedUserPhoto
            | EventType::LinkDestinationPhoto
            | EventType::NewPrimaryDestinationPhoto
            | EventType::CreatedNewDestination
            | EventType::UpdatedExistingDestination
            | EventType::CreatedNewTrip
            | EventType::UpdatedExistingTrip => None,
        }
    }

    /// The id a GroupedEvent exposes as its target
    fn target_id(&self) -> Option<i64> {
        match self {
            GroupKey::Actor(_) => None,
            GroupKey::ActorDestination(_, dest_id) => *dest_id,
            GroupKey::Trip(trip_id) => Some(*trip_id),
        }
    }
}

/// Output of one grouping pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedPage {
    pub singular: Vec<RawEvent>,
    pub grouped: Vec<GroupedEvent>,
}

/// Partitions a page of raw events into singular and grouped events
#[derive(Debug, Clone)]
pub struct EventGrouper {
    window: Duration,
}

impl EventGrouper {
    pub fn new() -> Self {
        Self {
            window: grouping_window(),
        }
    }

    /// Group a page of events
    ///
    /// Singular events keep page order. Groupable events are visited oldest
    /// first (ties keep page order), so a group's anchor is its earliest member
    /// and members are listed in time order. Groups are returned in the order
    /// they were opened.
    pub fn group(&self, events: &[RawEvent]) -> GroupedPage {
        let mut singular = Vec::new();
        let mut groupable: Vec<(EventType, GroupKey, &RawEvent)> = Vec::new();

        for event in events {
            let keyed = event.event_type.grouped_variant().and_then(|grouped_type| {
                GroupKey::for_event(grouped_type, event).map(|key| (grouped_type, key))
            });
            match keyed {
                Some((grouped_type, key)) => groupable.push((grouped_type, key, event)),
                None => singular.push(event.clone()),
            }
        }

        groupable.sort_by_key(|(_, _, event)| event.created_at);

        let mut open: Vec<(GroupKey, GroupedEvent)> = Vec::new();
        for (grouped_type, key, event) in groupable {
            let window_start = event.created_at - self.window;

            let existing = open.iter().position(|(open_key, group)| {
                group.event_type == grouped_type
                    && *open_key == key
                    && group.anchor_created_at > window_start
            });

            match existing {
                Some(idx) => open[idx].1.push(event),
                None => open.push((key, GroupedEvent::open(grouped_type, key.target_id(), event))),
            }
        }

        let grouped: Vec<GroupedEvent> = open.into_iter().map(|(_, group)| group).collect();

        debug!(
            events = events.len(),
            singular = singular.len(),
            grouped = grouped.len(),
            "Grouped feed page"
        );

        GroupedPage { singular, grouped }
    }
}

impl Default for EventGrouper {
    fn default() -> Self {
        Self::new()
    }
}
