//! Trip strategies: a new trip and a burst of updates to one trip

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{actor_thumbnail, actor_title, optional, plural, require, RenderingStrategy};
use crate::entities::{Trip, TripStop};
use crate::error::Result;
use crate::feed_item::RenderedItem;
use crate::traits::{Collaborators, ProfileRepository, TripRepository};

/// CREATED_NEW_TRIP
pub struct CreateTripStrategy {
    trip_id: i64,
    user_id: i64,
    trips: Arc<dyn TripRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl CreateTripStrategy {
    pub fn new(trip_id: i64, user_id: i64, collaborators: &Collaborators) -> Self {
        Self {
            trip_id,
            user_id,
            trips: collaborators.trips.clone(),
            profiles: collaborators.profiles.clone(),
        }
    }
}

fn new_trip_message(trip: &Trip) -> String {
    match (trip.first_stop(), trip.last_stop()) {
        (Some(first), Some(last)) => format!(
            "just created a new trip with {} destination{}! The trip begins in {} and ends in {}.",
            trip.stops.len(),
            plural(trip.stops.len()),
            first.destination_name,
            last.destination_name
        ),
        _ => "just created a new trip!".to_string(),
    }
}

#[async_trait]
impl RenderingStrategy for CreateTripStrategy {
    fn name(&self) -> &'static str {
        "create_trip"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (trip, profile) = tokio::join!(
            self.trips.find_trip(self.trip_id),
            self.profiles.find_profile(self.user_id)
        );
        let trip = require(trip, "trip", self.trip_id)?;
        let profile = optional(profile, "profile", self.user_id);

        Ok(RenderedItem::new(new_trip_message(&trip))
            .with_title(actor_title(profile.as_ref()))
            .with_thumbnail(actor_thumbnail(profile.as_ref()))
            .with_payload(json!({ "trip": trip })))
    }
}

/// GROUPED_TRIP_UPDATES (grouped UPDATED_EXISTING_TRIP)
pub struct GroupedTripUpdatesStrategy {
    trip_id: i64,
    user_id: i64,
    added_destination_ids: Vec<i64>,
    trips: Arc<dyn TripRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl GroupedTripUpdatesStrategy {
    pub fn new(
        trip_id: i64,
        user_id: i64,
        added_destination_ids: Vec<i64>,
        collaborators: &Collaborators,
    ) -> Self {
        Self {
            trip_id,
            user_id,
            added_destination_ids,
            trips: collaborators.trips.clone(),
            profiles: collaborators.profiles.clone(),
        }
    }

    /// Stops whose destination was added by one of the grouped updates, in
    /// trip order, each destination once
    fn added_stops<'a>(&self, trip: &'a Trip) -> Vec<&'a TripStop> {
        let mut added: Vec<&TripStop> = Vec::new();
        for stop in &trip.stops {
            let already = added.iter().any(|s| s.destination_id == stop.destination_id);
            if !already && self.added_destination_ids.contains(&stop.destination_id) {
                added.push(stop);
            }
        }
        added
    }
}

#[async_trait]
impl RenderingStrategy for GroupedTripUpdatesStrategy {
    fn name(&self) -> &'static str {
        "grouped_trip_updates"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (trip, profile) = tokio::join!(
            self.trips.find_trip(self.trip_id),
            self.profiles.find_profile(self.user_id)
        );
        let trip = require(trip, "trip", self.trip_id)?;
        let profile = optional(profile, "profile", self.user_id);

        let added = self.added_stops(&trip);
        let message = if added.is_empty() {
            "updated their trip!".to_string()
        } else {
            format!(
                "added {} new destination{} to their trip!",
                added.len(),
                plural(added.len())
            )
        };

        Ok(RenderedItem::new(message)
            .with_title(actor_title(profile.as_ref()))
            .with_thumbnail(actor_thumbnail(profile.as_ref()))
            .with_payload(json!({ "trip": trip, "newDestinations": added })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::memory::{fixtures, InMemoryRepositories};

    async fn seeded() -> Arc<InMemoryRepositories> {
        let repos = Arc::new(InMemoryRepositories::new());
        repos.add_profile(fixtures::profile(1, "Ada", "Lovelace")).await;
        repos
            .add_trip(fixtures::trip(55, 1, &[(30, "Christchurch"), (31, "Akaroa"), (32, "Dunedin")]))
            .await;
        repos
    }

    #[tokio::test]
    async fn test_create_trip_names_first_and_last_stop() {
        let repos = seeded().await;

        let item = CreateTripStrategy::new(55, 1, &Collaborators::from_backend(repos))
            .execute()
            .await
            .unwrap();

        assert_eq!(
            item.message,
            "just created a new trip with 3 destinations! The trip begins in Christchurch and ends in Dunedin."
        );
        assert_eq!(item.title.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_create_trip_without_stops() {
        let repos = Arc::new(InMemoryRepositories::new());
        repos.add_trip(fixtures::trip(56, 1, &[])).await;

        let item = CreateTripStrategy::new(56, 1, &Collaborators::from_backend(repos))
            .execute()
            .await
            .unwrap();

        assert_eq!(item.message, "just created a new trip!");
    }

    #[tokio::test]
    async fn test_missing_trip_fails() {
        let repos = Arc::new(InMemoryRepositories::new());

        let err = CreateTripStrategy::new(99, 1, &Collaborators::from_backend(repos))
            .execute()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FeedError::PrimarySubjectMissing { kind: "trip", id: 99 }
        ));
    }

    #[tokio::test]
    async fn test_grouped_updates_list_added_destinations_in_trip_order() {
        let repos = seeded().await;

        let item = GroupedTripUpdatesStrategy::new(
            55,
            1,
            vec![32, 31, 32],
            &Collaborators::from_backend(repos),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(item.message, "added 2 new destinations to their trip!");
        let names: Vec<_> = item.payload["newDestinations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|stop| stop["destinationName"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Akaroa", "Dunedin"]);
    }

    #[tokio::test]
    async fn test_grouped_updates_without_added_destinations() {
        let repos = seeded().await;

        let item = GroupedTripUpdatesStrategy::new(55, 1, vec![], &Collaborators::from_backend(repos))
            .execute()
            .await
            .unwrap();

        assert_eq!(item.message, "updated their trip!");
    }
}
