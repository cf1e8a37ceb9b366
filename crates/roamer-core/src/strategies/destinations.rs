//! Destination strategies: a user created or edited a destination

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{actor_thumbnail, actor_title, optional, require, RenderingStrategy};
use crate::entities::{Destination, Profile};
use crate::error::Result;
use crate::feed_item::RenderedItem;
use crate::traits::{Collaborators, DestinationRepository, ProfileRepository};

/// Destination plus the acting user, shared by both strategies
struct DestinationLookup {
    destination_id: i64,
    user_id: i64,
    destinations: Arc<dyn DestinationRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl DestinationLookup {
    fn new(destination_id: i64, user_id: i64, collaborators: &Collaborators) -> Self {
        Self {
            destination_id,
            user_id,
            destinations: collaborators.destinations.clone(),
            profiles: collaborators.profiles.clone(),
        }
    }

    async fn load(&self) -> Result<(Destination, Option<Profile>)> {
        let (destination, profile) = tokio::join!(
            self.destinations.find_destination(self.destination_id),
            self.profiles.find_profile(self.user_id)
        );
        let destination = require(destination, "destination", self.destination_id)?;
        let profile = optional(profile, "profile", self.user_id);
        Ok((destination, profile))
    }

    fn render(message: String, destination: Destination, profile: Option<Profile>) -> RenderedItem {
        RenderedItem::new(message)
            .with_title(actor_title(profile.as_ref()))
            .with_thumbnail(actor_thumbnail(profile.as_ref()))
            .with_payload(json!({ "destination": destination, "profile": profile }))
    }
}

/// CREATED_NEW_DESTINATION
pub struct CreateDestinationStrategy {
    lookup: DestinationLookup,
}

impl CreateDestinationStrategy {
    pub fn new(destination_id: i64, user_id: i64, collaborators: &Collaborators) -> Self {
        Self {
            lookup: DestinationLookup::new(destination_id, user_id, collaborators),
        }
    }
}

#[async_trait]
impl RenderingStrategy for CreateDestinationStrategy {
    fn name(&self) -> &'static str {
        "create_destination"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (destination, profile) = self.lookup.load().await?;
        let message = format!("has created a new destination: '{}'", destination.name);
        Ok(DestinationLookup::render(message, destination, profile))
    }
}

/// UPDATED_EXISTING_DESTINATION
pub struct UpdateDestinationStrategy {
    lookup: DestinationLookup,
}

impl UpdateDestinationStrategy {
    pub fn new(destination_id: i64, user_id: i64, collaborators: &Collaborators) -> Self {
        Self {
            lookup: DestinationLookup::new(destination_id, user_id, collaborators),
        }
    }
}

#[async_trait]
impl RenderingStrategy for UpdateDestinationStrategy {
    fn name(&self) -> &'static str {
        "update_destination"
    }

    async fn execute(&self) -> Result<RenderedItem> {
        let (destination, profile) = self.lookup.load().await?;
        let message = format!("has updated the destination '{}'", destination.name);
        Ok(DestinationLookup::render(message, destination, profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::memory::{fixtures, InMemoryRepositories, LookupKind};
    use crate::strategies::UNKNOWN_ACTOR;

    #[tokio::test]
    async fn test_create_destination_message() {
        let repos = Arc::new(InMemoryRepositories::new());
        repos.add_profile(fixtures::profile(1, "Ada", "Lovelace")).await;
        repos.add_destination(fixtures::destination(30, "Lake Tekapo")).await;

        let item = CreateDestinationStrategy::new(30, 1, &Collaborators::from_backend(repos))
            .execute()
            .await
            .unwrap();

        assert_eq!(item.message, "has created a new destination: 'Lake Tekapo'");
        assert_eq!(item.title.as_deref(), Some("Ada Lovelace"));
        assert_eq!(item.payload["destination"]["id"], 30);
    }

    #[tokio::test]
    async fn test_update_destination_with_failed_profile_lookup() {
        let repos = Arc::new(InMemoryRepositories::new());
        repos.add_destination(fixtures::destination(30, "Lake Tekapo")).await;
        repos.fail_lookups(LookupKind::Profile).await;

        let item = UpdateDestinationStrategy::new(30, 1, &Collaborators::from_backend(repos))
            .execute()
            .await
            .unwrap();

        assert_eq!(item.message, "has updated the destination 'Lake Tekapo'");
        assert_eq!(item.title.as_deref(), Some(UNKNOWN_ACTOR));
        assert!(item.thumbnail_url.is_none());
    }

    #[tokio::test]
    async fn test_missing_destination_fails() {
        let repos = Arc::new(InMemoryRepositories::new());
        repos.add_profile(fixtures::profile(1, "Ada", "Lovelace")).await;

        let err = CreateDestinationStrategy::new(30, 1, &Collaborators::from_backend(repos))
            .execute()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FeedError::PrimarySubjectMissing { kind: "destination", id: 30 }
        ));
    }

    #[tokio::test]
    async fn test_failed_destination_lookup_propagates() {
        let repos = Arc::new(InMemoryRepositories::new());
        repos.fail_lookups(LookupKind::Destination).await;

        let err = UpdateDestinationStrategy::new(30, 1, &Collaborators::from_backend(repos))
            .execute()
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::UpstreamFetch(_)));
    }
}
