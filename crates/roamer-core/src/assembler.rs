// Feed assembly
//
// One call to `get_feed` runs the whole pipeline for a page:
//   fetch -> group -> resolve -> execute all -> attach metadata -> sort
//
// Strategies run concurrently and are awaited together. What a failed
// strategy does to the page is decided by the configured FailurePolicy.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{FailurePolicy, FeedConfig};
use crate::error::{FeedError, Result};
use crate::event::FeedEvent;
use crate::feed_item::{FeedItem, PagedResponse, RenderedItem};
use crate::grouper::EventGrouper;
use crate::query::{FeedFilter, PageRequest};
use crate::resolver::StrategyResolver;
use crate::strategies::RenderingStrategy;
use crate::traits::{Collaborators, EventStore};

/// Builds feed pages from an event store and the collaborator repositories
#[derive(Clone)]
pub struct FeedAssembler {
    store: Arc<dyn EventStore>,
    resolver: StrategyResolver,
    grouper: EventGrouper,
    config: FeedConfig,
}

impl FeedAssembler {
    pub fn new(store: Arc<dyn EventStore>, collaborators: Collaborators) -> Self {
        Self {
            store,
            resolver: StrategyResolver::new(collaborators),
            grouper: EventGrouper::new(),
            config: FeedConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FeedConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn resolver(&self) -> &StrategyResolver {
        &self.resolver
    }

    /// Page request using the configured default page size
    pub fn default_page(&self, page_num: u32) -> PageRequest {
        PageRequest::new(page_num, self.config.default_page_size)
    }

    /// Build one page of the feed
    ///
    /// Items are sorted newest first by their canonical timestamp. Ties keep
    /// singular-then-grouped order. `request_order` is echoed back unchanged.
    pub async fn get_feed(
        &self,
        filter: &FeedFilter,
        page: PageRequest,
        request_order: Option<i64>,
    ) -> Result<PagedResponse<FeedItem>> {
        page.validate(self.config.max_page_size)?;

        let event_page = self.store.get_paged_events(filter, page).await?;

        let grouped = self.grouper.group(&event_page.events);
        let events: Vec<FeedEvent> = grouped
            .singular
            .into_iter()
            .map(FeedEvent::Singular)
            .chain(grouped.grouped.into_iter().map(FeedEvent::Grouped))
            .collect();

        let strategies = self.resolve_all(&events)?;

        let results = join_all(strategies.into_iter().map(|strategy| async move {
            strategy?.execute().await
        }))
        .await;

        let mut items = Vec::with_capacity(events.len());
        for (event, result) in events.iter().zip(results) {
            let rendered = self.apply_policy(event, result)?;
            items.push(FeedItem::from_rendered(rendered, event));
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        info!(
            page_num = page.page_num,
            page_size = page.page_size,
            raw_events = event_page.events.len(),
            items = items.len(),
            total_pages = event_page.total_pages,
            "Assembled feed page"
        );

        Ok(PagedResponse::new(items, request_order, event_page.total_pages))
    }

    /// Resolve every event before anything runs
    ///
    /// An unmapped type fails the page under every policy. Other resolution
    /// failures are kept per event and go through the failure policy.
    fn resolve_all(
        &self,
        events: &[FeedEvent],
    ) -> Result<Vec<Result<Box<dyn RenderingStrategy>>>> {
        let mut strategies = Vec::with_capacity(events.len());
        for event in events {
            match self.resolver.resolve(event) {
                Err(e @ FeedError::UnmappedType { .. }) => return Err(e),
                other => strategies.push(other),
            }
        }
        Ok(strategies)
    }

    fn apply_policy(&self, event: &FeedEvent, result: Result<RenderedItem>) -> Result<RenderedItem> {
        match (result, self.config.failure_policy) {
            (Ok(rendered), _) => Ok(rendered),
            (Err(e), FailurePolicy::FailFast) => {
                warn!(
                    event_type = %event.event_type(),
                    event_ids = ?event.event_ids(),
                    error = %e,
                    "Feed item failed, failing page"
                );
                Err(e)
            }
            (Err(e), FailurePolicy::Isolate) => {
                warn!(
                    event_type = %event.event_type(),
                    event_ids = ?event.event_ids(),
                    error = %e,
                    "Feed item failed, rendering placeholder"
                );
                Ok(RenderedItem::unavailable())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventType, RawEvent};
    use crate::memory::{fixtures, InMemoryEventStore, InMemoryRepositories};
    use chrono::{Duration, TimeZone, Utc};

    fn raw(id: i64, event_type: EventType, reference: i64, hours: i64) -> RawEvent {
        RawEvent {
            id,
            event_type,
            actor_user_id: 1,
            target_destination_id: None,
            reference_id: reference,
            created_at: Utc.with_ymd_and_hms(2019, 9, 1, 0, 0, 0).unwrap() + Duration::hours(hours),
        }
    }

    async fn assembler(events: Vec<RawEvent>) -> (FeedAssembler, Arc<InMemoryRepositories>) {
        let store = Arc::new(InMemoryEventStore::with_events(events).await);
        let repos = Arc::new(InMemoryRepositories::new());
        repos.add_profile(fixtures::profile(1, "Ada", "Lovelace")).await;
        let assembler = FeedAssembler::new(store, Collaborators::from_backend(repos.clone()));
        (assembler, repos)
    }

    #[tokio::test]
    async fn test_rejects_page_zero() {
        let (assembler, _) = assembler(vec![]).await;
        let err = assembler
            .get_feed(&FeedFilter::all(), PageRequest::new(0, 10), None)
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_rejects_oversized_page() {
        let (assembler, _) = assembler(vec![]).await;
        let err = assembler
            .get_feed(&FeedFilter::all(), PageRequest::new(1, 101), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidPageRequest(_)));
    }

    #[tokio::test]
    async fn test_empty_feed_echoes_request_order() {
        let (assembler, _) = assembler(vec![]).await;
        let response = assembler
            .get_feed(&FeedFilter::all(), assembler.default_page(1), Some(42))
            .await
            .unwrap();
        assert!(response.data.is_empty());
        assert_eq!(response.request_order, Some(42));
        assert_eq!(response.total_pages, 0);
    }

    #[tokio::test]
    async fn test_items_sorted_newest_first() {
        let (assembler, repos) = assembler(vec![
            raw(1, EventType::CreatedNewDestination, 30, 0),
            raw(2, EventType::UpdatedExistingDestination, 30, 5),
            raw(3, EventType::NewProfileCoverPhoto, 10, 2),
        ])
        .await;
        repos.add_destination(fixtures::destination(30, "Wanaka")).await;

        let response = assembler
            .get_feed(&FeedFilter::all(), PageRequest::new(1, 10), None)
            .await
            .unwrap();

        let ids: Vec<_> = response.data.iter().map(|i| i.event_ids[0]).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_fail_fast_fails_whole_page() {
        let (assembler, _) = assembler(vec![raw(1, EventType::CreatedNewTrip, 99, 0)]).await;

        let err = assembler
            .get_feed(&FeedFilter::all(), PageRequest::new(1, 10), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FeedError::PrimarySubjectMissing { kind: "trip", id: 99 }
        ));
    }

    #[tokio::test]
    async fn test_isolate_renders_placeholder() {
        let (assembler, repos) = assembler(vec![
            raw(1, EventType::CreatedNewTrip, 99, 0),
            raw(2, EventType::CreatedNewDestination, 30, 1),
        ])
        .await;
        repos.add_destination(fixtures::destination(30, "Wanaka")).await;
        let assembler =
            assembler.with_config(FeedConfig::new().with_failure_policy(FailurePolicy::Isolate));

        let response = assembler
            .get_feed(&FeedFilter::all(), PageRequest::new(1, 10), None)
            .await
            .unwrap();

        assert_eq!(response.data.len(), 2);
        let placeholder = &response.data[1];
        assert_eq!(placeholder.message, crate::feed_item::UNAVAILABLE_MESSAGE);
        assert_eq!(placeholder.event_type, EventType::CreatedNewTrip);
        assert_eq!(placeholder.event_ids, vec![1]);
        assert!(placeholder.payload.is_null());
    }

    #[tokio::test]
    async fn test_store_failure_is_upstream_error() {
        let store = Arc::new(InMemoryEventStore::new());
        store.set_failing(true).await;
        let assembler = FeedAssembler::new(
            store,
            Collaborators::from_backend(Arc::new(InMemoryRepositories::new())),
        );

        let err = assembler
            .get_feed(&FeedFilter::all(), PageRequest::new(1, 10), None)
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::UpstreamFetch(_)));
    }
}
