// Feed query types: which events, which page

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};
use crate::event::RawEvent;

/// Selects the events a feed is built from
///
/// A missing side is not a constraint. When both sides are present the feed
/// is the union of the two. A present but empty list matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilter {
    pub actor_ids: Option<Vec<i64>>,
    pub destination_ids: Option<Vec<i64>>,
}

impl FeedFilter {
    /// Feed of everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Feed of the given actors' activity
    pub fn actors(ids: impl Into<Vec<i64>>) -> Self {
        Self {
            actor_ids: Some(ids.into()),
            destination_ids: None,
        }
    }

    /// Feed of the given destinations' activity
    pub fn destinations(ids: impl Into<Vec<i64>>) -> Self {
        Self {
            actor_ids: None,
            destination_ids: Some(ids.into()),
        }
    }

    /// Combined feed of actors OR destinations
    pub fn combined(actor_ids: impl Into<Vec<i64>>, destination_ids: impl Into<Vec<i64>>) -> Self {
        Self {
            actor_ids: Some(actor_ids.into()),
            destination_ids: Some(destination_ids.into()),
        }
    }

    pub fn matches(&self, event: &RawEvent) -> bool {
        let by_actor = |ids: &Vec<i64>| ids.contains(&event.actor_user_id);
        let by_destination = |ids: &Vec<i64>| {
            event
                .target_destination_id
                .is_some_and(|dest_id| ids.contains(&dest_id))
        };

        match (&self.actor_ids, &self.destination_ids) {
            (None, None) => true,
            (Some(actors), None) => by_actor(actors),
            (None, Some(dests)) => by_destination(dests),
            (Some(actors), Some(dests)) => by_actor(actors) || by_destination(dests),
        }
    }
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_num: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page_num: u32, page_size: u32) -> Self {
        Self {
            page_num,
            page_size,
        }
    }

    /// Check bounds against the configured maximum page size
    pub fn validate(&self, max_page_size: u32) -> Result<()> {
        if self.page_num < 1 {
            return Err(FeedError::invalid_page("pageNum must be >= 1"));
        }
        if self.page_size < 1 || self.page_size > max_page_size {
            return Err(FeedError::invalid_page(format!(
                "pageSize must be between 1 and {}",
                max_page_size
            )));
        }
        Ok(())
    }

    /// Number of rows before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page_num.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Total pages needed for `total_rows` at this page size
    pub fn total_pages(&self, total_rows: u64) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        let pages = total_rows.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// One page of raw events returned by the event store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub total_pages: u32,
}
