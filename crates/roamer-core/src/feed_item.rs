// Feed output DTOs
//
// Strategies produce a RenderedItem. The assembler turns it into a FeedItem
// by attaching the event's canonical timestamp, type and ids, which for a
// grouped event differ from any single member's.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{EventType, FeedEvent};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Message shown in place of an item whose resolution failed (isolate policy)
pub const UNAVAILABLE_MESSAGE: &str = "This activity is no longer available";

/// Display-ready item without event metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedItem {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub payload: serde_json::Value,
}

impl RenderedItem {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            title: None,
            thumbnail_url: None,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail_url: Option<String>) -> Self {
        self.thumbnail_url = thumbnail_url;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Placeholder for an event whose strategy failed
    pub fn unavailable() -> Self {
        Self::new(UNAVAILABLE_MESSAGE)
    }
}

/// One entry of a feed page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    /// Human readable sentence describing the activity
    pub message: String,
    /// Actor or destination name shown as the card title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Entities involved in the activity. Shape depends on event_type.
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub event_type: EventType,
    /// Raw event ids behind this item
    pub event_ids: Vec<i64>,
}

impl FeedItem {
    /// Attach the event's canonical metadata to a rendered item
    pub fn from_rendered(rendered: RenderedItem, event: &FeedEvent) -> Self {
        Self {
            message: rendered.message,
            title: rendered.title,
            thumbnail_url: rendered.thumbnail_url,
            payload: rendered.payload,
            created_at: event.created_at(),
            event_type: event.event_type(),
            event_ids: event.event_ids(),
        }
    }
}

/// Paged response wrapper returned by the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    /// Echoed back unchanged for client-side correlation
    pub request_order: Option<i64>,
    pub total_pages: u32,
}

impl<T> PagedResponse<T> {
    pub fn new(data: Vec<T>, request_order: Option<i64>, total_pages: u32) -> Self {
        Self {
            data,
            request_order,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RawEvent;
    use chrono::TimeZone;

    #[test]
    fn test_from_rendered_attaches_event_metadata() {
        let created_at = Utc.with_ymd_and_hms(2019, 8, 1, 9, 30, 0).unwrap();
        let event = FeedEvent::Singular(RawEvent {
            id: 42,
            event_type: EventType::CreatedNewTrip,
            actor_user_id: 1,
            target_destination_id: None,
            reference_id: 7,
            created_at,
        });

        let item = FeedItem::from_rendered(
            RenderedItem::new("just created a new trip!").with_title("Ada Lovelace"),
            &event,
        );

        assert_eq!(item.created_at, created_at);
        assert_eq!(item.event_type, EventType::CreatedNewTrip);
        assert_eq!(item.event_ids, vec![42]);
        assert_eq!(item.title.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_paged_response_serializes_camel_case() {
        let response: PagedResponse<FeedItem> = PagedResponse::new(vec![], Some(3), 5);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["requestOrder"], 3);
        assert_eq!(json["totalPages"], 5);
        assert!(json["data"].as_array().unwrap().is_empty());
    }
}
