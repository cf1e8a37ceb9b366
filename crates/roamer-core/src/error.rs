// Error types for feed assembly

use thiserror::Error;

use crate::event::EventType;

/// Result type alias for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors that can occur while building a feed page
#[derive(Debug, Error)]
pub enum FeedError {
    /// Event type string is not part of the known type set
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Event type has no rendering strategy for this shape (singular vs grouped)
    #[error("No strategy mapped for event type {event_type} (grouped: {grouped})")]
    UnmappedType { event_type: EventType, grouped: bool },

    /// Event store or a primary lookup failed
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// The entity a strategy renders around does not exist
    #[error("{kind} {id} not found")]
    PrimarySubjectMissing { kind: &'static str, id: i64 },

    /// Page number or size out of range
    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl FeedError {
    /// Create an upstream fetch error
    pub fn upstream(msg: impl Into<String>) -> Self {
        FeedError::UpstreamFetch(msg.into())
    }

    /// Create an unmapped type error
    pub fn unmapped(event_type: EventType, grouped: bool) -> Self {
        FeedError::UnmappedType {
            event_type,
            grouped,
        }
    }

    /// Create a primary subject missing error
    pub fn missing(kind: &'static str, id: i64) -> Self {
        FeedError::PrimarySubjectMissing { kind, id }
    }

    /// Create an invalid page request error
    pub fn invalid_page(msg: impl Into<String>) -> Self {
        FeedError::InvalidPageRequest(msg.into())
    }

    /// Whether the caller supplied bad input (as opposed to a server-side failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, FeedError::InvalidPageRequest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_message_names_type() {
        let err = FeedError::unmapped(EventType::UploadedUserPhoto, false);
        assert_eq!(
            err.to_string(),
            "No strategy mapped for event type UPLOADED_USER_PHOTO (grouped: false)"
        );
    }

    #[test]
    fn test_only_page_errors_are_client_errors() {
        assert!(FeedError::invalid_page("pageNum must be >= 1").is_client_error());
        assert!(!FeedError::upstream("db down").is_client_error());
        assert!(!FeedError::missing("trip", 4).is_client_error());
    }
}
