//! Rendering strategies
//!
//! One strategy per event shape turns a singular or grouped event into a
//! RenderedItem. Each strategy:
//! - Fetches only what its card needs, concurrently, through its repositories
//! - Fails when its primary subject is missing or its lookup errors
//! - Omits or placeholders any secondary reference that cannot be loaded
//!
//! Strategies hold no mutable state and can run in any order.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::entities::Profile;
use crate::error::Result;
use crate::feed_item::RenderedItem;

mod destinations;
mod photos;
mod trips;

pub use destinations::{CreateDestinationStrategy, UpdateDestinationStrategy};
pub use photos::{
    GroupedDestinationPhotoLinksStrategy, GroupedUserProfilePhotosStrategy,
    NewCoverPhotoStrategy, NewPrimaryDestinationPhotoStrategy, NewProfilePhotoStrategy,
};
pub use trips::{CreateTripStrategy, GroupedTripUpdatesStrategy};

/// Title used when the acting user's profile cannot be loaded
pub const UNKNOWN_ACTOR: &str = "Unknown traveller";

// ============================================================================
// RenderingStrategy Trait
// ============================================================================

/// Turns one feed event into a display-ready item
#[async_trait]
pub trait RenderingStrategy: Send + Sync {
    /// Name of this strategy (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Load the referenced entities and render the item
    async fn execute(&self) -> Result<RenderedItem>;
}

// ============================================================================
// Lookup helpers
// ============================================================================

/// Unwrap the lookup of a strategy's primary subject
pub(crate) fn require<T>(lookup: Result<Option<T>>, kind: &'static str, id: i64) -> Result<T> {
    lookup?.ok_or_else(|| crate::error::FeedError::missing(kind, id))
}

/// Absorb a failed or empty secondary lookup
pub(crate) fn optional<T>(lookup: Result<Option<T>>, kind: &'static str, id: i64) -> Option<T> {
    match lookup {
        Ok(Some(found)) => Some(found),
        Ok(None) => {
            debug!(kind, id, "Secondary reference missing, omitting");
            None
        }
        Err(e) => {
            warn!(kind, id, error = %e, "Secondary lookup failed, omitting");
            None
        }
    }
}

/// Absorb a failed batch lookup of secondary references
pub(crate) fn optional_batch<T>(lookup: Result<Vec<T>>, kind: &'static str) -> Vec<T> {
    lookup.unwrap_or_else(|e| {
        warn!(kind, error = %e, "Secondary batch lookup failed, omitting");
        Vec::new()
    })
}

pub(crate) fn actor_title(profile: Option<&Profile>) -> String {
    profile
        .map(Profile::display_name)
        .unwrap_or_else(|| UNKNOWN_ACTOR.to_string())
}

pub(crate) fn actor_thumbnail(profile: Option<&Profile>) -> Option<String> {
    profile.and_then(|p| p.profile_photo_thumbnail.clone())
}

pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
