// Activity Feed Engine
//
// This crate turns a page of raw user-activity events into display-ready
// feed items. It is DB-agnostic: events and the entities they mention are
// read through traits, with Postgres implementations in roamer-storage.
//
// Key design decisions:
// - Bursts of similar events are merged by EventGrouper inside a 12h window
// - StrategyResolver maps every event type to a RenderingStrategy with an
//   exhaustive match, so an unmapped type cannot slip through silently
// - Strategies run concurrently; FeedAssembler restores newest-first order
// - A failed item fails the page by default (FailurePolicy::FailFast) or is
//   replaced by a placeholder (FailurePolicy::Isolate)

pub mod assembler;
pub mod config;
pub mod entities;
pub mod error;
pub mod event;
pub mod feed_item;
pub mod grouper;
pub mod query;
pub mod resolver;
pub mod strategies;
pub mod traits;

// In-memory implementations for demos and testing
pub mod memory;

// Re-exports for convenience
pub use assembler::FeedAssembler;
pub use config::{FailurePolicy, FeedConfig, FeedConfigBuilder};
pub use entities::{Destination, Photo, Profile, Trip, TripStop};
pub use error::{FeedError, Result};
pub use event::{EventType, FeedEvent, GroupedEvent, RawEvent};
pub use feed_item::{FeedItem, PagedResponse, RenderedItem};
pub use grouper::{EventGrouper, GroupedPage};
pub use query::{EventPage, FeedFilter, PageRequest};
pub use resolver::StrategyResolver;
pub use strategies::RenderingStrategy;
pub use traits::{
    Collaborators, DestinationRepository, EventStore, PhotoRepository, ProfileRepository,
    TripRepository,
};
