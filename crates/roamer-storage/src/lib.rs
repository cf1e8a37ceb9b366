// Postgres storage layer with sqlx
//
// This crate provides database implementations for core traits:
// - DbEventStore: implements EventStore over the news_feed_events table
// - DbRepositories: implements the profile, photo, trip and destination lookups

pub mod feed_store;
pub mod models;
pub mod repositories;

pub use feed_store::{DbEventStore, DbRepositories};
pub use models::*;
pub use repositories::*;
