// Repository layer for database operations
// Read-only: the feed never writes to any of these tables

use anyhow::Result;
use sqlx::PgPool;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ============================================
    // News feed events
    // ============================================

    /// One page of events, newest first
    ///
    /// A NULL id array leaves that side unconstrained. When both arrays are
    /// given the sides are OR-combined.
    pub async fn list_feed_events(
        &self,
        actor_ids: Option<&[i64]>,
        destination_ids: Option<&[i64]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, event_type, actor_user_id, target_destination_id, reference_id, created_at
            FROM news_feed_events
            WHERE CASE
                WHEN $1::BIGINT[] IS NULL AND $2::BIGINT[] IS NULL THEN TRUE
                WHEN $2::BIGINT[] IS NULL THEN actor_user_id = ANY($1)
                WHEN $1::BIGINT[] IS NULL THEN target_destination_id = ANY($2)
                ELSE actor_user_id = ANY($1) OR target_destination_id = ANY($2)
            END
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(actor_ids)
        .bind(destination_ids)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of events matching the same filter as `list_feed_events`
    pub async fn count_feed_events(
        &self,
        actor_ids: Option<&[i64]>,
        destination_ids: Option<&[i64]>,
    ) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM news_feed_events
            WHERE CASE
                WHEN $1::BIGINT[] IS NULL AND $2::BIGINT[] IS NULL THEN TRUE
                WHEN $2::BIGINT[] IS NULL THEN actor_user_id = ANY($1)
                WHEN $1::BIGINT[] IS NULL THEN target_destination_id = ANY($2)
                ELSE actor_user_id = ANY($1) OR target_destination_id = ANY($2)
            END
            "#,
        )
        .bind(actor_ids)
        .bind(destination_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    // ============================================
    // Profiles
    // ============================================

    pub async fn get_profile(&self, user_id: i64) -> Result<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT p.user_id, p.first_name, p.last_name, ph.thumbnail_filename AS profile_photo_thumbnail
            FROM profiles p
            LEFT JOIN photos ph ON ph.id = p.profile_photo_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Photos
    // ============================================

    pub async fn get_photo(&self, id: i64) -> Result<Option<PhotoRow>> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT id, user_id, filename, thumbnail_filename, caption, is_public, uploaded_at
            FROM photos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Photos that exist among `ids`, in the order of `ids`
    pub async fn list_photos(&self, ids: &[i64]) -> Result<Vec<PhotoRow>> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT ph.id, ph.user_id, ph.filename, ph.thumbnail_filename, ph.caption, ph.is_public, ph.uploaded_at
            FROM photos ph
            JOIN UNNEST($1::BIGINT[]) WITH ORDINALITY AS wanted(id, ord) ON wanted.id = ph.id
            ORDER BY wanted.ord
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Destinations
    // ============================================

    pub async fn get_destination(&self, id: i64) -> Result<Option<DestinationRow>> {
        let row = sqlx::query_as::<_, DestinationRow>(
            r#"
            SELECT id, name, district, country, latitude, longitude, is_public
            FROM destinations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Trips
    // ============================================

    pub async fn get_trip(&self, id: i64) -> Result<Option<TripRow>> {
        let row = sqlx::query_as::<_, TripRow>(
            r#"
            SELECT id, user_id, is_public
            FROM trips
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_trip_stops(&self, trip_id: i64) -> Result<Vec<TripStopRow>> {
        let rows = sqlx::query_as::<_, TripStopRow>(
            r#"
            SELECT s.trip_id, s.position, s.destination_id, d.name AS destination_name, s.arrival, s.departure
            FROM trip_stops s
            JOIN destinations d ON d.id = s.destination_id
            WHERE s.trip_id = $1
            ORDER BY s.position ASC
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
