// Activity feed HTTP routes

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use roamer_core::{FeedAssembler, FeedError, FeedFilter, FeedItem, PageRequest, PagedResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// App state for feed routes
#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<FeedAssembler>,
}

impl AppState {
    pub fn new(assembler: FeedAssembler) -> Self {
        Self {
            assembler: Arc::new(assembler),
        }
    }
}

/// Create feed routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/feed", get(get_feed))
        .route("/v1/users/:user_id/feed", get(get_user_feed))
        .route("/v1/destinations/:destination_id/feed", get(get_destination_feed))
        .with_state(state)
}

// ============================================
// Query Parameters
// ============================================

/// Paging parameters shared by every feed endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number. Defaults to 1.
    #[param(example = 1)]
    pub page_num: Option<u32>,
    /// Items per page. Defaults to the configured page size.
    #[param(example = 20)]
    pub page_size: Option<u32>,
    /// Opaque value echoed back for client-side correlation
    pub request_order: Option<i64>,
}

/// Filter and paging parameters for the combined feed
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    /// Comma-separated actor user ids
    #[param(example = "1,2")]
    pub user_ids: Option<String>,
    /// Comma-separated destination ids
    #[param(example = "3")]
    pub destination_ids: Option<String>,
    #[param(example = 1)]
    pub page_num: Option<u32>,
    #[param(example = 20)]
    pub page_size: Option<u32>,
    pub request_order: Option<i64>,
}

impl FeedQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            page_num: self.page_num,
            page_size: self.page_size,
            request_order: self.request_order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn feed_error(e: FeedError) -> ApiError {
    if e.is_client_error() {
        tracing::warn!("Rejected feed request: {}", e);
        return bad_request(e.to_string());
    }
    tracing::error!("Failed to build feed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Unwrap query parameters, reporting malformed values as a 400 error body
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

/// Parse a comma-separated id list; an empty string is an empty list
fn parse_ids(name: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| bad_request(format!("{name} must be a comma-separated list of ids")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

async fn run(
    state: &AppState,
    filter: FeedFilter,
    page: PageQuery,
) -> Result<Json<PagedResponse<FeedItem>>, ApiError> {
    let assembler = &state.assembler;
    let page_request = PageRequest::new(
        page.page_num.unwrap_or(1),
        page.page_size
            .unwrap_or(assembler.config().default_page_size),
    );

    let response = assembler
        .get_feed(&filter, page_request, page.request_order)
        .await
        .map_err(feed_error)?;

    Ok(Json(response))
}

// ============================================
// HTTP Handlers
// ============================================

/// GET /v1/feed - Combined feed of users OR destinations
#[utoipa::path(
    get,
    path = "/v1/feed",
    params(FeedQuery),
    responses(
        (status = 200, description = "Feed page", body = PagedResponse<FeedItem>),
        (status = 400, description = "Invalid paging or id list", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "feed"
)]
pub async fn get_feed(
    State(state): State<AppState>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<FeedItem>>, ApiError> {
    let query = query_params(query)?;
    let filter = FeedFilter {
        actor_ids: parse_ids("userIds", query.user_ids.as_deref())?,
        destination_ids: parse_ids("destinationIds", query.destination_ids.as_deref())?,
    };
    run(&state, filter, query.page()).await
}

/// GET /v1/users/{user_id}/feed - Activity of one user
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/feed",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Feed page", body = PagedResponse<FeedItem>),
        (status = 400, description = "Invalid paging", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "feed"
)]
pub async fn get_user_feed(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<FeedItem>>, ApiError> {
    let user_id = path_id(user_id)?;
    let page = query_params(page)?;
    run(&state, FeedFilter::actors(vec![user_id]), page).await
}

/// GET /v1/destinations/{destination_id}/feed - Activity around one destination
#[utoipa::path(
    get,
    path = "/v1/destinations/{destination_id}/feed",
    params(
        ("destination_id" = i64, Path, description = "Destination ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Feed page", body = PagedResponse<FeedItem>),
        (status = 400, description = "Invalid paging", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "feed"
)]
pub async fn get_destination_feed(
    State(state): State<AppState>,
    destination_id: Result<Path<i64>, PathRejection>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<FeedItem>>, ApiError> {
    let destination_id = path_id(destination_id)?;
    let page = query_params(page)?;
    run(&state, FeedFilter::destinations(vec![destination_id]), page).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use chrono::{Duration, TimeZone, Utc};
    use http_body_util::BodyExt;
    use roamer_core::{
        memory::{fixtures, InMemoryEventStore, InMemoryRepositories, LookupKind},
        Collaborators, EventType, RawEvent,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn event(id: i64, event_type: EventType, actor: i64, reference: i64, target: Option<i64>, hours: i64) -> RawEvent {
        RawEvent {
            id,
            event_type,
            actor_user_id: actor,
            target_destination_id: target,
            reference_id: reference,
            created_at: Utc.with_ymd_and_hms(2019, 9, 1, 8, 0, 0).unwrap() + Duration::hours(hours),
        }
    }

    async fn app_with(repos: Arc<InMemoryRepositories>) -> Router {
        repos.add_profile(fixtures::profile(1, "Ada", "Lovelace")).await;
        repos.add_profile(fixtures::profile(2, "Grace", "Hopper")).await;
        repos.add_photo(fixtures::photo(10, 1)).await;
        repos.add_photo(fixtures::photo(11, 1)).await;
        repos.add_destination(fixtures::destination(30, "Wanaka")).await;
        repos.add_trip(fixtures::trip(55, 2, &[(30, "Wanaka")])).await;

        let store = InMemoryEventStore::with_events(vec![
            event(1, EventType::UploadedUserPhoto, 1, 10, None, 0),
            event(2, EventType::UploadedUserPhoto, 1, 11, None, 1),
            event(3, EventType::CreatedNewDestination, 2, 30, None, 2),
            event(4, EventType::CreatedNewTrip, 2, 55, None, 3),
            event(5, EventType::LinkDestinationPhoto, 1, 10, Some(30), 4),
        ])
        .await;

        let assembler = FeedAssembler::new(Arc::new(store), Collaborators::from_backend(repos));
        routes(AppState::new(assembler))
    }

    async fn app() -> Router {
        app_with(Arc::new(InMemoryRepositories::new())).await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_feed_returns_grouped_page() {
        let (status, body) = get_json(app().await, "/v1/feed?requestOrder=3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requestOrder"], 3);
        assert_eq!(body["totalPages"], 1);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 4);
        assert_eq!(data[0]["eventType"], "MULTIPLE_DESTINATION_PHOTO_LINKS");
        assert_eq!(data[1]["eventType"], "CREATED_NEW_TRIP");
        assert_eq!(data[3]["eventType"], "MULTIPLE_GALLERY_PHOTOS");
        assert_eq!(data[3]["eventIds"], serde_json::json!([1, 2]));
        assert_eq!(data[3]["message"], "just added 2 photos!");
    }

    #[tokio::test]
    async fn test_user_feed_filters_by_actor() {
        let (status, body) = get_json(app().await, "/v1/users/2/feed").await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|item| item["title"] == "Grace Hopper"));
    }

    #[tokio::test]
    async fn test_combined_feed_with_id_lists() {
        let (status, body) = get_json(app().await, "/v1/feed?userIds=1&destinationIds=").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bad_id_list_is_400() {
        let (status, body) = get_json(app().await, "/v1/feed?userIds=1,abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("userIds"));
    }

    #[tokio::test]
    async fn test_page_zero_is_400() {
        let (status, body) = get_json(app().await, "/v1/feed?pageNum=0").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("pageNum"));
    }

    #[tokio::test]
    async fn test_malformed_query_value_is_400_with_error_body() {
        let (status, body) = get_json(app().await, "/v1/feed?pageNum=-1").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("query string"));

        let (status, body) = get_json(app().await, "/v1/users/2/feed?pageSize=many").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("query string"));
    }

    #[tokio::test]
    async fn test_non_numeric_path_id_is_400_with_error_body() {
        let (status, body) = get_json(app().await, "/v1/destinations/wanaka/feed").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_destination_feed_filters_by_target() {
        let (status, body) = get_json(app().await, "/v1/destinations/30/feed?pageSize=5").await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["message"], "just linked 1 photo to the destination Wanaka!");
    }

    #[tokio::test]
    async fn test_failed_primary_lookup_is_500_without_data() {
        let repos = Arc::new(InMemoryRepositories::new());
        repos.fail_lookups(LookupKind::Trip).await;

        let (status, body) = get_json(app_with(repos).await, "/v1/users/2/feed").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("data").is_none());
        assert!(body["error"].is_string());
    }
}
