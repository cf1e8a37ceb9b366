// Roamer feed API server
// Decision: The feed is read-only; this binary only exposes getFeed over JSON
// Decision: Strategy mappings are validated at startup, before serving traffic

mod config;
mod feed;

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use roamer_core::{Collaborators, EventType, FeedAssembler, FeedItem, PagedResponse};
use roamer_storage::{Database, DbEventStore, DbRepositories};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ApiConfig;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        feed::get_feed,
        feed::get_user_feed,
        feed::get_destination_feed,
    ),
    components(
        schemas(
            FeedItem, EventType,
            PagedResponse<FeedItem>,
            feed::ErrorResponse,
        )
    ),
    tags(
        (name = "feed", description = "Activity feed endpoints")
    ),
    info(
        title = "Roamer Feed API",
        version = "0.1.0",
        description = "Aggregated activity feed of travellers, trips and destinations",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "roamer_api=debug,roamer_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("roamer-api starting...");

    let config = ApiConfig::from_env()?;
    tracing::info!(
        policy = ?config.feed.failure_policy,
        default_page_size = config.feed.default_page_size,
        max_page_size = config.feed.max_page_size,
        "Feed configured"
    );

    // Initialize database
    let db = Database::from_url(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    let assembler = FeedAssembler::new(
        Arc::new(DbEventStore::new(db.clone())),
        Collaborators::from_backend(Arc::new(DbRepositories::new(db))),
    )
    .with_config(config.feed.clone());

    assembler
        .resolver()
        .validate_mappings()
        .context("Feed strategy mappings are incomplete")?;
    tracing::info!("Feed strategy mappings validated");

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let api_routes = feed::routes(feed::AppState::new(assembler));

    let app = Router::new()
        .route("/health", get(health))
        .merge(build_router_with_prefix(api_routes, &config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", config.bind_address);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
