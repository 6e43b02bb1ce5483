//! TidyNest pricing service.
//!
//! Computes itemized quotes for cleaning bookings. The marketplace
//! application calls this service over HTTP/JSON; the engine itself is
//! a pure function over the request and the pricing policy.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;

use cache::{AppCache, CacheStats};
use pricing::policy::PricingPolicy;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<PricingPolicy>,
    pub cache: AppCache,
}

impl AppState {
    pub fn new(policy: PricingPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            cache: AppCache::new(),
        }
    }
}

/// Build the application router with the middleware stack.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .merge(pricing::routes::router())
        .route("/health", get(health))
        .route("/api/cache/stats", get(cache_stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}
