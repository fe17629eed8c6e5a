//! API routes for the report server

pub mod health;
pub mod reports;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the router
///
/// CORS is open to any origin; the dashboard is served from another port.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/generate-reports", post(reports::generate))
        .route("/api/reports/latest", get(reports::latest))
        .route("/api/reports/types", get(reports::types));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
