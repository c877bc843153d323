mod envelope;
mod handlers;
mod params;

use std::time::Duration;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::db::Database;

pub use envelope::{ApiError, ApiResponse, ErrorBody};
pub use handlers::HealthStatus;
pub use params::{ListParams, RandomParams};

/// Shared handler state: the store handle and the bound on each store call.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub store_timeout: Duration,
}

/// Router with default local settings (permissive CORS, default timeout).
pub fn create_router(db: Database) -> Router {
    create_router_with_config(db, &ServerConfig::local())
}

pub fn create_router_with_config(db: Database, config: &ServerConfig) -> Router {
    let state = AppState {
        db,
        store_timeout: config.request_timeout,
    };

    let api = Router::new()
        .route("/exercises", get(handlers::list_exercises))
        .route("/exercises/", get(handlers::list_exercises))
        .route("/exercises/random", get(handlers::random_exercises))
        .route("/exercises/equipment/all", get(handlers::list_equipment))
        .route("/exercises/muscles/all", get(handlers::list_muscles))
        .route("/exercises/{id}", get(handlers::get_exercise))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(config.cors_layer()),
        )
        .with_state(state)
}
