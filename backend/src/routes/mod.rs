use crate::state::AppState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod ai;
pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod profile;
pub mod sensors;
pub mod utility;
pub mod water;
pub mod zones;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(utility::router())
        .merge(config::router())
        .merge(sensors::router())
        .merge(dashboard::router())
        .merge(alerts::router())
        .merge(zones::router())
        .merge(ai::router())
        .merge(water::router())
        .merge(profile::router())
}

/// Full application: routes, CORS open to any origin, request tracing.
pub fn app(state: AppState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
