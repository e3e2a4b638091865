use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sensors-ingest", post(commands::sensors::ingest_reading))
        .route("/api/sensors-history", get(commands::sensors::get_history))
}
