use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/alerts", get(commands::alerts::get_alerts))
        .route("/api/alerts/:id/read", post(commands::alerts::mark_alert_read))
}
