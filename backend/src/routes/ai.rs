use crate::commands;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Uploaded plant photos routinely exceed axum's 2 MB default.
const MAX_IMAGE_BODY: usize = 12 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/predict-water",
            get(commands::water::predict_water_get).post(commands::water::predict_water_post),
        )
        .route(
            "/api/predict-disease",
            post(commands::disease::predict_disease).layer(DefaultBodyLimit::max(MAX_IMAGE_BODY)),
        )
}
