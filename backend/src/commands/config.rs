use axum::{extract::State, Json};

use crate::config::ClientConfig;
use crate::state::AppState;

/// Language, role and theme defaults the web client applies at start-up.
pub async fn get_client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(state.client.as_ref().clone())
}
