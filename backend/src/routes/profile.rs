use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/profiles/:user_id",
        get(commands::profile::get_profile).put(commands::profile::upsert_profile),
    )
}
