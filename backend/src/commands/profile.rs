use axum::extract::{rejection::JsonRejection, Json, Path, State};
use serde::Deserialize;

use crate::error::{LeafError, LeafResult};
use crate::models::Profile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfilePayload {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub alert_email: Option<bool>,
    pub alert_sms: Option<bool>,
    pub alert_push: Option<bool>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ProfilePayload {
    /// Alert opt-ins left out of the payload keep their current value.
    pub fn apply(self, user_id: String, current: Option<Profile>) -> Profile {
        let current = current.unwrap_or(Profile {
            user_id: user_id.clone(),
            display_name: None,
            phone: None,
            location: None,
            avatar_url: None,
            alert_email: true,
            alert_sms: false,
            alert_push: true,
            updated_at: None,
        });

        Profile {
            user_id,
            display_name: blank_to_none(self.display_name),
            phone: blank_to_none(self.phone),
            location: blank_to_none(self.location),
            avatar_url: blank_to_none(self.avatar_url),
            alert_email: self.alert_email.unwrap_or(current.alert_email),
            alert_sms: self.alert_sms.unwrap_or(current.alert_sms),
            alert_push: self.alert_push.unwrap_or(current.alert_push),
            updated_at: current.updated_at,
        }
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> LeafResult<Json<Profile>> {
    state
        .store
        .get_profile(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| LeafError::NotFound(format!("Profile {} not found", user_id)))
}

pub async fn upsert_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> LeafResult<Json<Profile>> {
    let Json(payload) = payload?;
    if user_id.trim().is_empty() {
        return Err(LeafError::Validation("user_id is required".to_string()));
    }

    let current = state.store.get_profile(&user_id).await?;
    let saved = state.store.upsert_profile(payload.apply(user_id, current)).await?;
    tracing::info!("Profile {} saved", saved.user_id);
    Ok(Json(saved))
}
