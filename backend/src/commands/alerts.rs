use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{LeafError, LeafResult};
use crate::models::{Alert, AlertKind};
use crate::state::AppState;
use crate::utils::format_relative_time;

const RECENT_ALERTS: i64 = 20;

#[derive(Debug, Serialize)]
pub struct AlertView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub time: String,
    pub read: bool,
}

impl AlertView {
    pub fn from_alert(alert: Alert, now: chrono::DateTime<Utc>) -> Self {
        Self {
            id: alert.id,
            kind: AlertKind::from_db(&alert.alert_type),
            time: format_relative_time(alert.created_at, now),
            message: alert.message,
            read: alert.is_read,
        }
    }
}

pub async fn get_alerts(State(state): State<AppState>) -> LeafResult<Json<Vec<AlertView>>> {
    let now = Utc::now();
    let alerts = state.store.recent_alerts(RECENT_ALERTS).await?;
    Ok(Json(
        alerts
            .into_iter()
            .map(|a| AlertView::from_alert(a, now))
            .collect(),
    ))
}

pub async fn mark_alert_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> LeafResult<Json<Value>> {
    if !state.store.mark_alert_read(id).await? {
        return Err(LeafError::NotFound(format!("Alert {} not found", id)));
    }
    Ok(Json(json!({ "success": true, "id": id })))
}
