use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LeafResult;
use crate::state::AppState;
use crate::utils::round1;

/// Share of the recommended volume saved versus a fixed daily schedule.
pub const WATER_SAVINGS_FACTOR: f64 = 0.3;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub active_sensors: i64,
    pub plants_monitored: i64,
    pub avg_soil_moisture: f64,
    pub water_saved_liters: f64,
}

pub async fn get_dashboard_stats(State(state): State<AppState>) -> LeafResult<Json<DashboardStats>> {
    let since = Utc::now() - Duration::hours(24);

    let active_sensors = state.store.count_active_devices(since).await?;
    let plants_monitored = state.store.count_zones().await?;
    let avg_soil_moisture = state.store.average_soil_moisture(since).await?.unwrap_or(0.0);
    let triggered_liters = state.store.triggered_liters_total().await?;

    Ok(Json(DashboardStats {
        active_sensors,
        plants_monitored,
        avg_soil_moisture: round1(avg_soil_moisture),
        water_saved_liters: round1(triggered_liters * WATER_SAVINGS_FACTOR),
    }))
}
