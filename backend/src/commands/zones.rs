use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::error::LeafResult;
use crate::models::WaterPrediction;
use crate::state::AppState;
use crate::utils::{round1, split_hours};

#[derive(Debug, Serialize, PartialEq)]
pub struct ZoneView {
    pub id: Uuid,
    pub name: String,
    pub next_water: String,
    pub status: String,
    pub moisture: f64,
    pub soil_type: String,
    pub plant_type: String,
}

pub fn moisture_status(moisture: f64) -> &'static str {
    if moisture < 30.0 {
        "dry"
    } else if moisture <= 70.0 {
        "optimal"
    } else {
        "wet"
    }
}

pub fn next_water_label(prediction: Option<&WaterPrediction>) -> String {
    match prediction {
        Some(p) if !p.triggered => {
            let (h, m) = split_hours(p.next_watering_hours);
            format!("{}h {}m", h, m)
        }
        _ => "Not scheduled".to_string(),
    }
}

pub async fn get_zones(State(state): State<AppState>) -> LeafResult<Json<Vec<ZoneView>>> {
    let zones = state.store.list_zones().await?;
    // Readings carry a device id, not a zone, so every zone shows the latest sample.
    let moisture = state
        .store
        .latest_readings(1)
        .await?
        .first()
        .map(|r| r.soil_moisture)
        .unwrap_or(0.0);

    let mut views = Vec::with_capacity(zones.len());
    for zone in zones {
        let prediction = state.store.latest_prediction(zone.id).await?;
        views.push(ZoneView {
            id: zone.id,
            name: zone.name,
            next_water: next_water_label(prediction.as_ref()),
            status: moisture_status(moisture).to_string(),
            moisture: round1(moisture),
            soil_type: zone.soil_type,
            plant_type: zone.plant_type,
        });
    }
    Ok(Json(views))
}
