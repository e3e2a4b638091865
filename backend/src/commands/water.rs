use axum::extract::{rejection::JsonRejection, Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::ai::extract::number_field;
use crate::ai::{CompletionRequest, GatewayError};
use crate::error::{LeafError, LeafResult};
use crate::models::{AlertKind, NewAlert, NewWaterPrediction, SensorReading, Zone};
use crate::state::AppState;
use crate::utils::{round1, split_hours};

pub const DEFAULT_ZONE_NAME: &str = "Main Garden";
pub const DEFAULT_HOURS: f64 = 6.0;
pub const DEFAULT_CONFIDENCE: f64 = 85.0;
pub const DEFAULT_LITERS: f64 = 2.5;
pub const RULE_CONFIDENCE: f64 = 70.0;
pub const UNAVAILABLE_CONFIDENCE: f64 = 50.0;
const HISTORY_SAMPLES: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterForecast {
    pub hours: f64,
    pub confidence: f64,
    pub liters: f64,
}

impl WaterForecast {
    /// Field-by-field defaults for whatever the model left out.
    pub fn from_completion(obj: Option<&Map<String, Value>>) -> Self {
        Self {
            hours: number_field(obj, "next_watering_hours").unwrap_or(DEFAULT_HOURS),
            confidence: number_field(obj, "confidence").unwrap_or(DEFAULT_CONFIDENCE),
            liters: number_field(obj, "recommended_amount_liters").unwrap_or(DEFAULT_LITERS),
        }
    }

    /// Used when the gateway call itself fails.
    pub fn from_moisture(soil_moisture: f64) -> Self {
        let hours = if soil_moisture < 30.0 {
            2.0
        } else if soil_moisture < 50.0 {
            6.0
        } else {
            12.0
        };
        Self {
            hours,
            confidence: RULE_CONFIDENCE,
            liters: DEFAULT_LITERS,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            hours: DEFAULT_HOURS,
            confidence: UNAVAILABLE_CONFIDENCE,
            liters: DEFAULT_LITERS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WaterPredictionResponse {
    pub next_watering_hours: i64,
    pub next_watering_minutes: i64,
    pub confidence: f64,
    pub recommended_amount_liters: f64,
    pub zone: String,
}

impl WaterPredictionResponse {
    pub fn new(forecast: WaterForecast, zone: &str) -> Self {
        let (hours, minutes) = split_hours(forecast.hours);
        Self {
            next_watering_hours: hours,
            next_watering_minutes: minutes,
            confidence: forecast.confidence,
            recommended_amount_liters: forecast.liters,
            zone: zone.to_string(),
        }
    }
}

pub fn build_water_prompt(latest: Option<&SensorReading>, history: &[SensorReading], zone: Option<&Zone>) -> String {
    let current = match latest {
        Some(r) => format!(
            "soil moisture {}%, temperature {}°C, humidity {}%, light {} lux{}",
            r.soil_moisture,
            r.temperature,
            r.humidity,
            r.light_intensity,
            r.co2_level.map(|c| format!(", CO2 {} ppm", c)).unwrap_or_default()
        ),
        None => "no readings available".to_string(),
    };

    let trend = history
        .iter()
        .map(|r| format!("{}: moisture {}%, temp {}°C", r.recorded_at.format("%Y-%m-%d %H:%M"), r.soil_moisture, r.temperature))
        .collect::<Vec<_>>()
        .join("\n");

    let zone_line = match zone {
        Some(z) => format!("Zone: {} (soil: {}, plants: {})", z.name, z.soil_type, z.plant_type),
        None => format!("Zone: {}", DEFAULT_ZONE_NAME),
    };

    format!(
        "You are an irrigation assistant for a plant-monitoring system.\n\
        {}\n\
        Current conditions: {}\n\
        Recent readings (newest first):\n{}\n\n\
        Estimate when this zone should be watered next.\n\
        Respond with a JSON object only, with keys:\n\
        \"next_watering_hours\" (number), \"confidence\" (0-100), \"recommended_amount_liters\" (number).",
        zone_line, current, trend
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictWaterParams {
    pub zone_id: Option<Uuid>,
}

/// Outcome before the response is shaped: `Err` is the unavailable path.
/// `zone_id` is stored as given; it is not checked against the zones table.
async fn forecast_water(
    state: &AppState,
    zone: Option<&Zone>,
    zone_id: Option<Uuid>,
) -> LeafResult<WaterForecast> {
    let history = state.store.latest_readings(HISTORY_SAMPLES).await?;
    let latest = history.first();
    let prompt = build_water_prompt(latest, &history, zone);

    let forecast = match state.gateway.complete(CompletionRequest::text(prompt)).await {
        Ok(text) => {
            let obj = state.extractor.extract(&text);
            if obj.is_none() {
                tracing::warn!("Watering completion had no JSON object; using defaults");
            }
            WaterForecast::from_completion(obj.as_ref())
        }
        Err(e) if e.is_transport_failure() => {
            let moisture = latest.map(|r| r.soil_moisture).unwrap_or(50.0);
            tracing::warn!("AI call failed ({}); rule-based forecast from moisture {}", e, moisture);
            WaterForecast::from_moisture(moisture)
        }
        Err(e) => return Err(e.into()),
    };

    state
        .store
        .insert_prediction(NewWaterPrediction {
            zone_id,
            next_watering_hours: forecast.hours,
            confidence: forecast.confidence,
            recommended_amount_liters: forecast.liters,
        })
        .await?;

    Ok(forecast)
}

async fn resolve_zone(state: &AppState, zone_id: Option<Uuid>) -> LeafResult<Option<Zone>> {
    match zone_id {
        Some(id) => state.store.find_zone(id).await,
        None => Ok(state.store.list_zones().await?.into_iter().next()),
    }
}

async fn predict_water(state: AppState, zone_id: Option<Uuid>) -> Response {
    let zone = match resolve_zone(&state, zone_id).await {
        Ok(zone) => zone,
        Err(e) => return unavailable_response(&e, DEFAULT_ZONE_NAME),
    };
    let zone_name = zone.as_ref().map(|z| z.name.as_str()).unwrap_or(DEFAULT_ZONE_NAME);
    let stored_zone_id = zone_id.or(zone.as_ref().map(|z| z.id));

    match forecast_water(&state, zone.as_ref(), stored_zone_id).await {
        Ok(forecast) => {
            tracing::info!(
                "Watering forecast for {}: {}h (confidence {})",
                zone_name,
                round1(forecast.hours),
                forecast.confidence
            );
            Json(WaterPredictionResponse::new(forecast, zone_name)).into_response()
        }
        Err(e) => unavailable_response(&e, zone_name),
    }
}

fn unavailable_response(err: &LeafError, zone_name: &str) -> Response {
    tracing::error!("Watering prediction unavailable: {}", err);
    let mut body = json!(WaterPredictionResponse::new(WaterForecast::unavailable(), zone_name));
    body["error"] = json!(err.to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

pub async fn predict_water_get(
    State(state): State<AppState>,
    Query(params): Query<PredictWaterParams>,
) -> Response {
    predict_water(state, params.zone_id).await
}

pub async fn predict_water_post(
    State(state): State<AppState>,
    Query(params): Query<PredictWaterParams>,
    body: Option<Json<PredictWaterParams>>,
) -> Response {
    let zone_id = body.and_then(|Json(b)| b.zone_id).or(params.zone_id);
    predict_water(state, zone_id).await
}

#[derive(Debug, Deserialize)]
pub struct TriggerPayload {
    pub zone_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
}

/// The zone is looked up for its name only; unknown ids are still watered.
pub async fn trigger_watering(
    State(state): State<AppState>,
    payload: Result<Json<TriggerPayload>, JsonRejection>,
) -> LeafResult<Json<TriggerResponse>> {
    let Json(payload) = payload?;
    let raw = payload
        .zone_id
        .filter(|z| !z.trim().is_empty())
        .ok_or_else(|| LeafError::Validation("zone_id is required".to_string()))?;
    let zone_id = Uuid::parse_str(raw.trim())
        .map_err(|_| LeafError::Validation(format!("Invalid zone_id: {}", raw)))?;

    let zone = state.store.find_zone(zone_id).await?;
    let zone_name = zone.map(|z| z.name);

    match state.store.mark_prediction_triggered(zone_id).await? {
        Some(prediction_id) => tracing::info!("Prediction {} marked as triggered", prediction_id),
        None => tracing::debug!("No pending prediction for zone {}", zone_id),
    }

    let label = zone_name.clone().unwrap_or_else(|| zone_id.to_string());
    state
        .store
        .insert_alert(NewAlert::new(
            AlertKind::Success,
            format!("Manual watering triggered for {}", label),
        ))
        .await?;
    tracing::info!("Manual watering triggered for {}", label);

    Ok(Json(TriggerResponse {
        success: true,
        message: "Watering triggered successfully".to_string(),
        zone_name,
    }))
}
