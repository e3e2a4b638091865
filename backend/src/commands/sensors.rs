use axum::extract::{rejection::JsonRejection, Json, Query, State};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{LeafError, LeafResult};
use crate::models::{AlertKind, NewAlert, NewSensorReading, SensorReading};
use crate::state::AppState;

pub const LOW_MOISTURE_THRESHOLD: f64 = 30.0;
pub const HIGH_TEMPERATURE_THRESHOLD: f64 = 35.0;
const HISTORY_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct IngestPayload {
    pub device_id: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub light_intensity: Option<f64>,
    pub co2_level: Option<f64>,
}

impl IngestPayload {
    pub fn into_reading(self) -> LeafResult<NewSensorReading> {
        let device_id = self.device_id.map(|d| d.trim().to_string()).unwrap_or_default();

        let mut missing = Vec::new();
        if device_id.is_empty() {
            missing.push("device_id");
        }
        if self.temperature.is_none() {
            missing.push("temperature");
        }
        if self.humidity.is_none() {
            missing.push("humidity");
        }
        if self.soil_moisture.is_none() {
            missing.push("soil_moisture");
        }
        if self.light_intensity.is_none() {
            missing.push("light_intensity");
        }
        if !missing.is_empty() {
            return Err(LeafError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        Ok(NewSensorReading {
            device_id,
            temperature: self.temperature.unwrap_or_default(),
            humidity: self.humidity.unwrap_or_default(),
            soil_moisture: self.soil_moisture.unwrap_or_default(),
            light_intensity: self.light_intensity.unwrap_or_default(),
            co2_level: self.co2_level,
        })
    }
}

/// One alert per breached threshold. Strict comparisons: values at the limit are fine.
pub fn threshold_alerts(reading: &NewSensorReading) -> Vec<NewAlert> {
    let mut alerts = Vec::new();
    if reading.soil_moisture < LOW_MOISTURE_THRESHOLD {
        alerts.push(NewAlert::new(
            AlertKind::Warning,
            format!(
                "Low soil moisture on {}: {}%",
                reading.device_id, reading.soil_moisture
            ),
        ));
    }
    if reading.temperature > HIGH_TEMPERATURE_THRESHOLD {
        alerts.push(NewAlert::new(
            AlertKind::Warning,
            format!(
                "High temperature on {}: {}°C",
                reading.device_id, reading.temperature
            ),
        ));
    }
    alerts
}

pub async fn ingest_reading(
    State(state): State<AppState>,
    payload: Result<Json<IngestPayload>, JsonRejection>,
) -> LeafResult<Json<Value>> {
    let Json(payload) = payload?;
    let reading = payload.into_reading()?;
    let alerts = threshold_alerts(&reading);
    let device_id = reading.device_id.clone();

    let id = state.store.insert_reading(reading).await?;
    tracing::info!("Ingested reading {} from {}", id, device_id);

    for alert in alerts {
        tracing::warn!("Threshold alert: {}", alert.message);
        state.store.insert_alert(alert).await?;
    }

    Ok(Json(json!({ "success": true, "id": id })))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    Day,
    Week,
}

impl HistoryRange {
    /// Anything other than `7d` falls back to the last 24 hours.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("7d") => HistoryRange::Week,
            _ => HistoryRange::Day,
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            HistoryRange::Day => Duration::hours(24),
            HistoryRange::Week => Duration::days(7),
        }
    }

    fn label_format(&self) -> &'static str {
        match self {
            HistoryRange::Day => "%H:%M",
            HistoryRange::Week => "%b %d %H:%M",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub range: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct HistoryPoint {
    pub time: String,
    pub moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
}

pub fn to_history_point(reading: &SensorReading, range: HistoryRange) -> HistoryPoint {
    HistoryPoint {
        time: reading.recorded_at.format(range.label_format()).to_string(),
        moisture: reading.soil_moisture,
        temperature: reading.temperature,
        humidity: reading.humidity,
        light: reading.light_intensity,
    }
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> LeafResult<Json<Vec<HistoryPoint>>> {
    let range = HistoryRange::parse(params.range.as_deref());
    let since = Utc::now() - range.window();

    let readings = state.store.readings_since(since, HISTORY_LIMIT).await?;
    Ok(Json(
        readings
            .iter()
            .map(|r| to_history_point(r, range))
            .collect(),
    ))
}
