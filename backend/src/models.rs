use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SensorReading {
    pub id: Uuid,
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub light_intensity: f64,
    pub co2_level: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSensorReading {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub light_intensity: f64,
    pub co2_level: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Success,
    Info,
    Critical,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Warning => "warning",
            AlertKind::Success => "success",
            AlertKind::Info => "info",
            AlertKind::Critical => "critical",
        }
    }

    /// Unknown stored values degrade to `Info`.
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "warning" => AlertKind::Warning,
            "success" => AlertKind::Success,
            "critical" => AlertKind::Critical,
            _ => AlertKind::Info,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: Uuid,
    pub alert_type: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub message: String,
}

impl NewAlert {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiseaseScan {
    pub id: Uuid,
    pub disease_name: String,
    pub confidence: f64,
    pub severity: String,
    pub treatment: String,
    pub is_healthy: bool,
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDiseaseScan {
    pub disease_name: String,
    pub confidence: f64,
    pub severity: String,
    pub treatment: String,
    pub is_healthy: bool,
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WaterPrediction {
    pub id: Uuid,
    pub zone_id: Option<Uuid>,
    pub next_watering_hours: f64,
    pub confidence: f64,
    pub recommended_amount_liters: f64,
    pub triggered: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWaterPrediction {
    pub zone_id: Option<Uuid>,
    pub next_watering_hours: f64,
    pub confidence: f64,
    pub recommended_amount_liters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub soil_type: String,
    pub plant_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    #[sqlx(default)]
    pub alert_email: bool,
    #[sqlx(default)]
    pub alert_sms: bool,
    #[sqlx(default)]
    pub alert_push: bool,
    pub updated_at: Option<DateTime<Utc>>,
}
