//! Data-store seam. Every method is a single-table read or write; nothing here
//! is transactional across tables.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::LeafResult;
use crate::models::{
    Alert, NewAlert, NewDiseaseScan, NewSensorReading, NewWaterPrediction, Profile, SensorReading,
    WaterPrediction, Zone,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_reading(&self, reading: NewSensorReading) -> LeafResult<Uuid>;
    /// Readings recorded at or after `since`, oldest first.
    async fn readings_since(&self, since: DateTime<Utc>, limit: i64) -> LeafResult<Vec<SensorReading>>;
    /// Newest first.
    async fn latest_readings(&self, limit: i64) -> LeafResult<Vec<SensorReading>>;
    async fn count_active_devices(&self, since: DateTime<Utc>) -> LeafResult<i64>;
    async fn average_soil_moisture(&self, since: DateTime<Utc>) -> LeafResult<Option<f64>>;

    async fn insert_alert(&self, alert: NewAlert) -> LeafResult<Uuid>;
    /// Newest first.
    async fn recent_alerts(&self, limit: i64) -> LeafResult<Vec<Alert>>;
    async fn mark_alert_read(&self, id: Uuid) -> LeafResult<bool>;

    async fn list_zones(&self) -> LeafResult<Vec<Zone>>;
    async fn find_zone(&self, id: Uuid) -> LeafResult<Option<Zone>>;
    async fn count_zones(&self) -> LeafResult<i64>;

    async fn insert_prediction(&self, prediction: NewWaterPrediction) -> LeafResult<Uuid>;
    async fn latest_prediction(&self, zone_id: Uuid) -> LeafResult<Option<WaterPrediction>>;
    /// Flips `triggered` on the zone's newest untriggered prediction, if any.
    async fn mark_prediction_triggered(&self, zone_id: Uuid) -> LeafResult<Option<Uuid>>;
    async fn triggered_liters_total(&self) -> LeafResult<f64>;

    async fn insert_disease_scan(&self, scan: NewDiseaseScan) -> LeafResult<Uuid>;

    async fn get_profile(&self, user_id: &str) -> LeafResult<Option<Profile>>;
    async fn upsert_profile(&self, profile: Profile) -> LeafResult<Profile>;
}
