use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Store;
use crate::db::DbPool;
use crate::error::LeafResult;
use crate::models::{
    Alert, NewAlert, NewDiseaseScan, NewSensorReading, NewWaterPrediction, Profile, SensorReading,
    WaterPrediction, Zone,
};

const READING_COLUMNS: &str =
    "id, device_id, temperature, humidity, soil_moisture, light_intensity, co2_level, recorded_at";

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_reading(&self, r: NewSensorReading) -> LeafResult<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO sensor_readings (device_id, temperature, humidity, soil_moisture, light_intensity, co2_level)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&r.device_id)
        .bind(r.temperature)
        .bind(r.humidity)
        .bind(r.soil_moisture)
        .bind(r.light_intensity)
        .bind(r.co2_level)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn readings_since(&self, since: DateTime<Utc>, limit: i64) -> LeafResult<Vec<SensorReading>> {
        let sql = format!(
            "SELECT * FROM (
                SELECT {cols} FROM sensor_readings
                WHERE recorded_at >= $1
                ORDER BY recorded_at DESC LIMIT $2
             ) recent ORDER BY recorded_at ASC",
            cols = READING_COLUMNS
        );
        let rows = sqlx::query_as::<_, SensorReading>(&sql)
            .bind(since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn latest_readings(&self, limit: i64) -> LeafResult<Vec<SensorReading>> {
        let sql = format!(
            "SELECT {} FROM sensor_readings ORDER BY recorded_at DESC LIMIT $1",
            READING_COLUMNS
        );
        let rows = sqlx::query_as::<_, SensorReading>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_active_devices(&self, since: DateTime<Utc>) -> LeafResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT device_id) FROM sensor_readings WHERE recorded_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    async fn average_soil_moisture(&self, since: DateTime<Utc>) -> LeafResult<Option<f64>> {
        let avg: (Option<f64>,) = sqlx::query_as(
            "SELECT AVG(soil_moisture)::DOUBLE PRECISION FROM sensor_readings WHERE recorded_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(avg.0)
    }

    async fn insert_alert(&self, alert: NewAlert) -> LeafResult<Uuid> {
        let (id,): (Uuid,) =
            sqlx::query_as("INSERT INTO alerts (alert_type, message) VALUES ($1, $2) RETURNING id")
                .bind(alert.kind.as_str())
                .bind(&alert.message)
                .fetch_one(&self.pool)
                .await?;
        Ok(id)
    }

    async fn recent_alerts(&self, limit: i64) -> LeafResult<Vec<Alert>> {
        let alerts = sqlx::query_as::<_, Alert>(
            "SELECT id, alert_type, message, is_read, created_at FROM alerts ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    async fn mark_alert_read(&self, id: Uuid) -> LeafResult<bool> {
        let result = sqlx::query("UPDATE alerts SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_zones(&self) -> LeafResult<Vec<Zone>> {
        let zones = sqlx::query_as::<_, Zone>(
            "SELECT id, name, soil_type, plant_type, created_at FROM zones ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(zones)
    }

    async fn find_zone(&self, id: Uuid) -> LeafResult<Option<Zone>> {
        let zone = sqlx::query_as::<_, Zone>(
            "SELECT id, name, soil_type, plant_type, created_at FROM zones WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(zone)
    }

    async fn count_zones(&self) -> LeafResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM zones")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn insert_prediction(&self, p: NewWaterPrediction) -> LeafResult<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO water_predictions (zone_id, next_watering_hours, confidence, recommended_amount_liters)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(p.zone_id)
        .bind(p.next_watering_hours)
        .bind(p.confidence)
        .bind(p.recommended_amount_liters)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn latest_prediction(&self, zone_id: Uuid) -> LeafResult<Option<WaterPrediction>> {
        let prediction = sqlx::query_as::<_, WaterPrediction>(
            "SELECT id, zone_id, next_watering_hours, confidence, recommended_amount_liters, triggered, created_at
             FROM water_predictions WHERE zone_id = $1
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(zone_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(prediction)
    }

    async fn mark_prediction_triggered(&self, zone_id: Uuid) -> LeafResult<Option<Uuid>> {
        let updated: Option<(Uuid,)> = sqlx::query_as(
            "UPDATE water_predictions SET triggered = TRUE
             WHERE id = (
                SELECT id FROM water_predictions
                WHERE zone_id = $1 AND triggered = FALSE
                ORDER BY created_at DESC LIMIT 1
             )
             RETURNING id",
        )
        .bind(zone_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated.map(|(id,)| id))
    }

    async fn triggered_liters_total(&self) -> LeafResult<f64> {
        let total: (Option<f64>,) = sqlx::query_as(
            "SELECT SUM(recommended_amount_liters)::DOUBLE PRECISION FROM water_predictions WHERE triggered = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total.0.unwrap_or(0.0))
    }

    async fn insert_disease_scan(&self, s: NewDiseaseScan) -> LeafResult<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO disease_scans (disease_name, confidence, severity, treatment, is_healthy, image_ref)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&s.disease_name)
        .bind(s.confidence)
        .bind(&s.severity)
        .bind(&s.treatment)
        .bind(s.is_healthy)
        .bind(&s.image_ref)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_profile(&self, user_id: &str) -> LeafResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, display_name, phone, location, avatar_url, alert_email, alert_sms, alert_push, updated_at
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn upsert_profile(&self, p: Profile) -> LeafResult<Profile> {
        let saved = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_id, display_name, phone, location, avatar_url, alert_email, alert_sms, alert_push, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
             ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                phone = EXCLUDED.phone,
                location = EXCLUDED.location,
                avatar_url = EXCLUDED.avatar_url,
                alert_email = EXCLUDED.alert_email,
                alert_sms = EXCLUDED.alert_sms,
                alert_push = EXCLUDED.alert_push,
                updated_at = NOW()
             RETURNING user_id, display_name, phone, location, avatar_url, alert_email, alert_sms, alert_push, updated_at",
        )
        .bind(&p.user_id)
        .bind(&p.display_name)
        .bind(&p.phone)
        .bind(&p.location)
        .bind(&p.avatar_url)
        .bind(p.alert_email)
        .bind(p.alert_sms)
        .bind(p.alert_push)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}
