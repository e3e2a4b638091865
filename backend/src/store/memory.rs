use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::Store;
use crate::error::{LeafError, LeafResult};
use crate::models::{
    Alert, DiseaseScan, NewAlert, NewDiseaseScan, NewSensorReading, NewWaterPrediction, Profile,
    SensorReading, WaterPrediction, Zone,
};

#[derive(Default)]
struct Tables {
    readings: Vec<SensorReading>,
    alerts: Vec<Alert>,
    scans: Vec<DiseaseScan>,
    predictions: Vec<WaterPrediction>,
    zones: Vec<Zone>,
    profiles: Vec<Profile>,
}

/// Process-local store for `DATA_STORE=memory` and tests. Rows live in
/// insertion order; nothing is persisted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same reference zones the initial migration seeds.
    pub fn with_default_zones() -> LeafResult<Self> {
        let store = Self::new();
        let now = Utc::now();
        for (i, (name, soil, plant)) in [
            ("Vegetable Garden", "loam", "tomatoes"),
            ("Herb Bed", "sandy", "basil"),
            ("Greenhouse", "peat", "seedlings"),
        ]
        .into_iter()
        .enumerate()
        {
            store.add_zone(name, soil, plant, now - Duration::minutes(3 - i as i64))?;
        }
        Ok(store)
    }

    pub fn add_zone(
        &self,
        name: &str,
        soil_type: &str,
        plant_type: &str,
        created_at: DateTime<Utc>,
    ) -> LeafResult<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?.zones.push(Zone {
            id,
            name: name.to_string(),
            soil_type: soil_type.to_string(),
            plant_type: plant_type.to_string(),
            created_at,
        });
        Ok(id)
    }

    /// Inserts a reading with an explicit timestamp.
    #[cfg(test)]
    pub fn add_reading_at(&self, reading: NewSensorReading, recorded_at: DateTime<Utc>) -> LeafResult<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?.readings.push(to_row(id, reading, recorded_at));
        Ok(id)
    }

    #[cfg(test)]
    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().expect("memory store lock").alerts.clone()
    }

    #[cfg(test)]
    pub fn disease_scans(&self) -> Vec<DiseaseScan> {
        self.lock().expect("memory store lock").scans.clone()
    }

    #[cfg(test)]
    pub fn predictions(&self) -> Vec<WaterPrediction> {
        self.lock().expect("memory store lock").predictions.clone()
    }

    fn lock(&self) -> LeafResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| LeafError::Internal("memory store lock poisoned".to_string()))
    }
}

fn to_row(id: Uuid, r: NewSensorReading, recorded_at: DateTime<Utc>) -> SensorReading {
    SensorReading {
        id,
        device_id: r.device_id,
        temperature: r.temperature,
        humidity: r.humidity,
        soil_moisture: r.soil_moisture,
        light_intensity: r.light_intensity,
        co2_level: r.co2_level,
        recorded_at,
    }
}

fn newest_first<T: Clone>(rows: &[T], limit: i64, at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut rows = rows.to_vec();
    // stable sort keeps later inserts ahead on equal timestamps after the reverse
    rows.sort_by_key(|r| at(r));
    rows.reverse();
    rows.truncate(limit.max(0) as usize);
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_reading(&self, reading: NewSensorReading) -> LeafResult<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?.readings.push(to_row(id, reading, Utc::now()));
        Ok(id)
    }

    async fn readings_since(&self, since: DateTime<Utc>, limit: i64) -> LeafResult<Vec<SensorReading>> {
        let t = self.lock()?;
        let in_window: Vec<SensorReading> = t
            .readings
            .iter()
            .filter(|r| r.recorded_at >= since)
            .cloned()
            .collect();
        let mut rows = newest_first(&in_window, limit, |r| r.recorded_at);
        rows.reverse();
        Ok(rows)
    }

    async fn latest_readings(&self, limit: i64) -> LeafResult<Vec<SensorReading>> {
        let t = self.lock()?;
        Ok(newest_first(&t.readings, limit, |r| r.recorded_at))
    }

    async fn count_active_devices(&self, since: DateTime<Utc>) -> LeafResult<i64> {
        let t = self.lock()?;
        let devices: HashSet<&str> = t
            .readings
            .iter()
            .filter(|r| r.recorded_at >= since)
            .map(|r| r.device_id.as_str())
            .collect();
        Ok(devices.len() as i64)
    }

    async fn average_soil_moisture(&self, since: DateTime<Utc>) -> LeafResult<Option<f64>> {
        let t = self.lock()?;
        let values: Vec<f64> = t
            .readings
            .iter()
            .filter(|r| r.recorded_at >= since)
            .map(|r| r.soil_moisture)
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    async fn insert_alert(&self, alert: NewAlert) -> LeafResult<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?.alerts.push(Alert {
            id,
            alert_type: alert.kind.as_str().to_string(),
            message: alert.message,
            is_read: false,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn recent_alerts(&self, limit: i64) -> LeafResult<Vec<Alert>> {
        let t = self.lock()?;
        Ok(newest_first(&t.alerts, limit, |a| a.created_at))
    }

    async fn mark_alert_read(&self, id: Uuid) -> LeafResult<bool> {
        let mut t = self.lock()?;
        match t.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_zones(&self) -> LeafResult<Vec<Zone>> {
        let mut zones = self.lock()?.zones.clone();
        zones.sort_by_key(|z| z.created_at);
        Ok(zones)
    }

    async fn find_zone(&self, id: Uuid) -> LeafResult<Option<Zone>> {
        Ok(self.lock()?.zones.iter().find(|z| z.id == id).cloned())
    }

    async fn count_zones(&self) -> LeafResult<i64> {
        Ok(self.lock()?.zones.len() as i64)
    }

    async fn insert_prediction(&self, p: NewWaterPrediction) -> LeafResult<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?.predictions.push(WaterPrediction {
            id,
            zone_id: p.zone_id,
            next_watering_hours: p.next_watering_hours,
            confidence: p.confidence,
            recommended_amount_liters: p.recommended_amount_liters,
            triggered: false,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn latest_prediction(&self, zone_id: Uuid) -> LeafResult<Option<WaterPrediction>> {
        let t = self.lock()?;
        Ok(t
            .predictions
            .iter()
            .filter(|p| p.zone_id == Some(zone_id))
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn mark_prediction_triggered(&self, zone_id: Uuid) -> LeafResult<Option<Uuid>> {
        let mut t = self.lock()?;
        let target = t
            .predictions
            .iter_mut()
            .filter(|p| p.zone_id == Some(zone_id) && !p.triggered)
            .max_by_key(|p| p.created_at);
        Ok(target.map(|p| {
            p.triggered = true;
            p.id
        }))
    }

    async fn triggered_liters_total(&self) -> LeafResult<f64> {
        Ok(self
            .lock()?
            .predictions
            .iter()
            .filter(|p| p.triggered)
            .map(|p| p.recommended_amount_liters)
            .sum())
    }

    async fn insert_disease_scan(&self, s: NewDiseaseScan) -> LeafResult<Uuid> {
        let id = Uuid::new_v4();
        self.lock()?.scans.push(DiseaseScan {
            id,
            disease_name: s.disease_name,
            confidence: s.confidence,
            severity: s.severity,
            treatment: s.treatment,
            is_healthy: s.is_healthy,
            image_ref: s.image_ref,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get_profile(&self, user_id: &str) -> LeafResult<Option<Profile>> {
        Ok(self
            .lock()?
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn upsert_profile(&self, mut profile: Profile) -> LeafResult<Profile> {
        profile.updated_at = Some(Utc::now());
        let mut t = self.lock()?;
        match t.profiles.iter_mut().find(|p| p.user_id == profile.user_id) {
            Some(existing) => *existing = profile.clone(),
            None => t.profiles.push(profile.clone()),
        }
        Ok(profile)
    }
}
