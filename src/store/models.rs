use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One temperature/humidity sample as produced by the sensor.
///
/// Immutable once inserted: the store assigns the id, and readings are only
/// ever removed by retention cleanup, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reading {
    pub id: Uuid,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity percentage; `None` when the sensor did not report it.
    pub humidity: Option<f64>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Reading {
    /// Build a reading stamped with the current wall clock.
    pub fn new(temperature: f64, humidity: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            temperature,
            humidity,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
