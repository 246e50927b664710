use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{spray_log::SpraySession, stats::TempStats, store::models::Reading};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/temperatures`. `temperature` is required but modeled
/// as `Option` so the handler can answer with the canonical 400 message
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NewReadingRequest {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Body of `POST /api/device/status`. The producer side sends either a JSON
/// boolean or the string `"on"`; anything else coerces to off.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetDeviceRequest {
    #[schema(value_type = Object)]
    pub status: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadingListResponse {
    pub success: bool,
    pub data: Vec<Reading>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadingResponse {
    pub success: bool,
    pub data: Reading,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InsertReadingResponse {
    pub success: bool,
    pub message: String,
    pub id: Uuid,
    pub data: Reading,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub data: TempStats,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceStatus {
    pub status: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceStatusResponse {
    pub success: bool,
    pub data: DeviceStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleDeviceResponse {
    pub success: bool,
    pub message: String,
    pub data: DeviceStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "deletedCount")]
    pub deleted_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SprayLogResponse {
    pub success: bool,
    /// Auto-spray trigger threshold, degrees Celsius.
    pub threshold: f64,
    pub data: Vec<SpraySession>,
}
