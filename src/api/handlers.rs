use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    IntoParams, Modify, OpenApi,
};

use super::{
    dto::{
        CleanupResponse, DeviceStatus, DeviceStatusResponse, InsertReadingResponse,
        NewReadingRequest, ReadingListResponse, ReadingResponse, SetDeviceRequest,
        SprayLogResponse, StatsResponse, ToggleDeviceResponse,
    },
    errors::ApiError,
    AppState,
};
use crate::{auth::AuthUser, spray_log::SpraySession, stats};

/// Window for the live reading list.
const DEFAULT_LIST_LIMIT: usize = 50;
/// Window for the stats summary query.
const DEFAULT_STATS_LIMIT: usize = 100;
/// Retention age for cleanup, in days.
const DEFAULT_RETENTION_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Window size; absent or zero falls back to the endpoint default.
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CleanupParams {
    /// Readings older than this many days are deleted (default 7).
    pub days: Option<i64>,
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Last `limit` readings in insertion order (default 50).
#[utoipa::path(
    get,
    path = "/api/temperatures",
    params(LimitParams),
    responses(
        (status = 200, description = "Recent readings", body = ReadingListResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "temperatures"
)]
pub async fn get_temperatures(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<LimitParams>,
) -> Result<Json<ReadingListResponse>, ApiError> {
    let limit = params.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIST_LIMIT);
    let data = state.store.recent(limit).await;
    Ok(Json(ReadingListResponse { success: true, data }))
}

/// Most recent reading.
#[utoipa::path(
    get,
    path = "/api/temperatures/latest",
    responses(
        (status = 200, description = "Latest reading", body = ReadingResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No data found"),
    ),
    security(("bearer" = [])),
    tag = "temperatures"
)]
pub async fn get_latest_temperature(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<ReadingResponse>, ApiError> {
    let data = state
        .store
        .latest()
        .await
        .ok_or_else(|| ApiError::NotFound("No data found".to_owned()))?;
    Ok(Json(ReadingResponse { success: true, data }))
}

/// Sensor ingest endpoint. Unauthenticated so the producer can stay dumb.
#[utoipa::path(
    post,
    path = "/api/temperatures",
    request_body = NewReadingRequest,
    responses(
        (status = 200, description = "Reading stored", body = InsertReadingResponse),
        (status = 400, description = "Temperature is required"),
    ),
    tag = "temperatures"
)]
pub async fn add_temperature(
    State(state): State<AppState>,
    Json(body): Json<NewReadingRequest>,
) -> Result<Json<InsertReadingResponse>, ApiError> {
    let temperature = body
        .temperature
        .ok_or_else(|| ApiError::Validation("Temperature is required".to_owned()))?;

    let data = state.store.insert(temperature, body.humidity).await;
    Ok(Json(InsertReadingResponse {
        success: true,
        message: "Temperature data added successfully".to_owned(),
        id: data.id,
        data,
    }))
}

/// Average/min/max over the last `limit` readings (default 100).
#[utoipa::path(
    get,
    path = "/api/temperatures/stats",
    params(LimitParams),
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No data available"),
    ),
    security(("bearer" = [])),
    tag = "temperatures"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<LimitParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    let limit = params.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_STATS_LIMIT);
    let readings = state.store.recent(limit).await;
    let data = stats::stats(&readings)
        .ok_or_else(|| ApiError::NotFound("No data available".to_owned()))?;
    Ok(Json(StatsResponse { success: true, data }))
}

/// Prune readings older than `days` (default 7). The boundary is inclusive;
/// deleting nothing is still a success.
#[utoipa::path(
    delete,
    path = "/api/temperatures/old",
    params(CleanupParams),
    responses(
        (status = 200, description = "Old readings deleted", body = CleanupResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "temperatures"
)]
pub async fn delete_old_temperatures(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<CleanupParams>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let days = params.days.filter(|d| *d > 0).unwrap_or(DEFAULT_RETENTION_DAYS);
    let cutoff = chrono::Utc::now().timestamp_millis() - days * 24 * 60 * 60 * 1000;
    let deleted_count = state.store.delete_older_than(cutoff).await;

    Ok(Json(CleanupResponse {
        success: true,
        message: format!("Deleted {deleted_count} old records"),
        deleted_count,
    }))
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// Current cooling-device flag.
#[utoipa::path(
    get,
    path = "/api/device/status",
    responses(
        (status = 200, description = "Device status", body = DeviceStatusResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "device"
)]
pub async fn get_device_status(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<DeviceStatusResponse>, ApiError> {
    Ok(Json(DeviceStatusResponse {
        success: true,
        data: DeviceStatus { status: state.store.device_status() },
    }))
}

/// Manual toggle. Writes device state directly; by default manual toggles
/// are not recorded as spray events (see LOG_MANUAL_SPRAYS).
#[utoipa::path(
    post,
    path = "/api/device/status",
    request_body = SetDeviceRequest,
    responses(
        (status = 200, description = "Device toggled", body = ToggleDeviceResponse),
        (status = 400, description = "Status is required"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "device"
)]
pub async fn set_device_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<SetDeviceRequest>,
) -> Result<Json<ToggleDeviceResponse>, ApiError> {
    use crate::store::DeviceSwitch;

    let raw = body
        .status
        .ok_or_else(|| ApiError::Validation("Status is required".to_owned()))?;
    let on = coerce_status(&raw);

    state.store.set_status(on).await?;

    // Optional policy: record manual toggles to on alongside automatic
    // sprays, stamped with the latest known temperature.
    if on && state.log_manual_sprays {
        if let Some(latest) = state.store.latest().await {
            state.spray_log.append(SpraySession::manual(latest.temperature)).await;
        }
    }

    Ok(Json(ToggleDeviceResponse {
        success: true,
        message: format!("Device turned {}", if on { "on" } else { "off" }),
        data: DeviceStatus { status: on },
    }))
}

/// Dashboard wire format: JSON `true` and the string `"on"` mean on,
/// everything else means off.
fn coerce_status(raw: &serde_json::Value) -> bool {
    match raw {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => s == "on",
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Spray log
// ---------------------------------------------------------------------------

/// Recorded actuation events, newest first, plus the active threshold.
#[utoipa::path(
    get,
    path = "/api/spray/logs",
    responses(
        (status = 200, description = "Spray sessions", body = SprayLogResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "device"
)]
pub async fn get_spray_logs(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<SprayLogResponse>, ApiError> {
    Ok(Json(SprayLogResponse {
        success: true,
        threshold: state.spray_threshold,
        data: state.spray_log.entries().await,
    }))
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Liveness probe; no auth.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "message": "SunCool backend is running"
    }))
}

/// Fallback for unmatched routes.
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Route not found" })),
    )
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        get_temperatures,
        get_latest_temperature,
        add_temperature,
        get_stats,
        delete_old_temperatures,
        get_device_status,
        set_device_status,
        get_spray_logs,
        health,
    ),
    components(schemas(
        crate::store::models::Reading,
        crate::stats::TempStats,
        crate::spray_log::SpraySession,
        crate::spray_log::SprayKind,
        NewReadingRequest,
        SetDeviceRequest,
        ReadingListResponse,
        ReadingResponse,
        InsertReadingResponse,
        StatsResponse,
        DeviceStatus,
        DeviceStatusResponse,
        ToggleDeviceResponse,
        CleanupResponse,
        SprayLogResponse,
    )),
    tags(
        (name = "temperatures", description = "Reading ingest, queries and retention"),
        (name = "device",       description = "Cooling device control and spray history"),
        (name = "system",       description = "System endpoints"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "SunCool Backend API",
        version = "0.1.0",
        description = "REST API for the SunCool temperature monitoring dashboard"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
                ),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
