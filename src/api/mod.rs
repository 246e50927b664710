pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{auth::TokenVerifier, spray_log::SprayLog, store::RealtimeStore};
use handlers::ApiDoc;

/// Everything the handlers need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: RealtimeStore,
    pub spray_log: SprayLog,
    pub verifier: Arc<TokenVerifier>,
    /// Auto-spray trigger threshold, degrees Celsius.
    pub spray_threshold: f64,
    /// When set, manual toggles to on are recorded as `manual` spray events.
    pub log_manual_sprays: bool,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/api/temperatures",
            get(handlers::get_temperatures).post(handlers::add_temperature),
        )
        .route("/api/temperatures/latest", get(handlers::get_latest_temperature))
        .route("/api/temperatures/stats", get(handlers::get_stats))
        .route("/api/temperatures/old", delete(handlers::delete_old_temperatures))
        .route(
            "/api/device/status",
            get(handlers::get_device_status).post(handlers::set_device_status),
        )
        .route("/api/spray/logs", get(handlers::get_spray_logs))
        .with_state(state)
        .split_for_parts();

    router
        .route("/api/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .fallback(handlers::not_found)
}
