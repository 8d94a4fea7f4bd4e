use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::error::{CalibrationError, ErrorCode};
use crate::managers::CalibrationManager;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<CalibrationManager>,
}

impl ApiState {
    pub fn new(manager: Arc<CalibrationManager>) -> Self {
        Self { manager }
    }
}

/// Calibration errors mapped to JSON responses.
struct ApiError(CalibrationError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CalibrationError::InvalidChannel { .. } => StatusCode::NOT_FOUND,
            CalibrationError::PersistenceFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({
            "success": false,
            "reason": self.0.reason_tag(),
            "code": self.0.code(),
            "message": self.0.message(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<CalibrationError> for ApiError {
    fn from(err: CalibrationError) -> Self {
        Self(err)
    }
}

/// Two-point calibration request body, field names per the device contract.
#[derive(Debug, Deserialize)]
pub struct CalibrateRequest {
    pub expected_1: f64,
    pub measured_1: f64,
    pub expected_2: f64,
    pub measured_2: f64,
}

/// Successful calibration response.
#[derive(Debug, Serialize)]
pub struct CalibrateResponse {
    pub success: bool,
    pub scale: f64,
    pub shift: f64,
    pub quality: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct EnabledRequest {
    pub enabled: bool,
}

/// Query payload for the compensation endpoint.
#[derive(Debug, Deserialize)]
pub struct CompensateQuery {
    pub channel: String,
    pub raw: f64,
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Debug, Serialize)]
pub struct CompensateResponse {
    pub success: bool,
    pub channel: &'static str,
    pub compensated: f64,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/calibration/status", get(status))
        .route("/api/calibration/enabled", post(set_enabled))
        .route("/api/calibration/export", get(export_profile))
        .route("/api/calibration/import", post(import_profile))
        .route("/api/calibration/:channel", post(calibrate))
        .route("/api/calibration/:channel/reset", post(reset))
        .route("/api/sensor/compensate", get(compensate))
        .with_state(state)
}

/// Run the HTTP server loop.
pub async fn run_http_server(state: ApiState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding device API listener")?;
    let router = build_router(state);
    axum::serve(listener, router)
        .await
        .context("serving device API router")?;
    Ok(())
}

async fn status(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(state.manager.status().to_legacy_json())
}

async fn calibrate(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
    Json(request): Json<CalibrateRequest>,
) -> Result<Json<CalibrateResponse>, ApiError> {
    let channel = Channel::from_str(&channel)?;
    let outcome = state.manager.calibrate(
        channel,
        request.expected_1,
        request.measured_1,
        request.expected_2,
        request.measured_2,
    )?;

    Ok(Json(CalibrateResponse {
        success: true,
        scale: outcome.scale,
        shift: outcome.shift,
        quality: outcome.quality.as_str(),
    }))
}

async fn reset(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let channel = Channel::from_str(&channel)?;
    state.manager.reset(channel)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn set_enabled(
    State(state): State<ApiState>,
    Json(request): Json<EnabledRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.manager.set_enabled(request.enabled)?;
    Ok(Json(
        serde_json::json!({ "success": true, "calibration_enabled": request.enabled }),
    ))
}

async fn export_profile(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let document = state.manager.export_profile()?;
    Ok((
        StatusCode::OK,
        [("content-type", "application/json")],
        document,
    )
        .into_response())
}

async fn import_profile(
    State(state): State<ApiState>,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.manager.import_profile(&body)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn compensate(
    State(state): State<ApiState>,
    Query(query): Query<CompensateQuery>,
) -> Result<Json<CompensateResponse>, ApiError> {
    let channel = Channel::from_str(&query.channel)?;
    let compensated =
        state
            .manager
            .apply_compensation(channel, query.raw, query.temperature, query.humidity);

    Ok(Json(CompensateResponse {
        success: true,
        channel: channel.as_str(),
        compensated,
    }))
}
