//! Liveness endpoint.

use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::models::HealthResponse;

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok".into(),
        message: "API is running".into(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
