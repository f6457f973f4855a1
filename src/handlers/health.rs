use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// Probe the database with a liveness query
pub async fn health(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    state
        .db
        .ping()
        .await
        .map_err(|e| AppError::ServiceUnavailable(format!("Database connection failed: {}", e)))?;

    Ok(Json(HealthResponse {
        status: "ok",
        database: "connected",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
