use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::extract::AppJson;
use crate::services::credentials::{self, Identity};
use crate::utils::jwt::create_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: Identity,
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let user = credentials::verify(&state.db, &payload.email, &payload.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let access_token = create_token(
        user.id,
        &user.email,
        &user.roles,
        &state.config.jwt_secret,
        state.config.jwt_expiration_minutes,
    )?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((StatusCode::CREATED, Json(AuthResponse { access_token, user })))
}
