use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::user::UserStatus;
use crate::error::AppResult;
use crate::handlers::extract::{AppJson, AppPath, AppQuery};
use crate::services::users::{self, NewUser, UserFilter, UserPatch, UserView};
use crate::services::{Page, PageParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub status: Option<UserStatus>,
    pub role: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: Vec<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewUser>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let user = users::create(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> AppResult<Json<Page<UserView>>> {
    let params = PageParams::new(query.page, query.limit)?;
    let filter = UserFilter {
        status: query.status,
        role: query.role,
    };

    Ok(Json(users::list(&state.db, filter, params).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<UserView>> {
    Ok(Json(users::get(&state.db, id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UserPatch>,
) -> AppResult<Json<UserView>> {
    Ok(Json(users::update(&state.db, id, payload).await?))
}

/// Replace the user's role assignments
pub async fn update_user_roles(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateRolesRequest>,
) -> AppResult<Json<UserView>> {
    Ok(Json(users::update_roles(&state.db, id, payload.roles).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    users::remove(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
