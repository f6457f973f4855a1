use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::entities::role;
use crate::error::AppResult;
use crate::handlers::extract::{AppJson, AppPath, AppQuery};
use crate::services::roles::{self, DeletedRole, NewRole, RolePatch};
use crate::services::{Page, PageParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListRolesQuery {
    pub name: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn create_role(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewRole>,
) -> AppResult<(StatusCode, Json<role::Model>)> {
    let role = roles::create(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn list_roles(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListRolesQuery>,
) -> AppResult<Json<Page<role::Model>>> {
    let params = PageParams::new(query.page, query.limit)?;
    Ok(Json(roles::list(&state.db, query.name, params).await?))
}

pub async fn get_role(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<role::Model>> {
    Ok(Json(roles::get(&state.db, id).await?))
}

pub async fn update_role(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<RolePatch>,
) -> AppResult<Json<role::Model>> {
    Ok(Json(roles::update(&state.db, id, payload).await?))
}

pub async fn delete_role(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<DeletedRole>> {
    Ok(Json(roles::remove(&state.db, id).await?))
}
