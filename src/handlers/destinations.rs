use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::destination;
use crate::error::AppResult;
use crate::handlers::extract::{AppJson, AppPath, AppQuery};
use crate::services::destinations::{self, DestinationFilter, DestinationPatch, NewDestination};
use crate::services::{Page, PageParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDestinationsQuery {
    pub country: Option<String>,
    pub city: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DeletedDestination {
    pub message: String,
    pub id: Uuid,
}

pub async fn create_destination(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewDestination>,
) -> AppResult<(StatusCode, Json<destination::Model>)> {
    let destination = destinations::create(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(destination)))
}

pub async fn list_destinations(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListDestinationsQuery>,
) -> AppResult<Json<Page<destination::Model>>> {
    let params = PageParams::new(query.page, query.limit)?;
    let filter = DestinationFilter {
        country: query.country,
        city: query.city,
        is_active: query.is_active,
    };

    Ok(Json(destinations::list(&state.db, filter, params).await?))
}

pub async fn get_destination(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<destination::Model>> {
    Ok(Json(destinations::get(&state.db, id).await?))
}

pub async fn update_destination(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<DestinationPatch>,
) -> AppResult<Json<destination::Model>> {
    Ok(Json(destinations::update(&state.db, id, payload).await?))
}

/// Soft delete (deactivate) a destination
pub async fn delete_destination(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<DeletedDestination>> {
    destinations::remove(&state.db, id).await?;

    Ok(Json(DeletedDestination {
        message: "Destination deleted successfully".to_string(),
        id,
    }))
}
