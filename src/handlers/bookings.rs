use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::booking::BookingStatus;
use crate::error::AppResult;
use crate::handlers::extract::{AppJson, AppPath, AppQuery};
use crate::services::bookings::{
    self, BookingFilter, BookingPatch, BookingView, CancelledBooking, NewBooking,
};
use crate::services::{Page, PageParams};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBookingsQuery {
    pub status: Option<BookingStatus>,
    pub destination_id: Option<Uuid>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Create a booking on behalf of the authenticated user
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<NewBooking>,
) -> AppResult<(StatusCode, Json<BookingView>)> {
    let booking = bookings::create(&state.db, payload, Some(claims.sub)).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListBookingsQuery>,
) -> AppResult<Json<Page<BookingView>>> {
    let params = PageParams::new(query.page, query.limit)?;
    let filter = BookingFilter {
        status: query.status,
        destination_id: query.destination_id,
        from_date: query.from_date,
        to_date: query.to_date,
    };

    Ok(Json(bookings::list(&state.db, filter, params).await?))
}

pub async fn get_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<BookingView>> {
    Ok(Json(bookings::get(&state.db, id).await?))
}

/// Confirm a pending booking
pub async fn update_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<BookingPatch>,
) -> AppResult<Json<BookingView>> {
    Ok(Json(bookings::update(&state.db, id, payload).await?))
}

/// Cancel a pending booking
pub async fn cancel_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<CancelledBooking>> {
    Ok(Json(bookings::remove(&state.db, id).await?))
}
