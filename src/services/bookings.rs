use chrono::{NaiveDate, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::destination;
use crate::error::{AppError, AppResult};
use crate::services::{require_email, require_text, Page, PageParams};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub customer_name: String,
    pub customer_email: String,
    pub destination_id: Uuid,
    pub travel_date: NaiveDate,
}

/// Accepts every booking field, but only `status` may actually be changed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub destination_id: Option<Uuid>,
    pub travel_date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

impl BookingPatch {
    fn touches_non_status_fields(&self) -> bool {
        self.customer_name.is_some()
            || self.customer_email.is_some()
            || self.destination_id.is_some()
            || self.travel_date.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub destination_id: Option<Uuid>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// A booking together with the destination it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub destination: Option<destination::Model>,
}

impl From<(booking::Model, Option<destination::Model>)> for BookingView {
    fn from((booking, destination): (booking::Model, Option<destination::Model>)) -> Self {
        Self { booking, destination }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelledBooking {
    pub message: String,
    pub id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Only the booking status may be updated")]
    OnlyStatusUpdatable,
    #[error("Only PENDING bookings may be modified")]
    NotPendingForUpdate,
    #[error("A booking may only transition from PENDING to CONFIRMED")]
    InvalidTarget,
    #[error("Only PENDING bookings may be cancelled")]
    NotPendingForCancel,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Status an update request leads to, or why it is refused.
pub fn plan_update(current: BookingStatus, patch: &BookingPatch) -> Result<BookingStatus, TransitionError> {
    let requested = match patch.status {
        Some(status) if !patch.touches_non_status_fields() => status,
        _ => return Err(TransitionError::OnlyStatusUpdatable),
    };

    if current != BookingStatus::Pending {
        return Err(TransitionError::NotPendingForUpdate);
    }

    if requested != BookingStatus::Confirmed {
        return Err(TransitionError::InvalidTarget);
    }

    Ok(BookingStatus::Confirmed)
}

pub fn plan_cancel(current: BookingStatus) -> Result<BookingStatus, TransitionError> {
    if current != BookingStatus::Pending {
        return Err(TransitionError::NotPendingForCancel);
    }

    Ok(BookingStatus::Cancelled)
}

pub async fn create(
    db: &DatabaseConnection,
    input: NewBooking,
    created_by_user_id: Option<Uuid>,
) -> AppResult<BookingView> {
    let customer_name = require_text("customerName", &input.customer_name, 150)?;
    let customer_email = require_email("customerEmail", &input.customer_email)?;

    let txn = db.begin().await?;

    // Shared lock holds off a concurrent deactivation until this booking is visible
    let destination = destination::Entity::find_by_id(input.destination_id)
        .filter(destination::Column::IsActive.eq(true))
        .lock_shared()
        .one(&txn)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Destination does not exist or is inactive".to_string())
        })?;

    let now = Utc::now();
    let booking = booking::ActiveModel {
        customer_name: Set(customer_name),
        customer_email: Set(customer_email),
        destination_id: Set(destination.id),
        travel_date: Set(input.travel_date),
        status: Set(BookingStatus::Pending),
        created_by_user_id: Set(created_by_user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let booking = booking.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(booking_id = booking.id, destination_id = %destination.id, "Booking created");

    Ok(BookingView {
        booking,
        destination: Some(destination),
    })
}

pub async fn list(
    db: &DatabaseConnection,
    filter: BookingFilter,
    params: PageParams,
) -> AppResult<Page<BookingView>> {
    if filter.from_date > filter.to_date {
        return Err(AppError::BadRequest(
            "fromDate cannot be later than toDate".to_string(),
        ));
    }

    let mut query = booking::Entity::find()
        .find_also_related(destination::Entity)
        .filter(destination::Column::IsActive.eq(true))
        .filter(booking::Column::TravelDate.between(filter.from_date, filter.to_date));

    if let Some(status) = filter.status {
        query = query.filter(booking::Column::Status.eq(status));
    }

    if let Some(destination_id) = filter.destination_id {
        query = query.filter(booking::Column::DestinationId.eq(destination_id));
    }

    let paginator = query
        .order_by_desc(booking::Column::CreatedAt)
        .order_by_desc(booking::Column::Id)
        .paginate(db, params.limit);

    let total = paginator.num_items().await?;
    let data = paginator
        .fetch_page(params.index())
        .await?
        .into_iter()
        .map(BookingView::from)
        .collect();

    Ok(Page::new(data, total, params))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> AppResult<BookingView> {
    booking::Entity::find_by_id(id)
        .find_also_related(destination::Entity)
        .one(db)
        .await?
        .map(BookingView::from)
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

/// Compare-and-set on the status column: succeeds only while the row is still PENDING.
async fn transition_from_pending(
    db: &DatabaseConnection,
    id: i32,
    next: BookingStatus,
) -> AppResult<bool> {
    let result = booking::Entity::update_many()
        .col_expr(booking::Column::Status, Expr::value(next))
        .col_expr(
            booking::Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(Utc::now())),
        )
        .filter(booking::Column::Id.eq(id))
        .filter(booking::Column::Status.eq(BookingStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Writes `next`, or fails with `lost` when another request consumed the PENDING state first.
async fn apply_transition(
    db: &DatabaseConnection,
    id: i32,
    next: BookingStatus,
    lost: TransitionError,
) -> AppResult<()> {
    if !transition_from_pending(db, id, next).await? {
        tracing::debug!(booking_id = id, status = ?next, "Transition lost to a concurrent request");
        return Err(lost.into());
    }

    Ok(())
}

pub async fn update(db: &DatabaseConnection, id: i32, patch: BookingPatch) -> AppResult<BookingView> {
    let current = get(db, id).await?;
    let next = plan_update(current.booking.status, &patch)?;

    apply_transition(db, id, next, TransitionError::NotPendingForUpdate).await?;

    tracing::info!(booking_id = id, status = ?next, "Booking status updated");
    get(db, id).await
}

/// Cancels the booking; the row is kept with status CANCELLED.
pub async fn remove(db: &DatabaseConnection, id: i32) -> AppResult<CancelledBooking> {
    let current = get(db, id).await?;
    let next = plan_cancel(current.booking.status)?;

    apply_transition(db, id, next, TransitionError::NotPendingForCancel).await?;

    tracing::info!(booking_id = id, "Booking cancelled");

    Ok(CancelledBooking {
        message: "Booking cancelled successfully".to_string(),
        id,
    })
}
