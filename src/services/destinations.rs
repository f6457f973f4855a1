use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::destination;
use crate::error::{AppError, AppResult};
use crate::services::{contains_pattern, require_text, Page, PageParams};

pub const ACTIVE_BOOKINGS_EXIST: &str =
    "Destination cannot be deactivated because it has active bookings";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDestination {
    pub name: String,
    pub country: String,
    pub city: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationPatch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct DestinationFilter {
    pub country: Option<String>,
    pub city: Option<String>,
    /// Defaults to active destinations when unset
    pub is_active: Option<bool>,
}

pub async fn create(db: &DatabaseConnection, input: NewDestination) -> AppResult<destination::Model> {
    let now = Utc::now();

    let destination = destination::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(require_text("name", &input.name, 255)?),
        country: Set(require_text("country", &input.country, 150)?),
        city: Set(require_text("city", &input.city, 150)?),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let created = destination.insert(db).await?;
    tracing::info!(destination_id = %created.id, "Destination created");
    Ok(created)
}

fn contains_ignore_case(column: destination::Column, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((destination::Entity, column))))
        .like(contains_pattern(needle))
}

pub async fn list(
    db: &DatabaseConnection,
    filter: DestinationFilter,
    params: PageParams,
) -> AppResult<Page<destination::Model>> {
    let mut query = destination::Entity::find()
        .filter(destination::Column::IsActive.eq(filter.is_active.unwrap_or(true)));

    if let Some(country) = filter.country.as_deref().filter(|c| !c.trim().is_empty()) {
        query = query.filter(contains_ignore_case(destination::Column::Country, country));
    }

    if let Some(city) = filter.city.as_deref().filter(|c| !c.trim().is_empty()) {
        query = query.filter(contains_ignore_case(destination::Column::City, city));
    }

    let paginator = query
        .order_by_asc(destination::Column::CreatedAt)
        .order_by_asc(destination::Column::Id)
        .paginate(db, params.limit);

    let total = paginator.num_items().await?;
    let data = paginator.fetch_page(params.index()).await?;

    Ok(Page::new(data, total, params))
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> AppResult<destination::Model> {
    destination::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Destination not found".to_string()))
}

/// Bookings on the destination that still hold it (anything not CANCELLED).
pub async fn count_active_bookings<C: ConnectionTrait>(conn: &C, destination_id: Uuid) -> AppResult<u64> {
    let count = booking::Entity::find()
        .filter(booking::Column::DestinationId.eq(destination_id))
        .filter(booking::Column::Status.ne(BookingStatus::Cancelled))
        .count(conn)
        .await?;

    Ok(count)
}

async fn ensure_no_active_bookings<C: ConnectionTrait>(conn: &C, destination_id: Uuid) -> AppResult<()> {
    let active = count_active_bookings(conn, destination_id).await?;

    if active > 0 {
        tracing::debug!(%destination_id, active, "Deactivation rejected");
        return Err(AppError::BadRequest(ACTIVE_BOOKINGS_EXIST.to_string()));
    }

    Ok(())
}

pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    patch: DestinationPatch,
) -> AppResult<destination::Model> {
    let txn = db.begin().await?;

    // Row lock serializes the guard against concurrent bookings on this destination
    let destination = destination::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Destination not found".to_string()))?;

    if patch.is_active == Some(false) && destination.is_active {
        ensure_no_active_bookings(&txn, id).await?;
    }

    let mut active: destination::ActiveModel = destination.into();

    if let Some(name) = patch.name {
        active.name = Set(require_text("name", &name, 255)?);
    }

    if let Some(country) = patch.country {
        active.country = Set(require_text("country", &country, 150)?);
    }

    if let Some(city) = patch.city {
        active.city = Set(require_text("city", &city, 150)?);
    }

    if let Some(is_active) = patch.is_active {
        active.is_active = Set(is_active);
    }

    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(updated)
}

/// Soft delete: the row is kept and only flagged inactive.
pub async fn remove(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    let txn = db.begin().await?;

    let destination = destination::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Destination not found".to_string()))?;

    ensure_no_active_bookings(&txn, id).await?;

    let mut active: destination::ActiveModel = destination.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(destination_id = %id, "Destination deactivated");

    Ok(())
}
