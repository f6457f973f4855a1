use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::{role, user_role};
use crate::error::{AppError, AppResult};
use crate::services::{contains_pattern, require_text, Page, PageParams};

#[derive(Debug, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RolePatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedRole {
    pub message: String,
    pub id: i32,
}

async fn ensure_name_free<C: ConnectionTrait>(conn: &C, name: &str, except: Option<i32>) -> AppResult<()> {
    let mut query = role::Entity::find().filter(role::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(role::Column::Id.ne(id));
    }

    if query.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Role with name {} already exists",
            name
        )));
    }

    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: NewRole) -> AppResult<role::Model> {
    let name = require_text("name", &input.name, 50)?;
    ensure_name_free(db, &name, None).await?;

    let role = role::ActiveModel {
        name: Set(name),
        description: Set(input.description),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(role_id = role.id, role = %role.name, "Role created");
    Ok(role)
}

pub async fn list(db: &DatabaseConnection, name: Option<String>, params: PageParams) -> AppResult<Page<role::Model>> {
    let mut query = role::Entity::find();

    if let Some(name) = name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col((role::Entity, role::Column::Name))))
                .like(contains_pattern(name)),
        );
    }

    let paginator = query
        .order_by_asc(role::Column::Id)
        .paginate(db, params.limit);

    let total = paginator.num_items().await?;
    let data = paginator.fetch_page(params.index()).await?;

    Ok(Page::new(data, total, params))
}

pub async fn get(db: &DatabaseConnection, id: i32) -> AppResult<role::Model> {
    role::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role with id {} not found", id)))
}

pub async fn update(db: &DatabaseConnection, id: i32, patch: RolePatch) -> AppResult<role::Model> {
    let role = get(db, id).await?;
    let mut active: role::ActiveModel = role.clone().into();

    if let Some(name) = patch.name {
        let name = require_text("name", &name, 50)
            .map_err(|_| AppError::BadRequest("Role name must not be empty".to_string()))?;
        ensure_name_free(db, &name, Some(id)).await?;
        active.name = Set(name);
    }

    if let Some(description) = patch.description {
        active.description = Set(Some(description));
    }

    if !active.is_changed() {
        return Ok(role);
    }

    Ok(active.update(db).await?)
}

/// Deletes the role and every assignment of it.
pub async fn remove(db: &DatabaseConnection, id: i32) -> AppResult<DeletedRole> {
    let txn = db.begin().await?;

    role::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role with id {} not found", id)))?;

    user_role::Entity::delete_many()
        .filter(user_role::Column::RoleId.eq(id))
        .exec(&txn)
        .await?;
    role::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(role_id = id, "Role deleted");

    Ok(DeletedRole {
        message: "Role deleted successfully".to_string(),
        id,
    })
}
