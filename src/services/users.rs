use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserStatus};
use crate::entities::{booking, role, user_role};
use crate::error::{AppError, AppResult};
use crate::services::credentials::hash_password;
use crate::services::{require_email, require_text, Page, PageParams};

const DEFAULT_ROLE: &str = "VIEWER";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub status: Option<UserStatus>,
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub status: Option<UserStatus>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub roles: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl UserView {
    fn new(user: user::Model, roles: Vec<String>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            status: user.status,
            roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if !(6..=128).contains(&len) {
        return Err(AppError::BadRequest(
            "password must be between 6 and 128 characters".to_string(),
        ));
    }
    Ok(())
}

/// Look up every requested role by name, rejecting empty lists and unknown names.
pub async fn resolve_roles<C: ConnectionTrait>(conn: &C, names: &[String]) -> AppResult<Vec<role::Model>> {
    let mut wanted: Vec<String> = names.iter().map(|n| n.trim().to_string()).collect();
    wanted.sort();
    wanted.dedup();
    wanted.retain(|n| !n.is_empty());

    if wanted.is_empty() {
        return Err(AppError::BadRequest("Roles array cannot be empty".to_string()));
    }

    let found = role::Entity::find()
        .filter(role::Column::Name.is_in(wanted.clone()))
        .order_by_asc(role::Column::Id)
        .all(conn)
        .await?;

    let missing: Vec<&str> = wanted
        .iter()
        .filter(|name| !found.iter().any(|r| &r.name == *name))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "These roles do not exist: {}",
            missing.join(", ")
        )));
    }

    Ok(found)
}

async fn assign_roles<C: ConnectionTrait>(conn: &C, user_id: Uuid, roles: &[role::Model]) -> AppResult<()> {
    if roles.is_empty() {
        return Ok(());
    }

    let assignments = roles.iter().map(|r| user_role::ActiveModel {
        user_id: Set(user_id),
        role_id: Set(r.id),
        ..Default::default()
    });

    user_role::Entity::insert_many(assignments).exec(conn).await?;
    Ok(())
}

async fn roles_by_user<C: ConnectionTrait>(conn: &C, user_ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, Vec<String>>> {
    let rows = user_role::Entity::find()
        .find_also_related(role::Entity)
        .filter(user_role::Column::UserId.is_in(user_ids))
        .order_by_asc(user_role::Column::RoleId)
        .all(conn)
        .await?;

    let mut by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (assignment, role) in rows {
        if let Some(role) = role {
            by_user.entry(assignment.user_id).or_default().push(role.name);
        }
    }

    Ok(by_user)
}

async fn ensure_email_free<C: ConnectionTrait>(conn: &C, email: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut query = user::Entity::find().filter(user::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(user::Column::Id.ne(id));
    }

    if query.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "User with email {} already exists",
            email
        )));
    }

    Ok(())
}

async fn find_user<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<user::Model> {
    user::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
}

async fn view<C: ConnectionTrait>(conn: &C, user: user::Model) -> AppResult<UserView> {
    let roles = roles_by_user(conn, vec![user.id])
        .await?
        .remove(&user.id)
        .unwrap_or_default();

    Ok(UserView::new(user, roles))
}

pub async fn create(db: &DatabaseConnection, input: NewUser) -> AppResult<UserView> {
    let name = require_text("name", &input.name, 100)?;
    let email = require_email("email", &input.email)?;
    validate_password(&input.password)?;
    let password_hash = hash_password(&input.password)?;
    let role_names = input
        .roles
        .unwrap_or_else(|| vec![DEFAULT_ROLE.to_string()]);

    let txn = db.begin().await?;

    ensure_email_free(&txn, &email, None).await?;
    let roles = resolve_roles(&txn, &role_names).await?;

    let now = Utc::now();
    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        status: Set(input.status.unwrap_or(UserStatus::Active)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    assign_roles(&txn, user.id, &roles).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(UserView::new(user, roles.into_iter().map(|r| r.name).collect()))
}

pub async fn list(db: &DatabaseConnection, filter: UserFilter, params: PageParams) -> AppResult<Page<UserView>> {
    let mut query = user::Entity::find();

    if let Some(status) = filter.status {
        query = query.filter(user::Column::Status.eq(status));
    }

    if let Some(role_name) = filter.role.as_deref().filter(|r| !r.trim().is_empty()) {
        query = query
            .join(JoinType::InnerJoin, user::Relation::UserRoles.def())
            .join(JoinType::InnerJoin, user_role::Relation::Role.def())
            .filter(role::Column::Name.eq(role_name.trim()));
    }

    let paginator = query
        .order_by_desc(user::Column::CreatedAt)
        .order_by_asc(user::Column::Id)
        .paginate(db, params.limit);

    let total = paginator.num_items().await?;
    let users = paginator.fetch_page(params.index()).await?;

    let mut roles = roles_by_user(db, users.iter().map(|u| u.id).collect()).await?;
    let data = users
        .into_iter()
        .map(|u| {
            let names = roles.remove(&u.id).unwrap_or_default();
            UserView::new(u, names)
        })
        .collect();

    Ok(Page::new(data, total, params))
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> AppResult<UserView> {
    let user = find_user(db, id).await?;
    view(db, user).await
}

pub async fn update(db: &DatabaseConnection, id: Uuid, patch: UserPatch) -> AppResult<UserView> {
    let txn = db.begin().await?;
    let user = find_user(&txn, id).await?;
    let mut active: user::ActiveModel = user.into();

    if let Some(name) = patch.name {
        active.name = Set(require_text("name", &name, 100)?);
    }

    if let Some(email) = patch.email {
        let email = require_email("email", &email)?;
        ensure_email_free(&txn, &email, Some(id)).await?;
        active.email = Set(email);
    }

    if let Some(password) = patch.password {
        validate_password(&password)?;
        active.password_hash = Set(hash_password(&password)?);
    }

    if let Some(status) = patch.status {
        active.status = Set(status);
    }

    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    let result = view(&txn, updated).await?;
    txn.commit().await?;

    Ok(result)
}

/// Replace every role assignment of the user in one transaction.
pub async fn update_roles(db: &DatabaseConnection, id: Uuid, names: Vec<String>) -> AppResult<UserView> {
    let txn = db.begin().await?;
    let user = find_user(&txn, id).await?;
    let roles = resolve_roles(&txn, &names).await?;

    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    assign_roles(&txn, id, &roles).await?;

    let mut active: user::ActiveModel = user.into();
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(user_id = %id, roles = ?names, "User roles replaced");
    Ok(UserView::new(updated, roles.into_iter().map(|r| r.name).collect()))
}

/// Hard delete. Role assignments go with the user; bookings keep a null creator.
pub async fn remove(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    let txn = db.begin().await?;
    find_user(&txn, id).await?;

    booking::Entity::update_many()
        .col_expr(
            booking::Column::CreatedByUserId,
            Expr::value(Option::<Uuid>::None),
        )
        .filter(booking::Column::CreatedByUserId.eq(id))
        .exec(&txn)
        .await?;

    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(id))
        .exec(&txn)
        .await?;

    user::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(user_id = %id, "User deleted");
    Ok(())
}
