use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::role;
use crate::entities::user::{self, UserStatus};
use crate::error::{AppError, AppResult};

/// Identity returned by a successful login, roles flattened to their names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn password_matches(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn role_names<C: ConnectionTrait>(conn: &C, user: &user::Model) -> AppResult<Vec<String>> {
    let roles = user
        .find_related(role::Entity)
        .order_by_asc(role::Column::Id)
        .all(conn)
        .await?;

    Ok(roles.into_iter().map(|r| r.name).collect())
}

/// Check an email/password pair against active accounts.
///
/// Unknown email, inactive account and wrong password all return `Ok(None)`
/// so callers cannot tell them apart.
pub async fn verify(db: &DatabaseConnection, email: &str, password: &str) -> AppResult<Option<Identity>> {
    let Some(user) = user::Entity::find()
        .filter(user::Column::Email.eq(email.trim()))
        .filter(user::Column::Status.eq(UserStatus::Active))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if !password_matches(password, &user.password_hash)? {
        return Ok(None);
    }

    let roles = role_names(db, &user).await?;

    Ok(Some(Identity {
        id: user.id,
        name: user.name,
        email: user.email,
        roles,
    }))
}
