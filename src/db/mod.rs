use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::role::{self, RoleName};
use crate::entities::user::{self, UserStatus};
use crate::entities::user_role;
use crate::error::{AppError, AppResult};
use crate::services::credentials::hash_password;

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    Database::connect(&config.database_url)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// Seed the built-in roles and the admin account. Safe to run on every start.
pub async fn seed(db: &DatabaseConnection, admin_email: &str, admin_password: &str) -> AppResult<()> {
    let mut admin_role = None;

    for name in RoleName::ALL {
        let existing = role::Entity::find()
            .filter(role::Column::Name.eq(name.as_str()))
            .one(db)
            .await?;

        let role = match existing {
            Some(role) => role,
            None => {
                let role = role::ActiveModel {
                    name: Set(name.as_str().to_string()),
                    description: Set(Some(name.description().to_string())),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                tracing::info!("Role created: {}", name);
                role
            }
        };

        if name == RoleName::Admin {
            admin_role = Some(role);
        }
    }

    let admin_role =
        admin_role.ok_or_else(|| AppError::Internal("ADMIN role missing after seeding".to_string()))?;

    let admin = match user::Entity::find()
        .filter(user::Column::Email.eq(admin_email))
        .one(db)
        .await?
    {
        Some(admin) => admin,
        None => {
            let now = Utc::now();
            let admin = user::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set("Admin".to_string()),
                email: Set(admin_email.to_string()),
                password_hash: Set(hash_password(admin_password)?),
                status: Set(UserStatus::Active),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(db)
            .await?;
            tracing::info!("Admin account created: {}", admin_email);
            admin
        }
    };

    let assigned = user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(admin.id))
        .filter(user_role::Column::RoleId.eq(admin_role.id))
        .one(db)
        .await?;

    if assigned.is_none() {
        user_role::ActiveModel {
            user_id: Set(admin.id),
            role_id: Set(admin_role.id),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
