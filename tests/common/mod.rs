#![allow(dead_code)]

use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use serde_json::Value;
use tower::ServiceExt;

use travel_booker::entities::{booking, destination, role, user, user_role};
use travel_booker::routes::create_router;
use travel_booker::services::users::{self, NewUser, UserView};
use travel_booker::utils::jwt::create_token;
use travel_booker::{db, AppState, Config};

pub const ADMIN_EMAIL: &str = "admin@admin.com";
pub const ADMIN_PASSWORD: &str = "Admin123!";
pub const JWT_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "sqlite::memory:"),
        ("JWT_SECRET", JWT_SECRET),
        ("ADMIN_EMAIL", ADMIN_EMAIL),
        ("ADMIN_PASSWORD", ADMIN_PASSWORD),
    ]);

    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let schema = Schema::new(db.get_database_backend());
    db.execute(db.get_database_backend().build(&schema.create_table_from_entity(entity)))
        .await
        .unwrap();
}

/// In-memory database with every table created and the built-in roles and admin seeded.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();

    // Referenced tables first
    create_table(&db, role::Entity).await;
    create_table(&db, user::Entity).await;
    create_table(&db, user_role::Entity).await;
    create_table(&db, destination::Entity).await;
    create_table(&db, booking::Entity).await;

    db::seed(&db, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    db
}

pub async fn setup_state() -> AppState {
    AppState {
        db: setup_db().await,
        config: test_config(),
    }
}

pub async fn create_user(db: &DatabaseConnection, email: &str, password: &str, roles: &[&str]) -> UserView {
    users::create(
        db,
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            status: None,
            roles: Some(roles.iter().map(|r| r.to_string()).collect()),
        },
    )
    .await
    .unwrap()
}

/// Signed token for an existing user without going through the login endpoint.
pub fn token_for(user: &UserView) -> String {
    create_token(user.id, &user.email, &user.roles, JWT_SECRET, 15).unwrap()
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let state = setup_state().await;
        let router = create_router(state.clone());
        Self { state, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }
}
