mod common;

use travel_booker::entities::user::UserStatus;
use travel_booker::services::credentials;
use travel_booker::services::roles::{self, NewRole, RolePatch};
use travel_booker::services::users::{self, UserFilter, UserPatch};
use travel_booker::services::PageParams;
use travel_booker::AppError;

#[tokio::test]
async fn test_seed_is_idempotent() {
    let db = common::setup_db().await;
    travel_booker::db::seed(&db, common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await
        .unwrap();

    let page = roles::list(&db, None, PageParams::default()).await.unwrap();
    let names: Vec<&str> = page.data.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ADMIN", "AGENT", "VIEWER"]);

    let admins = UserFilter {
        role: Some("ADMIN".to_string()),
        ..Default::default()
    };
    let page = users::list(&db, admins, PageParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].email, common::ADMIN_EMAIL);
    assert_eq!(page.data[0].roles, vec!["ADMIN".to_string()]);
}

#[tokio::test]
async fn test_verify_seeded_admin() {
    let db = common::setup_db().await;

    let identity = credentials::verify(&db, common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await
        .unwrap()
        .expect("admin should authenticate");

    assert_eq!(identity.email, common::ADMIN_EMAIL);
    assert_eq!(identity.roles, vec!["ADMIN".to_string()]);

    let wrong = credentials::verify(&db, common::ADMIN_EMAIL, "wrong").await.unwrap();
    assert!(wrong.is_none());

    let unknown = credentials::verify(&db, "nobody@test.com", "Admin123!").await.unwrap();
    assert!(unknown.is_none());
}

#[tokio::test]
async fn test_inactive_user_cannot_authenticate() {
    let db = common::setup_db().await;
    let agent = common::create_user(&db, "agent@test.com", "secret123", &["AGENT"]).await;

    let patch = UserPatch {
        status: Some(UserStatus::Inactive),
        ..Default::default()
    };
    users::update(&db, agent.id, patch).await.unwrap();

    let result = credentials::verify(&db, "agent@test.com", "secret123").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_create_user_defaults_to_viewer() {
    let db = common::setup_db().await;

    let created = users::create(
        &db,
        users::NewUser {
            name: "Vera".to_string(),
            email: "vera@test.com".to_string(),
            password: "secret123".to_string(),
            status: None,
            roles: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(created.roles, vec!["VIEWER".to_string()]);
    assert_eq!(created.status, UserStatus::Active);
}

#[tokio::test]
async fn test_create_user_rejects_duplicate_email() {
    let db = common::setup_db().await;
    common::create_user(&db, "agent@test.com", "secret123", &["AGENT"]).await;

    let err = users::create(
        &db,
        users::NewUser {
            name: "Other".to_string(),
            email: "agent@test.com".to_string(),
            password: "secret123".to_string(),
            status: None,
            roles: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_create_user_rejects_unknown_role() {
    let db = common::setup_db().await;

    let err = users::create(
        &db,
        users::NewUser {
            name: "Other".to_string(),
            email: "other@test.com".to_string(),
            password: "secret123".to_string(),
            status: None,
            roles: Some(vec!["PILOT".to_string()]),
        },
    )
    .await
    .unwrap_err();

    match err {
        AppError::BadRequest(message) => assert!(message.contains("PILOT")),
        other => panic!("unexpected error: {:?}", other),
    }
    let found = users::list(&db, UserFilter::default(), PageParams::default()).await.unwrap();
    assert_eq!(found.meta.total, 1);
}

#[tokio::test]
async fn test_update_roles_replaces_assignments() {
    let db = common::setup_db().await;
    let user = common::create_user(&db, "viewer@test.com", "secret123", &["VIEWER"]).await;

    let updated = users::update_roles(&db, user.id, vec!["AGENT".to_string(), "VIEWER".to_string()])
        .await
        .unwrap();
    let mut names = updated.roles.clone();
    names.sort();
    assert_eq!(names, vec!["AGENT".to_string(), "VIEWER".to_string()]);

    let fetched = users::get(&db, user.id).await.unwrap();
    assert_eq!(fetched.roles.len(), 2);

    let err = users::update_roles(&db, user.id, vec![]).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_delete_user_removes_assignments() {
    let db = common::setup_db().await;
    let user = common::create_user(&db, "agent@test.com", "secret123", &["AGENT"]).await;

    users::remove(&db, user.id).await.unwrap();

    assert!(matches!(users::get(&db, user.id).await, Err(AppError::NotFound(_))));
    let agents = UserFilter {
        role: Some("AGENT".to_string()),
        ..Default::default()
    };
    let page = users::list(&db, agents, PageParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 0);
}

#[tokio::test]
async fn test_role_crud() {
    let db = common::setup_db().await;

    let created = roles::create(
        &db,
        NewRole {
            name: "AUDITOR".to_string(),
            description: Some("Read-only auditor".to_string()),
        },
    )
    .await
    .unwrap();

    let duplicate = roles::create(
        &db,
        NewRole {
            name: "AUDITOR".to_string(),
            description: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(duplicate, AppError::Conflict(_)));

    let blank = RolePatch {
        name: Some("  ".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        roles::update(&db, created.id, blank).await,
        Err(AppError::BadRequest(_))
    ));

    let patch = RolePatch {
        description: Some("External auditor".to_string()),
        ..Default::default()
    };
    let updated = roles::update(&db, created.id, patch).await.unwrap();
    assert_eq!(updated.description.as_deref(), Some("External auditor"));

    let filtered = roles::list(&db, Some("aud".to_string()), PageParams::default())
        .await
        .unwrap();
    assert_eq!(filtered.meta.total, 1);

    let deleted = roles::remove(&db, created.id).await.unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(matches!(roles::get(&db, created.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_role_filter_treats_wildcards_literally() {
    let db = common::setup_db().await;

    let page = roles::list(&db, Some("%".to_string()), PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);

    let page = roles::list(&db, Some("_".to_string()), PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);
}
