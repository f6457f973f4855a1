mod common;

use chrono::NaiveDate;
use travel_booker::entities::booking::BookingStatus;
use travel_booker::services::bookings::{self, BookingPatch, NewBooking};
use travel_booker::services::destinations::{
    self, DestinationFilter, DestinationPatch, NewDestination, ACTIVE_BOOKINGS_EXIST,
};
use travel_booker::services::PageParams;
use travel_booker::AppError;

fn new_destination(name: &str, country: &str, city: &str) -> NewDestination {
    NewDestination {
        name: name.to_string(),
        country: country.to_string(),
        city: city.to_string(),
        is_active: None,
    }
}

fn new_booking(destination_id: uuid::Uuid) -> NewBooking {
    NewBooking {
        customer_name: "Ana Pérez".to_string(),
        customer_email: "ana@test.com".to_string(),
        destination_id,
        travel_date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
    }
}

#[tokio::test]
async fn test_create_defaults_to_active() {
    let db = common::setup_db().await;

    let created = destinations::create(&db, new_destination(" Cancún ", "Mexico", "Cancun"))
        .await
        .unwrap();

    assert_eq!(created.name, "Cancún");
    assert!(created.is_active);

    let fetched = destinations::get(&db, created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.country, "Mexico");
}

#[tokio::test]
async fn test_create_rejects_blank_fields() {
    let db = common::setup_db().await;

    let err = destinations::create(&db, new_destination("Lima", "  ", "Lima"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_list_filters_case_insensitively() {
    let db = common::setup_db().await;
    destinations::create(&db, new_destination("Cancún", "Mexico", "Cancun")).await.unwrap();
    destinations::create(&db, new_destination("Tulum", "Mexico", "Tulum")).await.unwrap();
    destinations::create(&db, new_destination("Cusco", "Peru", "Cusco")).await.unwrap();

    let filter = DestinationFilter {
        country: Some("mex".to_string()),
        ..Default::default()
    };
    let page = destinations::list(&db, filter, PageParams::default()).await.unwrap();

    assert_eq!(page.meta.total, 2);
    assert!(page.data.iter().all(|d| d.country == "Mexico"));

    let filter = DestinationFilter {
        city: Some("CUS".to_string()),
        ..Default::default()
    };
    let page = destinations::list(&db, filter, PageParams::default()).await.unwrap();

    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].name, "Cusco");
}

#[tokio::test]
async fn test_list_defaults_to_active_and_paginates() {
    let db = common::setup_db().await;
    for i in 0..3 {
        destinations::create(&db, new_destination(&format!("Spot {}", i), "Chile", "Santiago"))
            .await
            .unwrap();
    }
    let hidden = destinations::create(&db, new_destination("Hidden", "Chile", "Arica"))
        .await
        .unwrap();
    destinations::remove(&db, hidden.id).await.unwrap();

    let params = PageParams::new(Some(2), Some(2)).unwrap();
    let page = destinations::list(&db, DestinationFilter::default(), params).await.unwrap();

    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.page, 2);
    assert_eq!(page.meta.limit, 2);
    assert_eq!(page.data.len(), 1);

    let filter = DestinationFilter {
        is_active: Some(false),
        ..Default::default()
    };
    let page = destinations::list(&db, filter, PageParams::default()).await.unwrap();

    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].id, hidden.id);
}

#[tokio::test]
async fn test_get_unknown_is_not_found() {
    let db = common::setup_db().await;

    let err = destinations::get(&db, uuid::Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_changes_fields() {
    let db = common::setup_db().await;
    let created = destinations::create(&db, new_destination("Cusco", "Peru", "Cusco"))
        .await
        .unwrap();

    let patch = DestinationPatch {
        name: Some("Machu Picchu".to_string()),
        ..Default::default()
    };
    let updated = destinations::update(&db, created.id, patch).await.unwrap();

    assert_eq!(updated.name, "Machu Picchu");
    assert_eq!(updated.city, "Cusco");
    assert!(updated.is_active);
}

#[tokio::test]
async fn test_deactivation_blocked_by_pending_booking() {
    let db = common::setup_db().await;
    let created = destinations::create(&db, new_destination("Cancún", "Mexico", "Cancun"))
        .await
        .unwrap();
    bookings::create(&db, new_booking(created.id), None).await.unwrap();

    let patch = DestinationPatch {
        is_active: Some(false),
        ..Default::default()
    };
    let err = destinations::update(&db, created.id, patch).await.unwrap_err();

    match err {
        AppError::BadRequest(message) => assert_eq!(message, ACTIVE_BOOKINGS_EXIST),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(destinations::get(&db, created.id).await.unwrap().is_active);

    let err = destinations::remove(&db, created.id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_deactivation_blocked_by_confirmed_booking() {
    let db = common::setup_db().await;
    let created = destinations::create(&db, new_destination("Cancún", "Mexico", "Cancun"))
        .await
        .unwrap();
    let booking = bookings::create(&db, new_booking(created.id), None).await.unwrap();
    let patch = BookingPatch {
        status: Some(BookingStatus::Confirmed),
        ..Default::default()
    };
    bookings::update(&db, booking.booking.id, patch).await.unwrap();

    assert_eq!(destinations::count_active_bookings(&db, created.id).await.unwrap(), 1);
    assert!(destinations::remove(&db, created.id).await.is_err());
}

#[tokio::test]
async fn test_deactivation_allowed_once_bookings_cancelled() {
    let db = common::setup_db().await;
    let created = destinations::create(&db, new_destination("Cancún", "Mexico", "Cancun"))
        .await
        .unwrap();
    let booking = bookings::create(&db, new_booking(created.id), None).await.unwrap();
    bookings::remove(&db, booking.booking.id).await.unwrap();

    assert_eq!(destinations::count_active_bookings(&db, created.id).await.unwrap(), 0);

    destinations::remove(&db, created.id).await.unwrap();

    let stored = destinations::get(&db, created.id).await.unwrap();
    assert!(!stored.is_active);
}

#[tokio::test]
async fn test_reactivation_skips_booking_guard() {
    let db = common::setup_db().await;
    let created = destinations::create(&db, new_destination("Tulum", "Mexico", "Tulum"))
        .await
        .unwrap();
    destinations::remove(&db, created.id).await.unwrap();

    let patch = DestinationPatch {
        is_active: Some(true),
        ..Default::default()
    };
    let updated = destinations::update(&db, created.id, patch).await.unwrap();

    assert!(updated.is_active);
}

#[tokio::test]
async fn test_list_filter_treats_wildcards_literally() {
    let db = common::setup_db().await;
    destinations::create(&db, new_destination("Cancún", "Mexico", "Cancun")).await.unwrap();
    destinations::create(&db, new_destination("Resort", "100% Island", "Isla_Mujeres"))
        .await
        .unwrap();

    let filter = DestinationFilter {
        country: Some("_".to_string()),
        ..Default::default()
    };
    let page = destinations::list(&db, filter, PageParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 0);

    let filter = DestinationFilter {
        country: Some("%".to_string()),
        ..Default::default()
    };
    let page = destinations::list(&db, filter, PageParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].name, "Resort");

    let filter = DestinationFilter {
        city: Some("a_m".to_string()),
        ..Default::default()
    };
    let page = destinations::list(&db, filter, PageParams::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
}
