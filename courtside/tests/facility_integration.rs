//! Integration tests for fields and bookings.
//!
//! These need a PostgreSQL database (`DATABASE_URL`) and are ignored by default.

use chrono::{Duration, Local};
use courtside::Sport;
use courtside::auth::{AuthManager, RegisterRequest, UserId};
use courtside::db::{Database, DatabaseConfig};
use courtside::facility::{FacilityError, FacilityManager, Field, NewBooking, NewField};
use serial_test::serial;
use std::sync::Arc;

async fn setup() -> (AuthManager, FacilityManager) {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/courtside_test".to_string());

    let config = DatabaseConfig {
        database_url,
        ..DatabaseConfig::development()
    };
    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Migrations failed");

    let pool = Arc::new(db.pool().clone());
    let auth = AuthManager::new(
        pool.clone(),
        "test_pepper_value".to_string(),
        "test_jwt_secret_that_is_long_enough_".to_string(),
    );
    (auth, FacilityManager::new(pool))
}

async fn new_user(auth: &AuthManager) -> UserId {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    auth.register(RegisterRequest {
        username: format!("f_{}", &suffix[..12]),
        password: "password123".to_string(),
        name: "Test".to_string(),
        surname: "Booker".to_string(),
    })
    .await
    .unwrap()
    .id
}

async fn new_field(facility: &FacilityManager, slots: &[&str]) -> Field {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    facility
        .create_field(NewField {
            name: format!("Court {}", &suffix[..8]),
            sport: Sport::Volleyball,
            address: "Idroscalo Milano".to_string(),
            bookable_slots: slots.iter().map(|s| s.to_string()).collect(),
        })
        .await
        .unwrap()
}

fn tomorrow() -> String {
    (Local::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}

fn booking(date: &str, slot: &str) -> NewBooking {
    NewBooking {
        date: date.to_string(),
        slot: slot.to_string(),
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_booking_removes_slot_from_availability() {
    let (auth, facility) = setup().await;
    let user = new_user(&auth).await;
    let field = new_field(&facility, &["10:00", "11:00", "12:00"]).await;
    let date = tomorrow();

    let booked = facility
        .book_slot(field.id, user, booking(&date, "11:00"))
        .await
        .unwrap();
    assert_eq!(booked.slot, "11:00");

    let free = facility.available_slots(field.id, &date).await.unwrap();
    assert_eq!(free, vec!["10:00", "12:00"]);

    let mine = facility.user_bookings(user).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].field.id, field.id);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_slot_cannot_be_booked_twice() {
    let (auth, facility) = setup().await;
    let first = new_user(&auth).await;
    let second = new_user(&auth).await;
    let field = new_field(&facility, &[]).await;
    let date = tomorrow();

    facility
        .book_slot(field.id, first, booking(&date, "18:00"))
        .await
        .unwrap();
    let err = facility
        .book_slot(field.id, second, booking(&date, "18:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, FacilityError::SlotTaken));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_concurrent_bookings_have_one_winner() {
    let (auth, facility) = setup().await;
    let first = new_user(&auth).await;
    let second = new_user(&auth).await;
    let field = new_field(&facility, &[]).await;
    let date = tomorrow();

    let (a, b) = tokio::join!(
        facility.book_slot(field.id, first, booking(&date, "09:00")),
        facility.book_slot(field.id, second, booking(&date, "09:00"))
    );
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_booking_validation() {
    let (auth, facility) = setup().await;
    let user = new_user(&auth).await;
    let field = new_field(&facility, &["10:00"]).await;

    let err = facility
        .book_slot(field.id, user, booking(&tomorrow(), "11:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, FacilityError::SlotNotOffered(_)));

    let err = facility
        .book_slot(field.id, user, booking("2001-01-01", "10:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, FacilityError::PastSlot));

    let err = facility
        .book_slot(field.id, user, booking("tomorrow", "10:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, FacilityError::InvalidDate(_)));

    let err = facility
        .available_slots(field.id, "")
        .await
        .unwrap_err();
    assert!(matches!(err, FacilityError::MissingDate));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_only_owner_cancels_booking() {
    let (auth, facility) = setup().await;
    let owner = new_user(&auth).await;
    let stranger = new_user(&auth).await;
    let field = new_field(&facility, &[]).await;

    let booked = facility
        .book_slot(field.id, owner, booking(&tomorrow(), "15:00"))
        .await
        .unwrap();

    let err = facility
        .cancel_booking(field.id, booked.id, stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, FacilityError::BookingNotFound));

    facility.cancel_booking(field.id, booked.id, owner).await.unwrap();
    let free = facility.available_slots(field.id, &tomorrow()).await.unwrap();
    assert!(free.contains(&"15:00".to_string()));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_missing_field() {
    let (_, facility) = setup().await;
    let err = facility.get_field(i64::MAX).await.unwrap_err();
    assert!(matches!(err, FacilityError::FieldNotFound(_)));
}
