mod common;

use common::*;
use locavista::error::AppError;
use locavista::models::{Account, Booking, Event, Role};
use locavista::repositories::BookingRepository;
use sqlx::PgPool;
use uuid::Uuid;

async fn seed_booking(pool: &PgPool, attendee: &Account, event: &Event) -> Booking {
    let booking = Booking::paid(
        attendee.id,
        event.id,
        event.ticket_price,
        format!("pay_{}", Uuid::new_v4().simple()),
        format!("order_{}", Uuid::new_v4().simple()),
    );

    BookingRepository::new(pool)
        .insert_if_absent(&booking)
        .await
        .unwrap()
        .unwrap()
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_check_in(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let attendee = seed_account(&pool, "Asha", Role::Attendee).await;
    let event = seed_event(&pool, &organizer, 500, true).await;
    let booking = seed_booking(&pool, &attendee, &event).await;

    let confirmation = app
        .state
        .bookings
        .check_in(organizer.caller(), &booking.ticket_id)
        .await
        .unwrap();

    assert_eq!(confirmation.ticket_id, booking.ticket_id);
    assert_eq!(confirmation.event_id, event.id);
    assert_eq!(confirmation.event_location, "Pune");
    assert!(confirmation.checked_in_at.is_some());

    let stored = BookingRepository::new(&pool)
        .find_by_ticket_id(&booking.ticket_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_checked_in());
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_second_check_in_rejected(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let attendee = seed_account(&pool, "Asha", Role::Attendee).await;
    let event = seed_event(&pool, &organizer, 500, true).await;
    let booking = seed_booking(&pool, &attendee, &event).await;

    app.state
        .bookings
        .check_in(organizer.caller(), &booking.ticket_id)
        .await
        .unwrap();

    let err = app
        .state
        .bookings
        .check_in(organizer.caller(), &booking.ticket_id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AlreadyCheckedIn(_)));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_unknown_ticket(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;

    let err = app
        .state
        .bookings
        .check_in(organizer.caller(), "TKT-DOESNOTEXIST")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound("Ticket")));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_other_organizer_cannot_check_in(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let other = seed_account(&pool, "Otto", Role::Organizer).await;
    let attendee = seed_account(&pool, "Asha", Role::Attendee).await;
    let event = seed_event(&pool, &organizer, 500, true).await;
    let booking = seed_booking(&pool, &attendee, &event).await;

    let err = app
        .state
        .bookings
        .check_in(other.caller(), &booking.ticket_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let stored = BookingRepository::new(&pool)
        .find_by_ticket_id(&booking.ticket_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_checked_in());
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_attendee_cannot_check_in(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let attendee = seed_account(&pool, "Asha", Role::Attendee).await;
    let event = seed_event(&pool, &organizer, 500, true).await;
    let booking = seed_booking(&pool, &attendee, &event).await;

    let err = app
        .state
        .bookings
        .check_in(attendee.caller(), &booking.ticket_id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}
