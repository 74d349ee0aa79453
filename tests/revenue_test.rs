mod common;

use common::*;
use locavista::error::AppError;
use locavista::models::Role;
use sqlx::PgPool;
use uuid::Uuid;

async fn book(app: &TestApp, attendee: &locavista::models::Account, event_id: Uuid) {
    let order_id = initiate(&app.state, attendee.caller(), event_id).await;
    app.state
        .bookings
        .verify_payment(attendee.caller(), signed_callback(&order_id, event_id, KEY_SECRET))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_revenue_sums_every_booking(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let event = seed_event(&pool, &organizer, 999, true).await;

    for name in ["Asha", "Bala", "Chen"] {
        let attendee = seed_account(&pool, name, Role::Attendee).await;
        book(&app, &attendee, event.id).await;
    }

    let revenue = app
        .state
        .revenue
        .event_revenue(organizer.caller(), event.id)
        .await
        .unwrap();

    assert_eq!(revenue.booking_count, 3);
    assert_eq!(revenue.total_revenue, 2_997);
    assert_eq!(revenue.admin_share, 599);
    assert_eq!(revenue.organizer_share, 2_398);
    assert_eq!(revenue.admin_share + revenue.organizer_share, revenue.total_revenue);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_other_organizer_forbidden(pool: PgPool) {
    let app = test_app(pool.clone());
    let owner = seed_account(&pool, "Olga", Role::Organizer).await;
    let other = seed_account(&pool, "Otto", Role::Organizer).await;
    let event = seed_event(&pool, &owner, 500, true).await;

    let err = app
        .state
        .revenue
        .event_revenue(other.caller(), event.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_admin_sees_any_event(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let admin = seed_account(&pool, "Ada", Role::Admin).await;
    let attendee = seed_account(&pool, "Asha", Role::Attendee).await;
    let event = seed_event(&pool, &organizer, 500, true).await;
    book(&app, &attendee, event.id).await;

    let revenue = app
        .state
        .revenue
        .event_revenue(admin.caller(), event.id)
        .await
        .unwrap();

    assert_eq!(revenue.event_id, event.id);
    assert_eq!(revenue.event_title, "Jazz Night");
    assert_eq!(revenue.total_revenue, 500);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_attendee_forbidden(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let attendee = seed_account(&pool, "Asha", Role::Attendee).await;
    let event = seed_event(&pool, &organizer, 500, true).await;

    let err = app
        .state
        .revenue
        .event_revenue(attendee.caller(), event.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_unknown_event_not_found(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = seed_account(&pool, "Ada", Role::Admin).await;

    let err = app
        .state
        .revenue
        .event_revenue(admin.caller(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound("Event")));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_free_event_reports_zeros(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let event = seed_event(&pool, &organizer, 0, true).await;

    let revenue = app
        .state
        .revenue
        .event_revenue(organizer.caller(), event.id)
        .await
        .unwrap();

    assert_eq!(revenue.booking_count, 0);
    assert_eq!(revenue.total_revenue, 0);
    assert_eq!(revenue.organizer_share, 0);
    assert_eq!(revenue.admin_share, 0);
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_overview_is_admin_only(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = seed_account(&pool, "Ada", Role::Admin).await;
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let other = seed_account(&pool, "Otto", Role::Organizer).await;
    seed_event(&pool, &organizer, 500, true).await;
    seed_event(&pool, &other, 700, true).await;

    let overview = app.state.revenue.overview(admin.caller()).await.unwrap();
    assert_eq!(overview.len(), 2);

    let err = app.state.revenue.overview(organizer.caller()).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[sqlx::test(migrations = "src/db/migrations")]
async fn test_organizer_revenue_lists_own_events(pool: PgPool) {
    let app = test_app(pool.clone());
    let organizer = seed_account(&pool, "Olga", Role::Organizer).await;
    let other = seed_account(&pool, "Otto", Role::Organizer).await;
    let attendee = seed_account(&pool, "Asha", Role::Attendee).await;
    let mine = seed_event(&pool, &organizer, 500, true).await;
    seed_event(&pool, &other, 700, true).await;
    book(&app, &attendee, mine.id).await;

    let revenues = app
        .state
        .revenue
        .organizer_revenue(organizer.caller())
        .await
        .unwrap();

    assert_eq!(revenues.len(), 1);
    assert_eq!(revenues[0].event_id, mine.id);
    assert_eq!(revenues[0].organizer_share, 400);
}
