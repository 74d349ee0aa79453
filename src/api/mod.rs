pub mod auth;
pub mod bookings;
pub mod events;
pub mod health;
pub mod payments;
pub mod response;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenIssuer;
use crate::services::retry::RetryPolicy;
use crate::services::{
    AccountService, BookingService, EventService, NotificationDispatcher, Notifier,
    PaymentGateway, RevenueService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub accounts: AccountService,
    pub events: EventService,
    pub bookings: BookingService,
    pub revenue: RevenueService,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: &Config,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let notifications = NotificationDispatcher::new(
            notifier,
            RetryPolicy::exponential(config.notification_max_attempts),
        );

        let accounts = AccountService::new(
            pool.clone(),
            TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_minutes),
            notifications.clone(),
            config.otp_ttl_minutes,
            config.allow_admin_signup,
        );

        Self {
            accounts,
            events: EventService::new(pool.clone()),
            bookings: BookingService::new(
                pool.clone(),
                gateway,
                notifications,
                config.payment.clone(),
            ),
            revenue: RevenueService::new(pool.clone()),
            pool,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/account", get(auth::me))
        .route("/account/password", put(auth::change_password))
        .route("/events", post(events::create_event))
        .route("/events/mine", get(events::my_events))
        .route("/events/pending", get(events::pending_events))
        .route("/events/all", get(events::all_events))
        .route("/events/approved", get(events::approved_events))
        .route("/events/past", get(events::past_events))
        .route("/events/category/{category}", get(events::events_by_category))
        .route("/events/{id}", get(events::get_event))
        .route("/events/{id}", put(events::update_event))
        .route("/events/{id}", delete(events::delete_event))
        .route("/events/{id}/approve", put(events::approve_event))
        .route("/events/{id}/reject", delete(events::reject_event))
        .route("/bookings/mine", get(bookings::my_bookings))
        .route("/bookings/organizer", get(bookings::organizer_bookings))
        .route("/bookings/check-in", post(bookings::check_in))
        .route("/payments/initiate", post(payments::initiate_payment))
        .route("/payments/verify", post(payments::verify_payment))
        .route("/payments/revenue/overview", get(payments::revenue_overview))
        .route("/payments/revenue/mine", get(payments::my_revenue))
        .route("/payments/revenue/{event_id}", get(payments::event_revenue))
        .with_state(state)
}
