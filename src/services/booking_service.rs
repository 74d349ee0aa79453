use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PaymentConfig;
use crate::error::{AppError, AppResult};
use crate::models::booking::{AttendeeBooking, CheckInConfirmation, EventBookingCount};
use crate::models::{
    Booking, BookingSummary, Caller, Event, InitiatePayment, OrderHandle, Role, VerifyPayment,
};
use crate::repositories::{AccountRepository, BookingRepository, EventRepository};
use crate::services::gateway::{
    CreateOrder, GatewayOrder, PaymentGateway, NOTE_ATTENDEE_ID, NOTE_EVENT_ID,
};
use crate::services::notifications::{Email, NotificationDispatcher};
use crate::services::signature::verify_payment_signature;

/// Order initiation, payment verification with idempotent ticket issuance,
/// and check-in.
///
/// The booking ledger's unique constraints on `gateway_order_id` and
/// `(attendee_id, event_id, gateway_order_id)` are what prevent duplicate
/// tickets when identical callbacks race; every read here is only an early exit.
#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    notifications: NotificationDispatcher,
    payment: PaymentConfig,
}

impl BookingService {
    pub fn new(
        pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
        notifications: NotificationDispatcher,
        payment: PaymentConfig,
    ) -> Self {
        Self {
            pool,
            gateway,
            notifications,
            payment,
        }
    }

    pub async fn initiate_payment(
        &self,
        caller: Caller,
        payload: InitiatePayment,
    ) -> AppResult<OrderHandle> {
        require_attendee(caller)?;

        let event = self.bookable_event(payload.event_id).await?;

        if event.ticket_price <= 0 {
            return Err(AppError::validation("Ticket price is not set for this event."));
        }

        if let Some(claimed) = payload.amount {
            if claimed != event.ticket_price {
                warn!(
                    "Ignoring client amount {} for event {} (ticket price {})",
                    claimed, event.id, event.ticket_price
                );
            }
        }

        let bookings = BookingRepository::new(&self.pool);
        if bookings.has_successful_booking(caller.id, event.id).await? {
            return Err(AppError::Conflict(
                "You have already booked this event.".to_string(),
            ));
        }

        let order = self
            .gateway
            .create_order(CreateOrder::for_booking(
                event.id,
                caller.id,
                event.ticket_price,
                &self.payment.currency,
            ))
            .await?;

        info!(
            "Initiated order {} for event {} by attendee {}",
            order.id, event.id, caller.id
        );

        Ok(OrderHandle {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.payment.key_id.clone(),
        })
    }

    pub async fn verify_payment(
        &self,
        caller: Caller,
        payload: VerifyPayment,
    ) -> AppResult<BookingSummary> {
        require_attendee(caller)?;

        if let Some(field) = payload.missing_field() {
            return Err(AppError::validation(format!("Missing field: {}", field)));
        }

        if !verify_payment_signature(
            &payload.order_id,
            &payload.payment_id,
            &payload.signature,
            &self.payment.key_secret,
        ) {
            warn!(
                "Signature mismatch for order {} payment {} from attendee {}: possible tampering",
                payload.order_id, payload.payment_id, caller.id
            );
            return Err(AppError::VerificationFailed("signature mismatch".to_string()));
        }

        let event = self.bookable_event(payload.event_id).await?;
        let bookings = BookingRepository::new(&self.pool);

        if let Some(existing) = bookings.find_by_order_id(&payload.order_id).await? {
            return self.replayed(caller, &event, existing);
        }

        let order = self.gateway.fetch_order(&payload.order_id).await?;
        check_order_matches(&order, caller, &event)?;

        if order.amount != event.ticket_price {
            error!(
                "Unbooked payment {} on order {}: paid {} but event {} is now priced {}; needs reconciliation",
                payload.payment_id, order.id, order.amount, event.id, event.ticket_price
            );
            return Err(AppError::Conflict(
                "Ticket price changed after the order was created. Please start a new payment."
                    .to_string(),
            ));
        }

        let booking = Booking::paid(
            caller.id,
            event.id,
            event.ticket_price,
            payload.payment_id.clone(),
            payload.order_id.clone(),
        );

        match bookings.insert_if_absent(&booking).await? {
            Some(created) => {
                info!(
                    "Created booking {} (ticket {}) for event {} by attendee {}",
                    created.id, created.ticket_id, event.id, caller.id
                );
                self.send_confirmation(&created, &event);
                Ok(summary(&created, &event, true))
            }
            None => match bookings.find_by_order_id(&payload.order_id).await? {
                Some(existing) => self.replayed(caller, &event, existing),
                None => {
                    error!(
                        "Booking insert for order {} conflicted without an existing row",
                        payload.order_id
                    );
                    Err(AppError::Internal(anyhow::anyhow!(
                        "Failed to record booking for order {}",
                        payload.order_id
                    )))
                }
            },
        }
    }

    pub async fn check_in(&self, caller: Caller, ticket_id: &str) -> AppResult<CheckInConfirmation> {
        if !caller.is(Role::Organizer) {
            return Err(AppError::forbidden(
                "Forbidden: Only organizers can perform this action!",
            ));
        }

        let ticket_id = ticket_id.trim();
        if ticket_id.is_empty() {
            return Err(AppError::validation("Missing field: ticket_id"));
        }

        let bookings = BookingRepository::new(&self.pool);
        let booking = bookings
            .find_by_ticket_id(ticket_id)
            .await?
            .ok_or(AppError::NotFound("Ticket"))?;

        let event = EventRepository::new(&self.pool)
            .find_by_id(booking.event_id)
            .await?
            .ok_or(AppError::NotFound("Event"))?;

        if !event.is_owned_by(caller.id) {
            warn!(
                "Organizer {} tried to check in ticket {} for event {} they do not organize",
                caller.id, ticket_id, event.id
            );
            return Err(AppError::forbidden(
                "You can only check in tickets for your own events",
            ));
        }

        if booking.is_checked_in() {
            return Err(AppError::AlreadyCheckedIn(booking.ticket_id));
        }

        let checked_in = bookings
            .mark_checked_in(ticket_id)
            .await?
            .ok_or_else(|| AppError::AlreadyCheckedIn(ticket_id.to_string()))?;

        info!("Checked in ticket {} for event {}", checked_in.ticket_id, event.id);

        Ok(CheckInConfirmation {
            ticket_id: checked_in.ticket_id,
            event_id: event.id,
            event_title: event.title,
            event_date: event.date,
            event_location: event.location,
            checked_in_at: checked_in.checked_in_at,
        })
    }

    pub async fn attendee_bookings(&self, caller: Caller) -> AppResult<Vec<AttendeeBooking>> {
        require_attendee(caller)?;
        Ok(BookingRepository::new(&self.pool)
            .list_for_attendee(caller.id)
            .await?)
    }

    pub async fn organizer_booking_counts(
        &self,
        caller: Caller,
    ) -> AppResult<Vec<EventBookingCount>> {
        if !caller.is(Role::Organizer) {
            return Err(AppError::forbidden(
                "Forbidden: Only organizers can perform this action!",
            ));
        }
        Ok(BookingRepository::new(&self.pool)
            .counts_for_organizer(caller.id)
            .await?)
    }

    async fn bookable_event(&self, event_id: Uuid) -> AppResult<Event> {
        let event = EventRepository::new(&self.pool)
            .find_by_id(event_id)
            .await?
            .ok_or(AppError::NotFound("Event"))?;

        if !event.approved {
            return Err(AppError::validation(
                "Booking not allowed. Event is pending approval.",
            ));
        }

        Ok(event)
    }

    fn replayed(&self, caller: Caller, event: &Event, existing: Booking) -> AppResult<BookingSummary> {
        if existing.attendee_id != caller.id || existing.event_id != event.id {
            warn!(
                "Order {} already redeemed by attendee {} for event {}; replay by attendee {} for event {}: possible tampering",
                existing.gateway_order_id, existing.attendee_id, existing.event_id, caller.id, event.id
            );
            return Err(AppError::Conflict(
                "Payment order has already been redeemed".to_string(),
            ));
        }

        info!(
            "Order {} already booked as ticket {}; returning existing booking",
            existing.gateway_order_id, existing.ticket_id
        );
        Ok(summary(&existing, event, false))
    }

    /// Runs entirely on a detached task; the booking response never waits on it.
    fn send_confirmation(&self, booking: &Booking, event: &Event) {
        let pool = self.pool.clone();
        let notifications = self.notifications.clone();
        let currency = self.payment.currency.clone();
        let booking = booking.clone();
        let (title, date) = (event.title.clone(), event.date);

        tokio::spawn(async move {
            let attendee = match AccountRepository::new(&pool)
                .find_by_id(booking.attendee_id)
                .await
            {
                Ok(Some(account)) => account,
                Ok(None) => {
                    warn!("Attendee {} vanished before confirmation email", booking.attendee_id);
                    return;
                }
                Err(err) => {
                    warn!(
                        "Skipping confirmation email for booking {}: {}",
                        booking.id, err
                    );
                    return;
                }
            };

            let email = Email::booking_confirmation(
                &attendee.email,
                &attendee.name,
                &title,
                date,
                &booking.ticket_id,
                booking.amount,
                &currency,
            );
            if let Err(err) = notifications.deliver(&email).await {
                warn!(
                    "Giving up on confirmation for ticket {}: {:#}",
                    booking.ticket_id, err
                );
            }
        });
    }
}

fn require_attendee(caller: Caller) -> AppResult<()> {
    if !caller.is(Role::Attendee) {
        return Err(AppError::forbidden(
            "Forbidden: Only attendees can book events!",
        ));
    }
    Ok(())
}

/// The signature only covers `order_id|payment_id`, so the event the client
/// names has to be tied back to what the order was created for.
fn check_order_matches(order: &GatewayOrder, caller: Caller, event: &Event) -> AppResult<()> {
    let event_id = event.id.to_string();
    let attendee_id = caller.id.to_string();

    if order.note(NOTE_EVENT_ID) != Some(event_id.as_str())
        || order.note(NOTE_ATTENDEE_ID) != Some(attendee_id.as_str())
    {
        warn!(
            "Order {} was not created for event {} and attendee {}: possible tampering",
            order.id, event.id, caller.id
        );
        return Err(AppError::VerificationFailed(
            "order does not belong to this booking".to_string(),
        ));
    }

    Ok(())
}

fn summary(booking: &Booking, event: &Event, created: bool) -> BookingSummary {
    BookingSummary {
        booking_id: booking.id,
        ticket_id: booking.ticket_id.clone(),
        event_title: event.title.clone(),
        amount: booking.amount,
        created,
    }
}
