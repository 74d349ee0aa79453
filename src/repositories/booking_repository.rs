use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::booking::{AttendeeBooking, Booking, EventBookingCount};

pub struct BookingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Single-statement insert guarded by the ledger's unique constraints.
    /// Returns `None` when a row with the same ticket id or gateway order already exists.
    pub async fn insert_if_absent(&self, booking: &Booking) -> Result<Option<Booking>> {
        let inserted = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, attendee_id, event_id, ticket_id, amount, payment_status, check_in_status, gateway_payment_id, gateway_order_id, created_at, checked_in_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT DO NOTHING
             RETURNING *"
        )
        .bind(booking.id)
        .bind(booking.attendee_id)
        .bind(booking.event_id)
        .bind(&booking.ticket_id)
        .bind(booking.amount)
        .bind(booking.payment_status)
        .bind(booking.check_in_status)
        .bind(&booking.gateway_payment_id)
        .bind(&booking.gateway_order_id)
        .bind(booking.created_at)
        .bind(booking.checked_in_at)
        .fetch_optional(self.pool)
        .await?;

        Ok(inserted)
    }

    pub async fn find_by_order_id(&self, gateway_order_id: &str) -> Result<Option<Booking>> {
        let booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE gateway_order_id = $1")
                .bind(gateway_order_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(booking)
    }

    pub async fn find_by_ticket_id(&self, ticket_id: &str) -> Result<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE ticket_id = $1")
            .bind(ticket_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn has_successful_booking(&self, attendee_id: Uuid, event_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM bookings WHERE attendee_id = $1 AND event_id = $2 AND payment_status = 'success')"
        )
        .bind(attendee_id)
        .bind(event_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Conditional transition `confirmed -> checked_in`; `None` if the ticket
    /// is unknown or was already checked in.
    pub async fn mark_checked_in(&self, ticket_id: &str) -> Result<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET check_in_status = 'checked_in', checked_in_at = NOW()
             WHERE ticket_id = $1 AND check_in_status = 'confirmed'
             RETURNING *"
        )
        .bind(ticket_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn count_for_event(&self, event_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE event_id = $1 AND payment_status = 'success'"
        )
        .bind(event_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    pub async fn list_for_attendee(&self, attendee_id: Uuid) -> Result<Vec<AttendeeBooking>> {
        let bookings = sqlx::query_as::<_, AttendeeBooking>(
            "SELECT b.id AS booking_id, b.ticket_id, b.amount, b.check_in_status, b.created_at,
                    e.id AS event_id, e.title AS event_title, e.event_date, e.location AS event_location,
                    e.image_url AS event_image, e.category AS event_category
             FROM bookings b
             JOIN events e ON e.id = b.event_id
             WHERE b.attendee_id = $1
             ORDER BY b.created_at DESC"
        )
        .bind(attendee_id)
        .fetch_all(self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn counts_for_organizer(&self, organizer_id: Uuid) -> Result<Vec<EventBookingCount>> {
        let counts = sqlx::query_as::<_, EventBookingCount>(
            "SELECT e.id AS event_id, e.title, e.event_date, e.location,
                    COUNT(b.id) FILTER (WHERE b.payment_status = 'success') AS bookings
             FROM events e
             LEFT JOIN bookings b ON b.event_id = e.id
             WHERE e.organizer_id = $1
             GROUP BY e.id
             ORDER BY e.event_date DESC"
        )
        .bind(organizer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(counts)
    }
}
