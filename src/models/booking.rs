use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::event::EventCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "check_in_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    Confirmed,
    CheckedIn,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub attendee_id: Uuid,
    pub event_id: Uuid,

    pub ticket_id: String,

    /// Minor currency units actually charged.
    pub amount: i64,

    pub payment_status: PaymentStatus,

    pub check_in_status: CheckInStatus,

    pub gateway_payment_id: String,
    pub gateway_order_id: String,

    pub created_at: DateTime<Utc>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn paid(
        attendee_id: Uuid,
        event_id: Uuid,
        amount: i64,
        gateway_payment_id: String,
        gateway_order_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            attendee_id,
            event_id,
            ticket_id: generate_ticket_id(),
            amount,
            payment_status: PaymentStatus::Success,
            check_in_status: CheckInStatus::Confirmed,
            gateway_payment_id,
            gateway_order_id,
            created_at: Utc::now(),
            checked_in_at: None,
        }
    }

    pub fn is_checked_in(&self) -> bool {
        self.check_in_status == CheckInStatus::CheckedIn
    }
}

/// Independent of gateway identifiers; unique by construction.
pub fn generate_ticket_id() -> String {
    format!("TKT-{}", Uuid::new_v4().simple()).to_uppercase()
}

/// A booking joined with the event details an attendee sees in their list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendeeBooking {
    pub booking_id: Uuid,
    pub ticket_id: String,
    pub amount: i64,
    pub check_in_status: CheckInStatus,
    pub created_at: DateTime<Utc>,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_location: String,
    pub event_image: String,

    #[sqlx(try_from = "String")]
    pub event_category: EventCategory,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventBookingCount {
    pub event_id: Uuid,
    pub title: String,
    pub event_date: NaiveDate,
    pub location: String,
    pub bookings: i64,
}

#[derive(Debug, Serialize)]
pub struct BookingSummary {
    pub booking_id: Uuid,
    pub ticket_id: String,
    pub event_title: String,
    pub amount: i64,

    /// False when an earlier identical callback already issued this ticket.
    pub created: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckIn {
    pub ticket_id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckInConfirmation {
    pub ticket_id: String,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_location: String,
    pub checked_in_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ticket_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_ticket_id()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.starts_with("TKT-") && id.len() == 36));
    }

    #[test]
    fn test_paid_booking_defaults() {
        let booking = Booking::paid(
            Uuid::new_v4(),
            Uuid::new_v4(),
            500,
            "pay_1".to_string(),
            "order_1".to_string(),
        );
        assert_eq!(booking.payment_status, PaymentStatus::Success);
        assert_eq!(booking.check_in_status, CheckInStatus::Confirmed);
        assert!(!booking.is_checked_in());
        assert_ne!(booking.ticket_id, booking.gateway_payment_id);
    }

    #[test]
    fn test_check_in_status_serialization() {
        assert_eq!(
            serde_json::to_string(&CheckInStatus::CheckedIn).unwrap(),
            "\"checked_in\""
        );
    }
}
