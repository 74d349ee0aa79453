use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Percentage of collected revenue retained by the platform.
pub const ADMIN_SHARE_PERCENT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevenueSplit {
    pub organizer_share: i64,
    pub admin_share: i64,
}

/// Integer split in minor units. The admin share is rounded down and the
/// organizer receives the remainder, so the two always sum to `total`.
pub fn split_revenue(total: i64) -> RevenueSplit {
    let admin_share = total * ADMIN_SHARE_PERCENT / 100;
    RevenueSplit {
        organizer_share: total - admin_share,
        admin_share,
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EventRevenueRow {
    pub event_id: Uuid,
    pub event_title: String,
    pub organizer_id: Uuid,
    pub ticket_price: i64,
    pub image_url: String,
    pub booking_count: i64,
    pub total_revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueSnapshot {
    pub event_id: Uuid,
    pub event_title: String,
    pub event_image: String,
    pub booking_count: i64,
    pub ticket_price: i64,
    pub total_revenue: i64,
    pub organizer_share: i64,
    pub admin_share: i64,
}

impl From<EventRevenueRow> for RevenueSnapshot {
    fn from(row: EventRevenueRow) -> Self {
        let split = split_revenue(row.total_revenue);
        Self {
            event_id: row.event_id,
            event_title: row.event_title,
            event_image: row.image_url,
            booking_count: row.booking_count,
            ticket_price: row.ticket_price,
            total_revenue: row.total_revenue,
            organizer_share: split.organizer_share,
            admin_share: split.admin_share,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_of_round_amount() {
        let split = split_revenue(500);
        assert_eq!(split.organizer_share, 400);
        assert_eq!(split.admin_share, 100);
    }

    #[test]
    fn test_split_never_loses_a_unit() {
        for total in [0, 1, 3, 7, 99, 101, 12_345, 999_999_999] {
            let split = split_revenue(total);
            assert_eq!(split.organizer_share + split.admin_share, total);

            let exact_admin = total as f64 * 0.2;
            assert!((split.admin_share as f64 - exact_admin).abs() < 1.0);
        }
    }

    #[test]
    fn test_snapshot_from_row() {
        let row = EventRevenueRow {
            event_id: Uuid::new_v4(),
            event_title: "Jazz Night".to_string(),
            organizer_id: Uuid::new_v4(),
            ticket_price: 0,
            image_url: "/uploads/a.png".to_string(),
            booking_count: 0,
            total_revenue: 0,
        };
        let snapshot = RevenueSnapshot::from(row);
        assert_eq!(snapshot.total_revenue, 0);
        assert_eq!(snapshot.organizer_share, 0);
        assert_eq!(snapshot.admin_share, 0);
    }
}
