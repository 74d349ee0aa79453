use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::revenue::EventRevenueRow;

const REVENUE_SELECT: &str = "SELECT e.id AS event_id, e.title AS event_title, e.organizer_id, e.ticket_price, e.image_url,
        COUNT(b.id) AS booking_count,
        COALESCE(SUM(b.amount), 0)::BIGINT AS total_revenue
 FROM events e
 LEFT JOIN bookings b ON b.event_id = e.id AND b.payment_status = 'success'";

/// Aggregates the booking ledger per event. Totals are sums of the amounts
/// actually charged, not booking count times the current price.
pub struct RevenueRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RevenueRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn for_event(&self, event_id: Uuid) -> Result<Option<EventRevenueRow>> {
        let query = format!("{} WHERE e.id = $1 GROUP BY e.id", REVENUE_SELECT);
        let row = sqlx::query_as::<_, EventRevenueRow>(&query)
            .bind(event_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    pub async fn for_organizer(&self, organizer_id: Uuid) -> Result<Vec<EventRevenueRow>> {
        let query = format!(
            "{} WHERE e.organizer_id = $1 GROUP BY e.id ORDER BY e.event_date DESC",
            REVENUE_SELECT
        );
        let rows = sqlx::query_as::<_, EventRevenueRow>(&query)
            .bind(organizer_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn all(&self) -> Result<Vec<EventRevenueRow>> {
        let query = format!("{} GROUP BY e.id ORDER BY e.event_date DESC", REVENUE_SELECT);
        let rows = sqlx::query_as::<_, EventRevenueRow>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }
}
