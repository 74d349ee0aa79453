use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Caller, RevenueSnapshot, Role};
use crate::repositories::RevenueRepository;

/// Revenue is recomputed from the ledger on every call, so it is consistent
/// with the bookings committed at query time and never cached.
#[derive(Clone)]
pub struct RevenueService {
    pool: PgPool,
}

impl RevenueService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Organizers see their own events, admins see any event.
    pub async fn event_revenue(&self, caller: Caller, event_id: Uuid) -> AppResult<RevenueSnapshot> {
        if caller.is(Role::Attendee) {
            return Err(AppError::forbidden(
                "Access denied. Only organizers and admins can view revenue.",
            ));
        }

        let row = RevenueRepository::new(&self.pool)
            .for_event(event_id)
            .await?
            .ok_or(AppError::NotFound("Event"))?;

        if caller.is(Role::Organizer) && row.organizer_id != caller.id {
            warn!(
                "Organizer {} denied revenue for event {} owned by {}",
                caller.id, event_id, row.organizer_id
            );
            return Err(AppError::forbidden(
                "Access denied. Only organizers and admins can view revenue.",
            ));
        }

        Ok(row.into())
    }

    pub async fn overview(&self, caller: Caller) -> AppResult<Vec<RevenueSnapshot>> {
        if !caller.is(Role::Admin) {
            return Err(AppError::forbidden("Forbidden: Insufficient Permissions!"));
        }

        let rows = RevenueRepository::new(&self.pool).all().await?;
        Ok(rows.into_iter().map(RevenueSnapshot::from).collect())
    }

    pub async fn organizer_revenue(&self, caller: Caller) -> AppResult<Vec<RevenueSnapshot>> {
        if !caller.is(Role::Organizer) {
            return Err(AppError::forbidden(
                "Forbidden: Only organizers can perform this action!",
            ));
        }

        let rows = RevenueRepository::new(&self.pool)
            .for_organizer(caller.id)
            .await?;
        Ok(rows.into_iter().map(RevenueSnapshot::from).collect())
    }
}
