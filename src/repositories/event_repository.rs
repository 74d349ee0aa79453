use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, EventCategory};

pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, event: &Event) -> Result<()> {
        sqlx::query(
            "INSERT INTO events (id, title, event_date, location, description, ticket_price, category, organizer_id, approved, image_url, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(event.date)
        .bind(&event.location)
        .bind(&event.description)
        .bind(event.ticket_price)
        .bind(event.category.label())
        .bind(event.organizer_id)
        .bind(event.approved)
        .bind(&event.image_url)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(event)
    }

    pub async fn update(&self, event: &Event) -> Result<()> {
        sqlx::query(
            "UPDATE events SET title = $1, event_date = $2, location = $3, description = $4, ticket_price = $5, category = $6, image_url = $7, updated_at = $8 WHERE id = $9"
        )
        .bind(&event.title)
        .bind(event.date)
        .bind(&event.location)
        .bind(&event.description)
        .bind(event.ticket_price)
        .bind(event.category.label())
        .bind(&event.image_url)
        .bind(event.updated_at)
        .bind(event.id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Flips a pending event to approved. `None` when the event is missing or already approved.
    pub async fn approve(&self, id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET approved = true, updated_at = NOW() WHERE id = $1 AND approved = false RETURNING *"
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(event)
    }

    /// Deletes the event only while it has no bookings. `false` when nothing
    /// was deleted, including a booking committed concurrently that trips the
    /// foreign key.
    pub async fn delete_unbooked(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM events e WHERE e.id = $1
             AND NOT EXISTS (SELECT 1 FROM bookings b WHERE b.event_id = e.id)"
        )
        .bind(id)
        .execute(self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(err)) if err.is_foreign_key_violation() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_pending(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND approved = false")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn has_bookings(&self, id: Uuid) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM bookings WHERE event_id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    pub async fn list_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE organizer_id = $1 ORDER BY event_date DESC",
        )
        .bind(organizer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn list_pending(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE approved = false ORDER BY created_at ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn list_all(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY event_date DESC")
            .fetch_all(self.pool)
            .await?;

        Ok(events)
    }

    pub async fn list_approved(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE approved = true ORDER BY event_date ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn list_approved_by_category(&self, category: EventCategory) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE approved = true AND category = $1 ORDER BY event_date ASC",
        )
        .bind(category.label())
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn list_approved_before(&self, day: NaiveDate) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE approved = true AND event_date < $1 ORDER BY event_date DESC",
        )
        .bind(day)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }
}
