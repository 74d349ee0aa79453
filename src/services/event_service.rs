use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::event::{CreateEvent, UpdateEvent};
use crate::models::{Caller, Event, EventCategory, Role};
use crate::repositories::EventRepository;

/// Catalog management. Organizers own their events, admins moderate them.
#[derive(Clone)]
pub struct EventService {
    pool: PgPool,
}

impl EventService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, caller: Caller, payload: CreateEvent) -> AppResult<Event> {
        require(caller, Role::Organizer)?;

        let event = Event::new(caller.id, payload).map_err(AppError::Validation)?;
        EventRepository::new(&self.pool).create(&event).await?;

        info!("Organizer {} created event {} ({})", caller.id, event.id, event.title);
        Ok(event)
    }

    pub async fn update(&self, caller: Caller, id: Uuid, payload: UpdateEvent) -> AppResult<Event> {
        require(caller, Role::Organizer)?;

        let repo = EventRepository::new(&self.pool);
        let mut event = self.owned_event(&repo, caller, id).await?;

        event.apply_update(payload).map_err(AppError::Validation)?;
        repo.update(&event).await?;

        info!("Updated event {}", event.id);
        Ok(event)
    }

    pub async fn delete(&self, caller: Caller, id: Uuid) -> AppResult<()> {
        require(caller, Role::Organizer)?;

        let repo = EventRepository::new(&self.pool);
        let event = self.owned_event(&repo, caller, id).await?;

        if !repo.delete_unbooked(event.id).await? {
            if repo.has_bookings(event.id).await? {
                return Err(AppError::Conflict(
                    "Events with bookings cannot be deleted".to_string(),
                ));
            }
            return Err(AppError::NotFound("Event"));
        }

        info!("Deleted event {}", event.id);
        Ok(())
    }

    pub async fn approve(&self, caller: Caller, id: Uuid) -> AppResult<Event> {
        require(caller, Role::Admin)?;

        let repo = EventRepository::new(&self.pool);
        match repo.approve(id).await? {
            Some(event) => {
                info!("Admin {} approved event {}", caller.id, event.id);
                Ok(event)
            }
            None if repo.find_by_id(id).await?.is_some() => Err(AppError::Conflict(
                "Event is already approved".to_string(),
            )),
            None => Err(AppError::NotFound("Event")),
        }
    }

    /// Rejection removes a pending event. Approved events are left alone.
    pub async fn reject(&self, caller: Caller, id: Uuid) -> AppResult<()> {
        require(caller, Role::Admin)?;

        let repo = EventRepository::new(&self.pool);
        if repo.delete_pending(id).await? {
            info!("Admin {} rejected event {}", caller.id, id);
            return Ok(());
        }

        match repo.find_by_id(id).await? {
            Some(_) => Err(AppError::Conflict(
                "Only pending events can be rejected".to_string(),
            )),
            None => Err(AppError::NotFound("Event")),
        }
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Event> {
        EventRepository::new(&self.pool)
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Event"))
    }

    pub async fn mine(&self, caller: Caller) -> AppResult<Vec<Event>> {
        require(caller, Role::Organizer)?;
        Ok(EventRepository::new(&self.pool)
            .list_by_organizer(caller.id)
            .await?)
    }

    pub async fn pending(&self, caller: Caller) -> AppResult<Vec<Event>> {
        require(caller, Role::Admin)?;
        Ok(EventRepository::new(&self.pool).list_pending().await?)
    }

    pub async fn all(&self, caller: Caller) -> AppResult<Vec<Event>> {
        require(caller, Role::Admin)?;
        Ok(EventRepository::new(&self.pool).list_all().await?)
    }

    pub async fn approved(&self) -> AppResult<Vec<Event>> {
        Ok(EventRepository::new(&self.pool).list_approved().await?)
    }

    pub async fn by_category(&self, category: &str) -> AppResult<Vec<Event>> {
        let category: EventCategory = category.parse().map_err(AppError::Validation)?;
        Ok(EventRepository::new(&self.pool)
            .list_approved_by_category(category)
            .await?)
    }

    pub async fn past(&self) -> AppResult<Vec<Event>> {
        let today = Utc::now().date_naive();
        Ok(EventRepository::new(&self.pool)
            .list_approved_before(today)
            .await?)
    }

    async fn owned_event(
        &self,
        repo: &EventRepository<'_>,
        caller: Caller,
        id: Uuid,
    ) -> AppResult<Event> {
        let event = repo.find_by_id(id).await?.ok_or(AppError::NotFound("Event"))?;
        if !event.is_owned_by(caller.id) {
            return Err(AppError::forbidden("You can only manage your own events"));
        }
        Ok(event)
    }
}

fn require(caller: Caller, role: Role) -> AppResult<()> {
    if caller.is(role) {
        return Ok(());
    }
    let message = match role {
        Role::Admin => "Forbidden: Insufficient Permissions!",
        Role::Organizer => "Forbidden: Only organizers can perform this action!",
        Role::Attendee => "Forbidden: Only attendees can perform this action!",
    };
    Err(AppError::forbidden(message))
}
