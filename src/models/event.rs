use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use uuid::Uuid;

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200?text=No+Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Festival,
    Theatre,
    Concerts,
    Arts,
    Health,
    Gaming,
    TechAndInnovation,
    Business,
    Sports,
    FoodAndDrink,
    Comedy,
    BookFairs,
    FilmAndMedia,
}

impl EventCategory {
    pub const ALL: [EventCategory; 13] = [
        EventCategory::Festival,
        EventCategory::Theatre,
        EventCategory::Concerts,
        EventCategory::Arts,
        EventCategory::Health,
        EventCategory::Gaming,
        EventCategory::TechAndInnovation,
        EventCategory::Business,
        EventCategory::Sports,
        EventCategory::FoodAndDrink,
        EventCategory::Comedy,
        EventCategory::BookFairs,
        EventCategory::FilmAndMedia,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Festival => "Festival",
            EventCategory::Theatre => "Theatre",
            EventCategory::Concerts => "Concerts",
            EventCategory::Arts => "Arts",
            EventCategory::Health => "Health",
            EventCategory::Gaming => "Gaming",
            EventCategory::TechAndInnovation => "Tech & Innovation",
            EventCategory::Business => "Business",
            EventCategory::Sports => "Sports",
            EventCategory::FoodAndDrink => "Food & Drink",
            EventCategory::Comedy => "Comedy",
            EventCategory::BookFairs => "Book Fairs",
            EventCategory::FilmAndMedia => "Film & Media",
        }
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EventCategory::ALL
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| format!("Unknown event category '{}'", wanted))
    }
}

impl TryFrom<String> for EventCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for EventCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for EventCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,

    pub title: String,

    pub date: NaiveDate,

    pub location: String,

    pub description: Option<String>,

    /// Minor currency units.
    pub ticket_price: i64,

    pub category: EventCategory,

    pub organizer_id: Uuid,

    pub approved: bool,

    pub image_url: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for Event {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let category: String = row.try_get("category")?;
        let category = category.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
            index: "category".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            date: row.try_get("event_date")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
            ticket_price: row.try_get("ticket_price")?,
            category,
            organizer_id: row.try_get("organizer_id")?,
            approved: row.try_get("approved")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub description: Option<String>,
    pub ticket_price: i64,
    pub category: EventCategory,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub ticket_price: Option<i64>,
    pub category: Option<EventCategory>,
    pub image_url: Option<String>,
}

impl Event {
    pub fn new(organizer_id: Uuid, create: CreateEvent) -> Result<Self, String> {
        validate_title(&create.title)?;
        validate_location(&create.location)?;
        validate_price(create.ticket_price)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: create.title.trim().to_string(),
            date: create.date,
            location: create.location.trim().to_string(),
            description: create.description,
            ticket_price: create.ticket_price,
            category: create.category,
            organizer_id,
            approved: false,
            image_url: normalize_image_ref(create.image_url.as_deref()),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_update(&mut self, update: UpdateEvent) -> Result<(), String> {
        if let Some(title) = update.title {
            validate_title(&title)?;
            self.title = title.trim().to_string();
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(location) = update.location {
            validate_location(&location)?;
            self.location = location.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.ticket_price {
            validate_price(price)?;
            self.ticket_price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(image) = update.image_url {
            self.image_url = normalize_image_ref(Some(&image));
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.organizer_id == account_id
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Event title is required".to_string());
    }
    Ok(())
}

fn validate_location(location: &str) -> Result<(), String> {
    if location.trim().is_empty() {
        return Err("Event location is required".to_string());
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), String> {
    if price < 0 {
        return Err("Ticket price cannot be negative".to_string());
    }
    Ok(())
}

/// Absolute URLs are kept, relative upload paths are rooted under `/uploads/`.
pub fn normalize_image_ref(image: Option<&str>) -> String {
    let Some(image) = image.map(str::trim).filter(|s| !s.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }

    let fixed = image.replace('\\', "/");
    let relative = fixed.trim_start_matches('/');
    let relative = relative.strip_prefix("uploads/").unwrap_or(relative);
    format!("/uploads/{}", relative)
}
