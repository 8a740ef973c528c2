use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Event, EventStatus};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub venue_id: Option<Uuid>,
    pub price: i64,
    pub capacity: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub venue_id: Option<Uuid>,
    pub price: Option<i64>,
    pub capacity: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateEventStatusRequest {
    pub status: EventStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EventList {
    #[schema(value_type = Vec<Event>)]
    pub items: Vec<Event>,
}
