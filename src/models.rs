use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Client,
    Organizer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Organizer => "organizer",
            Role::Admin => "admin",
        }
    }

    /// Unknown values fall back to the least privileged role.
    pub fn from_db(s: &str) -> Self {
        match s {
            "organizer" => Role::Organizer,
            "admin" => Role::Admin,
            _ => Role::Client,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "approved" => EventStatus::Approved,
            "rejected" => EventStatus::Rejected,
            "cancelled" => EventStatus::Cancelled,
            _ => EventStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Confirmed,
        }
    }
}

/// Highest ticket price an event may carry, in rupees. Keeps every
/// `price × quantity × 100` amount inside `i64`.
pub const MAX_TICKET_PRICE: i64 = 10_000_000;

pub const EVENT_CATEGORIES: [&str; 10] = [
    "Technology",
    "Music",
    "Art",
    "Food",
    "Business",
    "Sports",
    "Education",
    "Entertainment",
    "Health",
    "Travel",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub venue_id: Option<Uuid>,
    pub price: i64,
    pub capacity: i32,
    pub booked: i32,
    /// `capacity - booked`, never negative.
    pub available_tickets: i32,
    pub organizer_id: Uuid,
    pub status: EventStatus,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn availability(capacity: i32, booked: i32) -> i32 {
        (capacity - booked).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub total_amount: i64,
    pub payment_method: String,
    pub payment_id: String,
    pub ticket_number: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Venue {
    pub id: Uuid,
    pub venue_name: String,
    pub location: String,
    pub capacity: i32,
    pub is_available: bool,
    pub google_maps_url: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Favorite {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::users::Model> for User {
    fn from(model: crate::entity::users::Model) -> Self {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            role: Role::from_db(&model.role),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<crate::entity::events::Model> for Event {
    fn from(model: crate::entity::events::Model) -> Self {
        Event {
            id: model.id,
            title: model.title,
            description: model.description,
            category: model.category,
            event_date: model.event_date.with_timezone(&Utc),
            location: model.location,
            venue_id: model.venue_id,
            price: model.price,
            capacity: model.capacity,
            booked: model.booked,
            available_tickets: Event::availability(model.capacity, model.booked),
            organizer_id: model.organizer_id,
            status: EventStatus::from_db(&model.status),
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<crate::entity::bookings::Model> for Booking {
    fn from(model: crate::entity::bookings::Model) -> Self {
        Booking {
            id: model.id,
            user_id: model.user_id,
            event_id: model.event_id,
            quantity: model.quantity,
            total_amount: model.total_amount,
            payment_method: model.payment_method,
            payment_id: model.payment_id,
            ticket_number: model.ticket_number,
            status: BookingStatus::from_db(&model.status),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<crate::entity::venues::Model> for Venue {
    fn from(model: crate::entity::venues::Model) -> Self {
        Venue {
            id: model.id,
            venue_name: model.venue_name,
            location: model.location,
            capacity: model.capacity,
            is_available: model.is_available,
            google_maps_url: model.google_maps_url,
            address: model.address,
            city: model.city,
            state: model.state,
            country: model.country,
            postal_code: model.postal_code,
            contact_phone: model.contact_phone,
            contact_email: model.contact_email,
            description: model.description,
            amenities: model.amenities,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<crate::entity::favorites::Model> for Favorite {
    fn from(model: crate::entity::favorites::Model) -> Self {
        Favorite {
            id: model.id,
            event_id: model.event_id,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
