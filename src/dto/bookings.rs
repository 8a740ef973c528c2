use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Booking, Event};

/// Body of `POST /bookings`, sent once the checkout reported a payment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct CreateBookingRequest {
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub total_amount: i64,
    pub payment_method: String,
    pub payment_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingWithEvent {
    #[serde(flatten)]
    pub booking: Booking,
    pub event: Option<Event>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BookingList {
    #[schema(value_type = Vec<Booking>)]
    pub items: Vec<Booking>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BookingWithEventList {
    #[schema(value_type = Vec<BookingWithEvent>)]
    pub items: Vec<BookingWithEvent>,
}
