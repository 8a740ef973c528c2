use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Venue;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VenueRequest {
    pub venue_name: String,
    pub location: String,
    pub capacity: i32,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub google_maps_url: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<String>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct VenueList {
    #[schema(value_type = Vec<Venue>)]
    pub items: Vec<Venue>,
}
