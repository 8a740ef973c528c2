use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod doc;
pub mod events;
pub mod favorites;
pub mod health;
pub mod organizer;
pub mod params;
pub mod users;
pub mod venues;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/Auth", auth::router())
        .nest("/Events", events::router())
        .nest("/bookings", bookings::router())
        .nest("/users", users::router())
        .nest("/Venues", venues::router())
        .nest("/favorites", favorites::router())
        .nest("/organizer", organizer::router())
        .nest("/admin", admin::router())
}
