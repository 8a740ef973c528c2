pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod events;
pub mod favorites;
pub mod users;
pub mod venues;
