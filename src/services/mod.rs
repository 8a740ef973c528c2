pub mod admin_service;
pub mod auth_service;
pub mod booking_service;
pub mod event_service;
pub mod favorite_service;
pub mod user_service;
pub mod venue_service;
