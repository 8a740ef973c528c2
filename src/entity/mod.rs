pub mod audit_logs;
pub mod bookings;
pub mod events;
pub mod favorites;
pub mod users;
pub mod venues;

pub use audit_logs::Entity as AuditLogs;
pub use bookings::Entity as Bookings;
pub use events::Entity as Events;
pub use favorites::Entity as Favorites;
pub use users::Entity as Users;
pub use venues::Entity as Venues;
