pub mod auth;
pub mod bookings;
pub mod destinations;
pub mod extract;
pub mod health;
pub mod roles;
pub mod users;
