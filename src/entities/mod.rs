pub mod booking;
pub mod destination;
pub mod role;
pub mod user;
pub mod user_role;
