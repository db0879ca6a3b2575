pub mod auth;
pub mod bookings;
pub mod flights;
pub mod hotels;
