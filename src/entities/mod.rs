pub mod airport;
pub mod booking;
pub mod hotel;
pub mod itinerary;
pub mod room_type;
pub mod user;
