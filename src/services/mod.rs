pub mod availability;
pub mod flight_booking;
pub mod flight_plans;
pub mod hotel_booking;
pub mod itinerary;
