use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{auth, bookings, flights, hotels};
use crate::middleware::auth::auth_middleware;
use crate::middleware::rate_limit::create_public_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // IP-based governor for unauthenticated routes
    let public_governor = create_public_governor();

    // Public routes (rate limited per IP)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone());

    // Public search routes
    let public_routes = Router::new()
        .route("/flights", get(flights::search_flights))
        .route("/flights/{id}", get(flights::get_flight))
        .route("/hotels", get(hotels::search_hotels))
        .layer(public_governor);

    // Flight booking (requires auth)
    let flight_routes = Router::new()
        .route("/flights", post(flights::create_flight_booking))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Hotel management and hotel bookings (requires auth; ownership is
    // checked per hotel inside the handlers)
    let hotel_routes = Router::new()
        .route("/hotels", post(hotels::create_hotel))
        .route("/hotels/{hotel_id}/room-types", post(hotels::create_room_type))
        .route("/hotels/{hotel_id}/availability", get(hotels::hotel_availability))
        .route("/hotels/{hotel_id}/bookings", get(hotels::list_hotel_bookings))
        .route("/hotels/{hotel_id}/bookings", post(hotels::create_hotel_booking))
        .route(
            "/hotels/{hotel_id}/room-types/{room_type_id}/inventory",
            post(hotels::add_rooms),
        )
        .route(
            "/hotels/{hotel_id}/room-types/{room_type_id}/inventory",
            patch(hotels::remove_rooms),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Composite itinerary checkout and booking management (requires auth)
    let booking_routes = Router::new()
        .route("/", post(bookings::create_itinerary))
        .route("/", get(bookings::my_bookings))
        .route("/{id}", delete(bookings::cancel_booking))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes.merge(flight_routes).merge(hotel_routes))
        .nest("/api/bookings", booking_routes)
        .with_state(state)
}
