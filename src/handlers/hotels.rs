use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{booking, hotel, room_type};
use crate::error::{AppError, AppResult};
use crate::services::{availability, hotel_booking};
use crate::utils::jwt::Claims;
use crate::AppState;

fn parse_date(value: &str, label: &str) -> AppResult<NaiveDate> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{} is invalid", label)))
}

/// Load the hotel and reject callers who do not own it.
async fn require_hotel_owner(
    db: &DatabaseConnection,
    hotel_id: Uuid,
    user_id: Uuid,
) -> AppResult<hotel::Model> {
    let hotel = hotel::Entity::find_by_id(hotel_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hotel does not exist".to_string()))?;

    if hotel.owner_id != user_id {
        return Err(AppError::Forbidden(
            "Only the hotel owner can perform this action".to_string(),
        ));
    }

    Ok(hotel)
}

// ============ Hotel Search ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchQuery {
    pub city: Option<String>,
    pub name: Option<String>,
    pub star_rating: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub address: String,
    pub rating: i32,
    pub logo: Option<String>,
    pub starting_price: Option<f64>,
}

/// Apply the search filters: city/name are case-insensitive substring
/// matches, rating is exact, and price bounds run against the cheapest
/// in-stock room type. A hotel with no in-stock room type has no price and
/// is excluded whenever a price bound is given.
fn summarize_hotels(
    hotels: Vec<hotel::Model>,
    room_types: &[room_type::Model],
    query: &HotelSearchQuery,
) -> Vec<HotelSummary> {
    let city = query.city.as_deref().map(str::to_lowercase);
    let name = query.name.as_deref().map(str::to_lowercase);

    let mut results = Vec::new();
    for h in hotels {
        if let Some(city) = &city {
            if !h.location.to_lowercase().contains(city) {
                continue;
            }
        }
        if let Some(name) = &name {
            if !h.name.to_lowercase().contains(name) {
                continue;
            }
        }
        if let Some(rating) = query.star_rating {
            if h.rating != rating {
                continue;
            }
        }

        // Cheapest nightly rate among room types that still have rooms
        let starting_price = room_types
            .iter()
            .filter(|rt| rt.hotel_id == h.id && rt.rooms > 0)
            .map(|rt| rt.price_per_night)
            .fold(None::<f64>, |min, p| Some(min.map_or(p, |m| m.min(p))));

        if query.min_price.is_some() || query.max_price.is_some() {
            let Some(price) = starting_price else {
                continue;
            };
            if query.min_price.is_some_and(|min| price < min) {
                continue;
            }
            if query.max_price.is_some_and(|max| price > max) {
                continue;
            }
        }

        results.push(HotelSummary {
            id: h.id,
            name: h.name,
            location: h.location,
            address: h.address,
            rating: h.rating,
            logo: h.logo,
            starting_price,
        });
    }

    results
}

/// Search hotels by city/name (case-insensitive), rating and price range
pub async fn search_hotels(
    State(state): State<AppState>,
    Query(query): Query<HotelSearchQuery>,
) -> AppResult<Json<Vec<HotelSummary>>> {
    let hotels = hotel::Entity::find().all(&*state.db).await?;
    let room_types = room_type::Entity::find().all(&*state.db).await?;

    Ok(Json(summarize_hotels(hotels, &room_types, &query)))
}

// ============ Hotel & Room Type Management ============

#[derive(Debug, Deserialize)]
pub struct CreateHotelRequest {
    pub name: String,
    pub address: String,
    pub location: String,
    pub rating: i32,
    pub logo: Option<String>,
}

/// Create a hotel owned by the authenticated user
pub async fn create_hotel(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateHotelRequest>,
) -> AppResult<(StatusCode, Json<hotel::Model>)> {
    if payload.name.is_empty() || payload.address.is_empty() || payload.location.is_empty() {
        return Err(AppError::BadRequest(
            "Name, address and location are required".to_string(),
        ));
    }
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    let new_hotel = hotel::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(claims.sub),
        name: Set(payload.name),
        address: Set(payload.address),
        location: Set(payload.location),
        rating: Set(payload.rating),
        logo: Set(payload.logo),
        ..Default::default()
    };

    let hotel = new_hotel.insert(&*state.db).await?;
    Ok((StatusCode::CREATED, Json(hotel)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomTypeRequest {
    pub name: String,
    pub price_per_night: f64,
    pub rooms: i32,
    pub amenities: Option<String>,
}

/// Create a room type for an owned hotel
pub async fn create_room_type(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(hotel_id): Path<Uuid>,
    Json(payload): Json<CreateRoomTypeRequest>,
) -> AppResult<(StatusCode, Json<room_type::Model>)> {
    require_hotel_owner(&*state.db, hotel_id, claims.sub).await?;

    if payload.name.is_empty() {
        return Err(AppError::BadRequest("Room type name is required".to_string()));
    }
    if payload.price_per_night < 0.0 {
        return Err(AppError::BadRequest(
            "Price per night must not be negative".to_string(),
        ));
    }
    if payload.rooms < 0 {
        return Err(AppError::BadRequest(
            "Room count must not be negative".to_string(),
        ));
    }

    let existing = room_type::Entity::find()
        .filter(room_type::Column::HotelId.eq(hotel_id))
        .filter(room_type::Column::Name.eq(&payload.name))
        .one(&*state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "A room type with this name already exists".to_string(),
        ));
    }

    let new_room_type = room_type::ActiveModel {
        id: Set(Uuid::new_v4()),
        hotel_id: Set(hotel_id),
        name: Set(payload.name),
        price_per_night: Set(payload.price_per_night),
        rooms: Set(payload.rooms),
        amenities: Set(payload.amenities),
        ..Default::default()
    };

    let room_type = new_room_type.insert(&*state.db).await?;
    Ok((StatusCode::CREATED, Json(room_type)))
}

// ============ Availability ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub start_date: String,
    pub end_date: String,
    pub room_type_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeAvailability {
    pub room_type: String,
    pub available_rooms: i32,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub availability: Vec<RoomTypeAvailability>,
}

/// Report free rooms per room type over a date range (owner only)
pub async fn hotel_availability(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(hotel_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    require_hotel_owner(&*state.db, hotel_id, claims.sub).await?;

    let start_date = parse_date(&query.start_date, "Start date")?;
    let end_date = parse_date(&query.end_date, "End date")?;
    if start_date >= end_date {
        return Err(AppError::BadRequest(
            "Start date must be before end date".to_string(),
        ));
    }

    let mut finder = room_type::Entity::find().filter(room_type::Column::HotelId.eq(hotel_id));
    if let Some(room_type_id) = query.room_type_id {
        finder = finder.filter(room_type::Column::Id.eq(room_type_id));
    }
    let room_types = finder.all(&*state.db).await?;

    if query.room_type_id.is_some() && room_types.is_empty() {
        return Err(AppError::NotFound("Room type does not exist".to_string()));
    }

    let mut availability = Vec::new();
    for rt in &room_types {
        let available_rooms =
            availability::available_rooms(&*state.db, rt, start_date, end_date).await?;
        availability.push(RoomTypeAvailability {
            room_type: rt.name.clone(),
            available_rooms,
        });
    }

    Ok(Json(AvailabilityResponse { availability }))
}

// ============ Hotel Bookings ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelBookingsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub room_type_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct HotelBookingsResponse {
    pub bookings: Vec<booking::Model>,
}

/// List bookings for an owned hotel, optionally filtered by date range and
/// room type
pub async fn list_hotel_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(hotel_id): Path<Uuid>,
    Query(query): Query<HotelBookingsQuery>,
) -> AppResult<Json<HotelBookingsResponse>> {
    require_hotel_owner(&*state.db, hotel_id, claims.sub).await?;

    let mut finder = booking::Entity::find().filter(booking::Column::HotelId.eq(hotel_id));

    if query.start_date.is_some() || query.end_date.is_some() {
        let start_date = match &query.start_date {
            Some(value) => parse_date(value, "Start date")?,
            None => NaiveDate::MIN,
        };
        let end_date = match &query.end_date {
            Some(value) => parse_date(value, "End date")?,
            None => NaiveDate::MAX,
        };
        if start_date > end_date {
            return Err(AppError::BadRequest(
                "Start date is after end date".to_string(),
            ));
        }
        finder = finder
            .filter(booking::Column::CheckIn.lte(end_date))
            .filter(booking::Column::CheckOut.gte(start_date));
    }

    if let Some(room_type_id) = query.room_type_id {
        finder = finder.filter(booking::Column::RoomTypeId.eq(room_type_id));
    }

    let bookings = finder.all(&*state.db).await?;
    Ok(Json(HotelBookingsResponse { bookings }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHotelBookingRequest {
    pub room_type_id: Uuid,
    pub check_in: String,
    pub check_out: String,
}

#[derive(Debug, Serialize)]
pub struct HotelBookingResponse {
    pub booking: booking::Model,
}

/// Book a room at a hotel
pub async fn create_hotel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(hotel_id): Path<Uuid>,
    Json(payload): Json<CreateHotelBookingRequest>,
) -> AppResult<(StatusCode, Json<HotelBookingResponse>)> {
    let check_in = parse_date(&payload.check_in, "Check-in date")?;
    let check_out = parse_date(&payload.check_out, "Check-out date")?;

    let booking = hotel_booking::create_hotel_booking(
        &*state.db,
        claims.sub,
        hotel_id,
        payload.room_type_id,
        check_in,
        check_out,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(HotelBookingResponse { booking })))
}

// ============ Inventory ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoomsRequest {
    pub rooms_to_add: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRoomsRequest {
    pub remove_count: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    pub message: String,
    pub new_inventory: i32,
    pub cancelled_booking_ids: Vec<Uuid>,
}

async fn owned_room_type(
    db: &DatabaseConnection,
    hotel_id: Uuid,
    room_type_id: Uuid,
    user_id: Uuid,
) -> AppResult<room_type::Model> {
    require_hotel_owner(db, hotel_id, user_id).await?;

    let room_type = room_type::Entity::find_by_id(room_type_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Room type does not exist".to_string()))?;

    if room_type.hotel_id != hotel_id {
        return Err(AppError::BadRequest(
            "Room type does not belong to this hotel".to_string(),
        ));
    }

    Ok(room_type)
}

/// Add rooms to a room type's inventory
pub async fn add_rooms(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((hotel_id, room_type_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AddRoomsRequest>,
) -> AppResult<(StatusCode, Json<InventoryResponse>)> {
    if payload.rooms_to_add <= 0 {
        return Err(AppError::BadRequest(
            "Rooms to add must be a positive number".to_string(),
        ));
    }

    let room_type = owned_room_type(&*state.db, hotel_id, room_type_id, claims.sub).await?;
    let outcome = availability::resize_inventory(&*state.db, room_type, payload.rooms_to_add).await?;

    Ok((
        StatusCode::CREATED,
        Json(InventoryResponse {
            message: "Rooms added successfully".to_string(),
            new_inventory: outcome.new_inventory,
            cancelled_booking_ids: outcome.cancelled_booking_ids,
        }),
    ))
}

/// Remove rooms from a room type's inventory, cancelling excess future
/// bookings when committed demand no longer fits
pub async fn remove_rooms(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((hotel_id, room_type_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RemoveRoomsRequest>,
) -> AppResult<Json<InventoryResponse>> {
    if payload.remove_count <= 0 {
        return Err(AppError::BadRequest(
            "Remove count must be a positive number".to_string(),
        ));
    }

    let room_type = owned_room_type(&*state.db, hotel_id, room_type_id, claims.sub).await?;
    let outcome =
        availability::resize_inventory(&*state.db, room_type, -payload.remove_count).await?;

    Ok(Json(InventoryResponse {
        message: "Room availability successfully changed".to_string(),
        new_inventory: outcome.new_inventory,
        cancelled_booking_ids: outcome.cancelled_booking_ids,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn fixed_time() -> sea_orm::prelude::DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into()
    }

    fn hotel_model(name: &str, location: &str, rating: i32) -> hotel::Model {
        hotel::Model {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: name.to_string(),
            address: "1 Main St".to_string(),
            location: location.to_string(),
            rating,
            logo: None,
            created_at: fixed_time(),
        }
    }

    fn room_type_model(hotel_id: Uuid, price_per_night: f64, rooms: i32) -> room_type::Model {
        room_type::Model {
            id: Uuid::new_v4(),
            hotel_id,
            name: "Standard".to_string(),
            price_per_night,
            rooms,
            amenities: None,
            created_at: fixed_time(),
        }
    }

    fn query() -> HotelSearchQuery {
        HotelSearchQuery {
            city: None,
            name: None,
            star_rating: None,
            min_price: None,
            max_price: None,
        }
    }

    #[test]
    fn test_city_filter_ignores_case() {
        let hotels = vec![
            hotel_model("Grand Luxe", "Paris", 5),
            hotel_model("Harbour View", "Toronto", 4),
        ];

        let mut q = query();
        q.city = Some("paris".to_string());
        let results = summarize_hotels(hotels.clone(), &[], &q);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Grand Luxe");

        let mut q = query();
        q.city = Some("TORONTO".to_string());
        let results = summarize_hotels(hotels, &[], &q);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Harbour View");
    }

    #[test]
    fn test_name_filter_matches_substring_ignoring_case() {
        let hotels = vec![
            hotel_model("Grand Luxe", "Paris", 5),
            hotel_model("Harbour View", "Toronto", 4),
        ];

        let mut q = query();
        q.name = Some("luxe".to_string());
        let results = summarize_hotels(hotels, &[], &q);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Grand Luxe");
    }

    #[test]
    fn test_starting_price_is_cheapest_in_stock_rate() {
        let h = hotel_model("Grand Luxe", "Paris", 5);
        let room_types = vec![
            room_type_model(h.id, 80.0, 0), // sold out, ignored
            room_type_model(h.id, 120.0, 3),
            room_type_model(h.id, 200.0, 1),
        ];

        let results = summarize_hotels(vec![h], &room_types, &query());
        assert_eq!(results[0].starting_price, Some(120.0));
    }

    #[test]
    fn test_price_bounds_exclude_hotels_without_stock() {
        let priced = hotel_model("Grand Luxe", "Paris", 5);
        let unpriced = hotel_model("Empty Inn", "Paris", 3);
        let room_types = vec![room_type_model(priced.id, 120.0, 3)];

        let mut q = query();
        q.max_price = Some(500.0);
        let results = summarize_hotels(vec![priced, unpriced], &room_types, &q);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Grand Luxe");
    }

    #[test]
    fn test_price_bounds_apply_to_starting_price() {
        let h = hotel_model("Grand Luxe", "Paris", 5);
        let room_types = vec![room_type_model(h.id, 120.0, 3)];

        let mut q = query();
        q.min_price = Some(150.0);
        assert!(summarize_hotels(vec![h.clone()], &room_types, &q).is_empty());

        let mut q = query();
        q.min_price = Some(100.0);
        q.max_price = Some(150.0);
        let results = summarize_hotels(vec![h], &room_types, &q);
        assert_eq!(results.len(), 1);
    }
}
