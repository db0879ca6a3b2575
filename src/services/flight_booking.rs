use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::afs::FlightsApi;
use crate::entities::booking::{self, BookingStatus};
use crate::entities::user;
use crate::error::{AppError, AppResult};

/// Validate a flight id against the remote flight system and record a local
/// PENDING booking referencing it. The price is read from the remote
/// response at booking time; the passport number is recorded as-is.
pub async fn create_flight_booking(
    db: &DatabaseConnection,
    afs: &dyn FlightsApi,
    user_id: Uuid,
    flight_id: &str,
    passport_number: &str,
) -> AppResult<booking::Model> {
    if flight_id.is_empty() {
        return Err(AppError::BadRequest("Flight Id is invalid".to_string()));
    }
    if passport_number.is_empty() {
        return Err(AppError::BadRequest("Passport number is required".to_string()));
    }

    let flight = afs
        .get_flight_by_id(flight_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        status: Set(BookingStatus::Pending),
        price: Set(flight.price),
        hotel_id: Set(None),
        room_type_id: Set(None),
        check_in: Set(None),
        check_out: Set(None),
        flight_id: Set(Some(flight_id.to_string())),
        passport_number: Set(Some(passport_number.to_string())),
        itinerary_id: Set(None),
        ..Default::default()
    };

    Ok(new_booking.insert(db).await?)
}
