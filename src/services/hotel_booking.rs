use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::{room_type, user};
use crate::error::{AppError, AppResult};
use crate::services::availability;

pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Validate and persist a single hotel-room reservation. The booking is
/// created PENDING at a price derived from the room type's nightly rate; no
/// counter is decremented, availability stays derived from overlap counts.
pub async fn create_hotel_booking(
    db: &DatabaseConnection,
    user_id: Uuid,
    hotel_id: Uuid,
    room_type_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> AppResult<booking::Model> {
    if check_in >= check_out {
        return Err(AppError::BadRequest(
            "Check-in date must be before check-out date".to_string(),
        ));
    }

    let room_type = room_type::Entity::find_by_id(room_type_id)
        .one(db)
        .await?
        .filter(|rt| rt.hotel_id == hotel_id)
        .ok_or_else(|| {
            AppError::NotFound(
                "Room type does not exist or does not belong to the hotel".to_string(),
            )
        })?;

    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let available = availability::available_rooms(db, &room_type, check_in, check_out).await?;
    if available < 1 {
        return Err(AppError::InsufficientInventory(
            "No available rooms for the selected dates".to_string(),
        ));
    }

    let price = room_type.price_per_night * nights(check_in, check_out) as f64;

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        status: Set(BookingStatus::Pending),
        price: Set(price),
        hotel_id: Set(Some(hotel_id)),
        room_type_id: Set(Some(room_type_id)),
        check_in: Set(Some(check_in)),
        check_out: Set(Some(check_out)),
        flight_id: Set(None),
        passport_number: Set(None),
        itinerary_id: Set(None),
        ..Default::default()
    };

    Ok(new_booking.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn fixed_time() -> sea_orm::prelude::DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into()
    }

    fn room_type_model(hotel_id: Uuid, rooms: i32, price_per_night: f64) -> room_type::Model {
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

    fn user_model(id: Uuid) -> user::Model {
        user::Model {
            id,
            email: "guest@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: "Guest".to_string(),
            phone: None,
            created_at: fixed_time(),
        }
    }

    fn existing_booking(room_type_id: Uuid, check_in: &str, check_out: &str) -> booking::Model {
        booking::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: BookingStatus::Pending,
            price: 100.0,
            hotel_id: Some(Uuid::new_v4()),
            room_type_id: Some(room_type_id),
            check_in: Some(date(check_in)),
            check_out: Some(date(check_out)),
            flight_id: None,
            passport_number: None,
            itinerary_id: None,
            created_at: fixed_time(),
        }
    }

    #[test]
    fn test_nights() {
        assert_eq!(nights(date("2024-07-01"), date("2024-07-04")), 3);
        assert_eq!(nights(date("2024-07-01"), date("2024-07-02")), 1);
    }

    #[tokio::test]
    async fn test_price_is_rate_times_nights() {
        let user_id = Uuid::new_v4();
        let hotel_id = Uuid::new_v4();
        let room_type = room_type_model(hotel_id, 5, 100.0);
        let room_type_id = room_type.id;

        let inserted = booking::Model {
            price: 300.0,
            ..existing_booking(room_type_id, "2024-07-01", "2024-07-04")
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![room_type]])
            .append_query_results([vec![user_model(user_id)]])
            .append_query_results([Vec::<booking::Model>::new()])
            .append_query_results([vec![inserted]])
            .into_connection();

        let booking = create_hotel_booking(
            &db,
            user_id,
            hotel_id,
            room_type_id,
            date("2024-07-01"),
            date("2024-07-04"),
        )
        .await
        .unwrap();

        assert_eq!(booking.price, 300.0);
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_fully_booked_range_is_rejected() {
        let user_id = Uuid::new_v4();
        let hotel_id = Uuid::new_v4();
        let room_type = room_type_model(hotel_id, 2, 100.0);
        let room_type_id = room_type.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![room_type]])
            .append_query_results([vec![user_model(user_id)]])
            .append_query_results([vec![
                existing_booking(room_type_id, "2024-06-01", "2024-06-03"),
                existing_booking(room_type_id, "2024-06-01", "2024-06-03"),
            ]])
            .into_connection();

        let err = create_hotel_booking(
            &db,
            user_id,
            hotel_id,
            room_type_id,
            date("2024-06-02"),
            date("2024-06-04"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::InsufficientInventory(_)));
    }

    #[tokio::test]
    async fn test_room_type_must_belong_to_hotel() {
        let room_type = room_type_model(Uuid::new_v4(), 2, 100.0);
        let room_type_id = room_type.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![room_type]])
            .into_connection();

        let err = create_hotel_booking(
            &db,
            Uuid::new_v4(),
            Uuid::new_v4(), // different hotel
            room_type_id,
            date("2024-06-01"),
            date("2024-06-03"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_inverted_dates_are_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = create_hotel_booking(
            &db,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            date("2024-06-04"),
            date("2024-06-02"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
