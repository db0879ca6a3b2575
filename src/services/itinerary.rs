//! Composite checkout: books every hotel room and flight in the cart, then
//! commits one itinerary linking them, all-or-nothing. Sub-bookings run
//! outside the final transaction because flight booking crosses the network;
//! on any sub-booking failure the pending bookings created so far are
//! deleted before the error is reported.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::afs::FlightsApi;
use crate::entities::booking::{self, BookingStatus};
use crate::entities::{itinerary, room_type, user};
use crate::error::{AppError, AppResult};
use crate::services::{flight_booking, hotel_booking};
use crate::utils::card::{is_valid_card_number, is_valid_cvv, is_valid_expiry};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

#[derive(Debug, Clone)]
pub struct ItineraryRequest {
    pub room_type_ids: Vec<Uuid>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub flight_ids: Vec<String>,
    pub passport_number: String,
    pub payment_info: PaymentInfo,
}

#[derive(Debug, Serialize)]
pub struct ItineraryDetails {
    #[serde(flatten)]
    pub itinerary: itinerary::Model,
    pub bookings: Vec<booking::Model>,
    pub user: user::Model,
}

/// Boundary validation for the composite request. Dates are required when
/// the cart holds hotel items, the passport when it holds flights; payment
/// info is format-checked up front since no settlement happens later.
pub fn validate_request(request: &ItineraryRequest) -> AppResult<()> {
    if request.room_type_ids.is_empty() && request.flight_ids.is_empty() {
        return Err(AppError::BadRequest(
            "Missing or invalid booking details".to_string(),
        ));
    }

    if !request.room_type_ids.is_empty() {
        match (request.check_in, request.check_out) {
            (Some(check_in), Some(check_out)) if check_in < check_out => {}
            (Some(_), Some(_)) => {
                return Err(AppError::BadRequest(
                    "Check-in date must be before check-out date".to_string(),
                ));
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Check-in and check-out dates are required".to_string(),
                ));
            }
        }
    }

    if !request.flight_ids.is_empty() && request.passport_number.is_empty() {
        return Err(AppError::BadRequest(
            "Passport number is required".to_string(),
        ));
    }

    let payment = &request.payment_info;
    if !is_valid_card_number(&payment.card_number)
        || !is_valid_expiry(&payment.expiry)
        || !is_valid_cvv(&payment.cvv)
    {
        return Err(AppError::BadRequest("Invalid payment Info".to_string()));
    }

    Ok(())
}

/// Delete the PENDING bookings created earlier in a failed composite
/// request. Best effort: a cleanup failure is logged, the original error
/// still reaches the caller.
async fn rollback_pending(db: &DatabaseConnection, created: &[booking::Model]) {
    if created.is_empty() {
        return;
    }

    let ids: Vec<Uuid> = created.iter().map(|b| b.id).collect();
    if let Err(err) = booking::Entity::delete_many()
        .filter(booking::Column::Id.is_in(ids))
        .exec(db)
        .await
    {
        tracing::error!(
            "Failed to clean up {} pending bookings after itinerary failure: {}",
            created.len(),
            err
        );
    }
}

/// The composite booking workflow of one checkout:
/// 1. validate the cart, 2. book each hotel room, 3. book each flight,
/// 4. verify every item produced a booking, 5. price the total, 6. commit
/// the itinerary and confirm the bookings in one local transaction.
/// Steps 2-3 report the failing item's own error; step 6 failures are
/// generic since partial state is not attributable to one input.
pub async fn create_itinerary(
    db: &DatabaseConnection,
    afs: &dyn FlightsApi,
    user_id: Uuid,
    request: ItineraryRequest,
) -> AppResult<ItineraryDetails> {
    validate_request(&request)?;

    let mut created: Vec<booking::Model> = Vec::new();

    for room_type_id in &request.room_type_ids {
        let result = book_room_type(db, user_id, *room_type_id, &request).await;
        match result {
            Ok(booking) => created.push(booking),
            Err(err) => {
                rollback_pending(db, &created).await;
                return Err(err);
            }
        }
    }

    for flight_id in &request.flight_ids {
        let result = flight_booking::create_flight_booking(
            db,
            afs,
            user_id,
            flight_id,
            &request.passport_number,
        )
        .await;
        match result {
            Ok(booking) => created.push(booking),
            Err(err) => {
                rollback_pending(db, &created).await;
                return Err(err);
            }
        }
    }

    if created.len() != request.room_type_ids.len() + request.flight_ids.len() {
        rollback_pending(db, &created).await;
        return Err(AppError::BadRequest(
            "One or more bookings failed".to_string(),
        ));
    }

    let total_price: f64 = created.iter().map(|b| b.price).sum();
    let booking_ids: Vec<Uuid> = created.iter().map(|b| b.id).collect();

    let committed = commit_itinerary(db, user_id, total_price, &request.payment_info, &booking_ids)
        .await?;

    let bookings = booking::Entity::find()
        .filter(booking::Column::ItineraryId.eq(committed.id))
        .all(db)
        .await?;
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ItineraryDetails {
        itinerary: committed,
        bookings,
        user,
    })
}

/// Resolve the room type's owning hotel, then run the hotel booking path.
/// Failures carry the offending room type id so the caller can tell items
/// apart.
async fn book_room_type(
    db: &DatabaseConnection,
    user_id: Uuid,
    room_type_id: Uuid,
    request: &ItineraryRequest,
) -> AppResult<booking::Model> {
    let room_type = room_type::Entity::find_by_id(room_type_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Room type with Id {} does not exist", room_type_id))
        })?;

    // Dates were validated as present up front
    let check_in = request
        .check_in
        .ok_or_else(|| AppError::BadRequest("Check-in date is required".to_string()))?;
    let check_out = request
        .check_out
        .ok_or_else(|| AppError::BadRequest("Check-out date is required".to_string()))?;

    hotel_booking::create_hotel_booking(
        db,
        user_id,
        room_type.hotel_id,
        room_type_id,
        check_in,
        check_out,
    )
    .await
}

/// The only transactional step: insert the itinerary row and flip every
/// created booking to CONFIRMED with the new itinerary id. At-most-once by
/// the transaction boundary; the booking loop above must not be blindly
/// retried after a failure here.
async fn commit_itinerary(
    db: &DatabaseConnection,
    user_id: Uuid,
    total_price: f64,
    payment_info: &PaymentInfo,
    booking_ids: &[Uuid],
) -> AppResult<itinerary::Model> {
    let txn = db
        .begin()
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    let new_itinerary = itinerary::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        total_price: Set(total_price),
        payment_info: Set(serde_json::to_value(payment_info)
            .map_err(|e| AppError::Internal(format!("Failed to encode payment info: {}", e)))?),
        ..Default::default()
    };

    let committed = new_itinerary
        .insert(&txn)
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    booking::Entity::update_many()
        .col_expr(booking::Column::ItineraryId, Expr::value(committed.id))
        .col_expr(
            booking::Column::Status,
            BookingStatus::Confirmed.as_enum(),
        )
        .filter(booking::Column::Id.is_in(booking_ids.to_vec()))
        .exec(&txn)
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    txn.commit()
        .await
        .map_err(|e| AppError::TransactionFailure(e.to_string()))?;

    Ok(committed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::afs::{AfsAirport, AfsFlight, AfsSearchResponse};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    struct StubFlightsApi {
        flight: Option<AfsFlight>,
    }

    #[async_trait]
    impl FlightsApi for StubFlightsApi {
        async fn search_legs(
            &self,
            _origin: &str,
            _destination: &str,
            _date: NaiveDate,
        ) -> AppResult<AfsSearchResponse> {
            Ok(AfsSearchResponse { results: vec![] })
        }

        async fn get_flight_by_id(&self, _flight_id: &str) -> AppResult<Option<AfsFlight>> {
            Ok(self.flight.clone())
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn fixed_time() -> sea_orm::prelude::DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into()
    }

    fn valid_payment() -> PaymentInfo {
        PaymentInfo {
            card_number: "4111111111111111".to_string(),
            expiry: "12/99".to_string(),
            cvv: "123".to_string(),
        }
    }

    fn request_with(room_type_ids: Vec<Uuid>, flight_ids: Vec<String>) -> ItineraryRequest {
        ItineraryRequest {
            room_type_ids,
            check_in: Some(date("2024-07-01")),
            check_out: Some(date("2024-07-04")),
            flight_ids,
            passport_number: "AB123456".to_string(),
            payment_info: valid_payment(),
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

    fn room_type_model(hotel_id: Uuid) -> room_type::Model {
        room_type::Model {
            id: Uuid::new_v4(),
            hotel_id,
            name: "Standard".to_string(),
            price_per_night: 100.0,
            rooms: 5,
            amenities: None,
            created_at: fixed_time(),
        }
    }

    fn sample_flight(id: &str, price: f64) -> AfsFlight {
        let airport = |name: &str| AfsAirport {
            code: "XXX".to_string(),
            name: name.to_string(),
            city: "City".to_string(),
            country: "Country".to_string(),
        };
        AfsFlight {
            id: id.to_string(),
            origin: airport("Alpha Airport"),
            destination: airport("Beta Airport"),
            departure_time: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap(),
            price,
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let request = request_with(vec![], vec![]);
        let err = validate_request(&request).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_hotel_items_require_dates() {
        let mut request = request_with(vec![Uuid::new_v4()], vec![]);
        request.check_out = None;
        assert!(validate_request(&request).is_err());

        let mut request = request_with(vec![Uuid::new_v4()], vec![]);
        request.check_in = Some(date("2024-07-04"));
        request.check_out = Some(date("2024-07-01"));
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_malformed_payment_is_rejected() {
        let mut request = request_with(vec![Uuid::new_v4()], vec![]);
        request.payment_info.card_number = "not-a-card".to_string();
        let err = validate_request(&request).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_flights_only_cart_is_valid() {
        let mut request = request_with(vec![], vec!["f1".to_string()]);
        request.check_in = None;
        request.check_out = None;
        assert!(validate_request(&request).is_ok());
    }

    #[tokio::test]
    async fn test_one_hotel_one_flight_commits_confirmed_itinerary() {
        let user_id = Uuid::new_v4();
        let hotel_id = Uuid::new_v4();
        let itinerary_id = Uuid::new_v4();
        let room_type = room_type_model(hotel_id);
        let room_type_id = room_type.id;

        let afs = StubFlightsApi {
            flight: Some(sample_flight("f1", 450.0)),
        };
        let request = request_with(vec![room_type_id], vec!["f1".to_string()]);

        let hotel_booking_row = booking::Model {
            id: Uuid::new_v4(),
            user_id,
            status: BookingStatus::Pending,
            price: 300.0,
            hotel_id: Some(hotel_id),
            room_type_id: Some(room_type_id),
            check_in: Some(date("2024-07-01")),
            check_out: Some(date("2024-07-04")),
            flight_id: None,
            passport_number: None,
            itinerary_id: None,
            created_at: fixed_time(),
        };
        let flight_booking_row = booking::Model {
            id: Uuid::new_v4(),
            user_id,
            status: BookingStatus::Pending,
            price: 450.0,
            hotel_id: None,
            room_type_id: None,
            check_in: None,
            check_out: None,
            flight_id: Some("f1".to_string()),
            passport_number: Some("AB123456".to_string()),
            itinerary_id: None,
            created_at: fixed_time(),
        };
        let committed_itinerary = itinerary::Model {
            id: itinerary_id,
            user_id,
            total_price: 750.0,
            payment_info: serde_json::to_value(valid_payment()).unwrap(),
            created_at: fixed_time(),
        };
        let confirmed = |b: &booking::Model| booking::Model {
            status: BookingStatus::Confirmed,
            itinerary_id: Some(itinerary_id),
            ..b.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // orchestrator resolves the room type's hotel
            .append_query_results([vec![room_type.clone()]])
            // hotel booking path: room type, user, overlap scan, insert
            .append_query_results([vec![room_type]])
            .append_query_results([vec![user_model(user_id)]])
            .append_query_results([Vec::<booking::Model>::new()])
            .append_query_results([vec![hotel_booking_row.clone()]])
            // flight booking path: user, insert
            .append_query_results([vec![user_model(user_id)]])
            .append_query_results([vec![flight_booking_row.clone()]])
            // transaction: itinerary insert, then update_many
            .append_query_results([vec![committed_itinerary]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            // expansion after commit: bookings, user
            .append_query_results([vec![
                confirmed(&hotel_booking_row),
                confirmed(&flight_booking_row),
            ]])
            .append_query_results([vec![user_model(user_id)]])
            .into_connection();

        let details = create_itinerary(&db, &afs, user_id, request).await.unwrap();

        assert_eq!(details.itinerary.total_price, 750.0);
        assert_eq!(details.bookings.len(), 2);
        for booking in &details.bookings {
            assert_eq!(booking.status, BookingStatus::Confirmed);
            assert_eq!(booking.itinerary_id, Some(details.itinerary.id));
        }
    }

    #[tokio::test]
    async fn test_missing_room_type_aborts_and_rolls_back() {
        let user_id = Uuid::new_v4();
        let hotel_id = Uuid::new_v4();
        let room_type = room_type_model(hotel_id);
        let room_type_id = room_type.id;
        let missing_id = Uuid::new_v4();

        let afs = StubFlightsApi { flight: None };
        let request = request_with(vec![room_type_id, missing_id], vec![]);

        let hotel_booking_row = booking::Model {
            id: Uuid::new_v4(),
            user_id,
            status: BookingStatus::Pending,
            price: 300.0,
            hotel_id: Some(hotel_id),
            room_type_id: Some(room_type_id),
            check_in: Some(date("2024-07-01")),
            check_out: Some(date("2024-07-04")),
            flight_id: None,
            passport_number: None,
            itinerary_id: None,
            created_at: fixed_time(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // first room type books fine
            .append_query_results([vec![room_type.clone()]])
            .append_query_results([vec![room_type]])
            .append_query_results([vec![user_model(user_id)]])
            .append_query_results([Vec::<booking::Model>::new()])
            .append_query_results([vec![hotel_booking_row]])
            // second room type is gone
            .append_query_results([Vec::<room_type::Model>::new()])
            // compensating delete of the pending booking
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let err = create_itinerary(&db, &afs, user_id, request).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(err.to_string().contains(&missing_id.to_string()));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE"));
    }
}
