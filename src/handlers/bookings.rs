use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::error::{AppError, AppResult};
use crate::services::itinerary::{self, ItineraryDetails, ItineraryRequest, PaymentInfo};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItineraryBody {
    #[serde(default)]
    pub room_type_ids: Vec<Uuid>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    #[serde(default)]
    pub flight_ids: Vec<String>,
    #[serde(default)]
    pub passport_number: String,
    pub payment_info: Option<PaymentInfo>,
}

fn parse_optional_date(value: &Option<String>, label: &str) -> AppResult<Option<NaiveDate>> {
    match value {
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{} is invalid", label))),
        None => Ok(None),
    }
}

/// Composite itinerary endpoint: books every hotel room and flight in the
/// cart and commits one itinerary, all-or-nothing
pub async fn create_itinerary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateItineraryBody>,
) -> AppResult<Json<ItineraryDetails>> {
    let payment_info = body
        .payment_info
        .ok_or_else(|| AppError::BadRequest("Invalid payment Info".to_string()))?;

    let request = ItineraryRequest {
        room_type_ids: body.room_type_ids,
        check_in: parse_optional_date(&body.check_in, "Check-in date")?,
        check_out: parse_optional_date(&body.check_out, "Check-out date")?,
        flight_ids: body.flight_ids,
        passport_number: body.passport_number,
        payment_info,
    };

    let details =
        itinerary::create_itinerary(&*state.db, state.afs.as_ref(), claims.sub, request).await?;

    Ok(Json(details))
}

/// List the authenticated user's bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<booking::Model>>> {
    let bookings = booking::Entity::find()
        .filter(booking::Column::UserId.eq(claims.sub))
        .all(&*state.db)
        .await?;

    Ok(Json(bookings))
}

/// Cancel a booking
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let booking = booking::Entity::find_by_id(booking_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    // Verify ownership
    if booking.user_id != claims.sub {
        return Err(AppError::Forbidden(
            "You can only cancel your own bookings".to_string(),
        ));
    }

    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::BadRequest(
            "Booking is already cancelled".to_string(),
        ));
    }

    // Cancelled bookings keep their row but stop counting against
    // availability
    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(BookingStatus::Cancelled);
    active.update(&*state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Booking cancelled" })))
}
