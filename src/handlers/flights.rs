use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::afs::AfsFlight;
use crate::entities::booking;
use crate::error::{AppError, AppResult};
use crate::services::{flight_booking, flight_plans::{self, FlightPlan}};
use crate::utils::jwt::Claims;
use crate::AppState;

fn parse_date(value: &str, label: &str) -> AppResult<NaiveDate> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{} is invalid", label)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchQuery {
    pub source: String,
    pub destination: String,
    pub date: String,
    pub trip_type: String,
    pub return_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlightSearchResponse {
    pub leaving: Vec<FlightPlan>,
    pub returning: Vec<FlightPlan>,
}

/// Search flight plans, one-way or round-trip. Source and destination
/// accept a city name or an airport name. The return leg is only searched
/// once the leaving leg has produced plans.
pub async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightSearchQuery>,
) -> AppResult<Json<FlightSearchResponse>> {
    if query.source.is_empty() {
        return Err(AppError::BadRequest("Source is invalid".to_string()));
    }
    if query.destination.is_empty() {
        return Err(AppError::BadRequest("Destination is invalid".to_string()));
    }
    if !matches!(query.trip_type.as_str(), "one-way" | "round-trip") {
        return Err(AppError::BadRequest(
            "tripType must be either one-way or round-trip".to_string(),
        ));
    }

    let date = parse_date(&query.date, "Date")?;
    let return_date = match (query.trip_type.as_str(), &query.return_date) {
        ("round-trip", Some(value)) => Some(parse_date(value, "Return date")?),
        ("round-trip", None) => {
            return Err(AppError::BadRequest("Return date is invalid".to_string()));
        }
        _ => None,
    };

    let (leaving, returning) = flight_plans::search_trip(
        &*state.db,
        state.afs.as_ref(),
        &query.source,
        &query.destination,
        date,
        return_date,
    )
    .await?;

    Ok(Json(FlightSearchResponse { leaving, returning }))
}

/// Get flight details from the remote flight system
pub async fn get_flight(
    State(state): State<AppState>,
    Path(flight_id): Path<String>,
) -> AppResult<Json<AfsFlight>> {
    let flight = state
        .afs
        .get_flight_by_id(&flight_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    Ok(Json(flight))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlightBookingRequest {
    pub flight_id: String,
    pub passport_number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightBookingResponse {
    pub flight_booking: booking::Model,
}

/// Create a flight booking
pub async fn create_flight_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateFlightBookingRequest>,
) -> AppResult<(StatusCode, Json<FlightBookingResponse>)> {
    let booking = flight_booking::create_flight_booking(
        &*state.db,
        state.afs.as_ref(),
        claims.sub,
        &payload.flight_id,
        &payload.passport_number,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(FlightBookingResponse {
            flight_booking: booking,
        }),
    ))
}
