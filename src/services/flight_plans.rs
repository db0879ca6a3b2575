//! Turns raw flight-leg chains from the remote flight system into priced
//! flight plans with layovers, and resolves airport-name search terms to
//! their city for the remote query.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::afs::{AfsSearchResponse, FlightsApi};
use crate::entities::airport;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct Layover {
    pub id: String,
    pub airport: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightPlan {
    pub id: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub origin: String,
    pub destination: String,
    /// Total travel time in minutes, layovers included.
    pub duration: i64,
    pub price: f64,
    pub layovers: Vec<Layover>,
}

/// A search term resolved against the airport table: the city to query the
/// remote system with, plus the airport name kept as an exact-match filter
/// when the term named an airport rather than a city.
#[derive(Debug, Clone)]
pub struct ResolvedEndpoint {
    pub city: String,
    pub airport_name: Option<String>,
}

pub async fn resolve_endpoint(db: &DatabaseConnection, term: &str) -> AppResult<ResolvedEndpoint> {
    let airport = airport::Entity::find()
        .filter(airport::Column::Name.eq(term))
        .one(db)
        .await?;

    Ok(match airport {
        Some(a) => ResolvedEndpoint {
            city: a.city,
            airport_name: Some(term.to_string()),
        },
        None => ResolvedEndpoint {
            city: term.to_string(),
            airport_name: None,
        },
    })
}

/// Assemble flight plans from remote leg chains. Chains whose first leg
/// does not depart from `origin_airport`, or whose last leg does not land
/// at `destination_airport`, are dropped when those filters are set.
/// An empty result means "nothing found"; that is the caller's signal, not
/// an error here.
pub fn assemble_plans(
    response: &AfsSearchResponse,
    origin_airport: Option<&str>,
    destination_airport: Option<&str>,
) -> Vec<FlightPlan> {
    let mut plans = Vec::new();

    for chain in &response.results {
        let (Some(first), Some(last)) = (chain.flights.first(), chain.flights.last()) else {
            continue;
        };

        if let Some(origin) = origin_airport {
            if first.origin.name != origin {
                continue;
            }
        }
        if let Some(destination) = destination_airport {
            if last.destination.name != destination {
                continue;
            }
        }

        let layovers: Vec<Layover> = chain.flights[1..]
            .iter()
            .map(|leg| Layover {
                id: leg.id.clone(),
                airport: leg.origin.name.clone(),
                price: leg.price,
            })
            .collect();

        let price: f64 = chain.flights.iter().map(|leg| leg.price).sum();
        let duration = (last.arrival_time - first.departure_time).num_minutes();

        plans.push(FlightPlan {
            id: first.id.clone(),
            departure_time: first.departure_time,
            arrival_time: last.arrival_time,
            origin: first.origin.name.clone(),
            destination: last.destination.name.clone(),
            duration,
            price,
            layovers,
        });
    }

    plans
}

/// One-way flight plan search between two terms (city or airport names).
pub async fn search_flight_plans(
    db: &DatabaseConnection,
    afs: &dyn FlightsApi,
    origin: &str,
    destination: &str,
    date: NaiveDate,
) -> AppResult<Vec<FlightPlan>> {
    let origin = resolve_endpoint(db, origin).await?;
    let destination = resolve_endpoint(db, destination).await?;

    let response = afs.search_legs(&origin.city, &destination.city, date).await?;

    Ok(assemble_plans(
        &response,
        origin.airport_name.as_deref(),
        destination.airport_name.as_deref(),
    ))
}

/// Search a whole trip: the leaving leg, and for round trips the returning
/// leg. The returning leg is only searched once the leaving leg has produced
/// plans; either leg coming back empty is reported as not-found with its own
/// message.
pub async fn search_trip(
    db: &DatabaseConnection,
    afs: &dyn FlightsApi,
    source: &str,
    destination: &str,
    date: NaiveDate,
    return_date: Option<NaiveDate>,
) -> AppResult<(Vec<FlightPlan>, Vec<FlightPlan>)> {
    let leaving = search_flight_plans(db, afs, source, destination, date).await?;
    if leaving.is_empty() {
        return Err(AppError::NotFound(
            "No flight plans could be found".to_string(),
        ));
    }

    let mut returning = Vec::new();
    if let Some(return_date) = return_date {
        returning = search_flight_plans(db, afs, destination, source, return_date).await?;
        if returning.is_empty() {
            return Err(AppError::NotFound(
                "No returning flight plans could be found".to_string(),
            ));
        }
    }

    Ok((leaving, returning))
}
