//! Client for the Advanced Flights System (AFS), the remote third-party
//! flight inventory. Consumed through the [`FlightsApi`] trait so services
//! can take a test double.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfsAirport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfsFlight {
    pub id: String,
    pub origin: AfsAirport,
    pub destination: AfsAirport,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price: f64,
}

/// One chain of flight legs; legs[1..] are layovers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfsLegChain {
    pub flights: Vec<AfsFlight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfsSearchResponse {
    pub results: Vec<AfsLegChain>,
}

#[async_trait]
pub trait FlightsApi: Send + Sync {
    /// Search flight-leg chains between two cities on a date. Remote
    /// not-found comes back as an empty result set, not an error.
    async fn search_legs(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> AppResult<AfsSearchResponse>;

    /// Look up a single flight; `None` when the remote system has no such
    /// flight id.
    async fn get_flight_by_id(&self, flight_id: &str) -> AppResult<Option<AfsFlight>>;
}

pub type SharedFlightsApi = Arc<dyn FlightsApi>;

pub struct AfsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AfsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.afs_base_url.trim_end_matches('/').to_string(),
            api_key: config.afs_api_key.clone(),
        }
    }
}

#[async_trait]
impl FlightsApi for AfsClient {
    async fn search_legs(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> AppResult<AfsSearchResponse> {
        let url = format!("{}/flights", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("date", &date.to_string()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Ok(AfsSearchResponse { results: vec![] }),
            status => Err(AppError::Upstream(format!(
                "Flight search returned status {}",
                status
            ))),
        }
    }

    async fn get_flight_by_id(&self, flight_id: &str) -> AppResult<Option<AfsFlight>> {
        let url = format!("{}/flights/{}", self.base_url, flight_id);
        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(AppError::Upstream(format!(
                "Flight lookup returned status {}",
                status
            ))),
        }
    }
}
