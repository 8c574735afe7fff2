use crate::model::{Coordinates, SearchQuery, WeatherReport};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Errors surfaced by a [`WeatherApi`] implementation. The lookup service
/// absorbs these; they never reach the service's caller as an `Err`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The two-hop lookup backend. Implemented by [`openweather::OpenWeatherApi`]
/// in production and by scripted fakes in tests.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Resolve a city/country pair to coordinates. `Ok(None)` means the
    /// geocoder returned no match.
    async fn geocode(&self, query: &SearchQuery) -> Result<Option<Coordinates>, ApiError>;

    /// Fetch current weather for the given coordinates.
    async fn current_weather(&self, coords: Coordinates) -> Result<WeatherReport, ApiError>;
}
