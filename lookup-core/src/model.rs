use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied search input. Contents are forwarded into the request
/// URL as-is; no validation happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub city: String,
    pub country: String,
}

impl SearchQuery {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }
}

/// Coordinates extracted from the first geocoding match.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Temperature block of a weather payload, in Kelvin as the API returns it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Temperatures {
    pub temp: f64,
    pub temp_max: f64,
    pub temp_min: f64,
}

/// Validated weather payload. Deserialization doubles as schema validation:
/// a payload missing any of these fields (or carrying the wrong types) is
/// rejected as a whole, so a stored report is always fully populated.
///
/// `Default` is the sentinel for "no data yet": empty name, zero temperatures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    pub main: Temperatures,
}

impl WeatherReport {
    /// True iff this is real data rather than the sentinel.
    pub fn has_data(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Observable state of the lookup service. Mutated only by
/// [`WeatherLookup::fetch_weather`](crate::service::WeatherLookup::fetch_weather).
#[derive(Debug, Clone, Default)]
pub struct LookupState {
    pub weather: WeatherReport,
    pub loading: bool,
    pub not_found: bool,
    /// Wall-clock time of the last successful fetch.
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Typed result of one `fetch_weather` call. Failures never propagate as
/// errors; the caller gets one of these and decides what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// A validated report was stored.
    Found,
    /// Geocoding returned no match; the weather call was skipped.
    NotFound,
    /// The weather payload did not match the expected shape.
    ValidationFailed,
    /// A request failed at either hop (connect error, non-2xx, body read).
    TransportFailed,
    /// A newer `fetch_weather` call started while this one was in flight;
    /// this call wrote nothing.
    Superseded,
}
