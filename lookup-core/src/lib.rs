//! Core library for the `weather-lookup` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over the two-hop geocode + weather backend
//! - Shared domain models (queries, reports, observable lookup state)
//! - The lookup service itself
//!
//! It is used by `lookup-cli`, but can also be reused by other binaries or
//! UI layers that want to observe lookup state.

pub mod api;
pub mod config;
pub mod model;
pub mod service;

pub use api::{ApiError, WeatherApi, openweather::OpenWeatherApi};
pub use config::Config;
pub use model::{Coordinates, LookupOutcome, LookupState, SearchQuery, Temperatures, WeatherReport};
pub use service::WeatherLookup;
