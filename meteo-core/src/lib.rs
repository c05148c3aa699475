//! Core library for the `meteo` weather dashboard.
//!
//! This crate defines:
//! - The weather domain model (snapshots, forecast entries, WMO condition
//!   mapping)
//! - The forecast aggregator over the Open-Meteo API
//! - A tiered reverse-geocoding chain with a fixed terminal fallback
//! - Best-effort device geolocation and on-disk configuration
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or
//! services.

pub mod config;
pub mod error;
pub mod geocode;
pub mod locate;
pub mod model;
pub mod provider;

pub use config::{Config, SavedLocation};
pub use error::FetchError;
pub use geocode::{LocationResolver, ReverseGeocoder};
pub use model::{
    Coordinates, CurrentConditions, DailyEntry, HourlyEntry, LocationSearchResult, PlaceName,
    WeatherCondition, WeatherSnapshot,
};
pub use provider::WeatherService;
