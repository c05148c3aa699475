//! Reverse geocoding with a tiered provider chain.
//!
//! Tiers are tried strictly in order; the first one that yields a usable
//! place wins. A tier that answers successfully but with no usable payload
//! counts as a failed tier, so "no data" and "provider down" degrade the
//! same way. When the chain is exhausted the resolver hands back a fixed
//! fallback record instead of an error.

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;
use crate::model::{Coordinates, PlaceName};

pub mod nominatim;
pub mod open_meteo;

pub use nominatim::NominatimGeocoder;
pub use open_meteo::OpenMeteoGeocoder;

/// One tier in the reverse-geocoding chain.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    /// Provider label used in logs and error messages.
    fn service(&self) -> &'static str;

    /// Resolve coordinates to a place, or fail.
    ///
    /// # Errors
    /// Any [`FetchError`], including [`FetchError::NoResults`] for an empty
    /// but otherwise successful response.
    async fn reverse(&self, coordinates: Coordinates) -> Result<PlaceName, FetchError>;
}

/// Resolves coordinates to a human-readable place name.
#[derive(Debug)]
pub struct LocationResolver {
    tiers: Vec<Box<dyn ReverseGeocoder>>,
    fallback: PlaceName,
}

impl LocationResolver {
    /// Production chain: Nominatim first, Open-Meteo geocoding second.
    pub fn new(http: Client, language: &str) -> Self {
        let tiers: Vec<Box<dyn ReverseGeocoder>> = vec![
            Box::new(NominatimGeocoder::new(http.clone(), language)),
            Box::new(OpenMeteoGeocoder::new(http, language)),
        ];
        Self::from_tiers(tiers, PlaceName::fallback())
    }

    /// Build a resolver from an explicit tier list and terminal record.
    pub fn from_tiers(tiers: Vec<Box<dyn ReverseGeocoder>>, fallback: PlaceName) -> Self {
        Self { tiers, fallback }
    }

    /// Resolve coordinates to a place name. Never fails: failed tiers are
    /// logged and skipped, and an exhausted chain yields the fallback
    /// record, so callers can rely on a usable name being present.
    pub async fn resolve(&self, coordinates: Coordinates) -> PlaceName {
        for tier in &self.tiers {
            match tier.reverse(coordinates).await {
                Ok(place) => {
                    tracing::debug!(
                        provider = tier.service(),
                        name = %place.name,
                        "reverse geocoded"
                    );
                    return place;
                }
                Err(err) => {
                    tracing::debug!(
                        provider = tier.service(),
                        error = %err,
                        "geocoding tier failed"
                    );
                }
            }
        }

        tracing::warn!(
            lat = coordinates.latitude,
            lon = coordinates.longitude,
            "all geocoding tiers failed, using fallback location"
        );
        self.fallback.clone()
    }
}
