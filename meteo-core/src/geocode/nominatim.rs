//! Primary reverse-geocoding tier: Nominatim (OpenStreetMap).
//!
//! Free, no API key required. Requests must carry a User-Agent per the
//! Nominatim usage policy; the shared HTTP client sets one.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::ReverseGeocoder;
use crate::error::{FetchError, truncate_body};
use crate::model::{Coordinates, PlaceName};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";

const SERVICE: &str = "nominatim";

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    base_url: String,
    language: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, language: &str) -> Self {
        Self::with_base_url(http, NOMINATIM_URL, language)
    }

    /// Point the geocoder at a different endpoint (tests, mirrors).
    pub fn with_base_url(http: Client, base_url: impl Into<String>, language: &str) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    fn service(&self) -> &'static str {
        SERVICE
    }

    async fn reverse(&self, coordinates: Coordinates) -> Result<PlaceName, FetchError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("format", "json".to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
                ("accept-language", self.language.clone()),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Network {
                service: SERVICE,
                source,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| FetchError::Network {
            service: SERVICE,
            source,
        })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                service: SERVICE,
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Parse {
                service: SERVICE,
                source,
            })?;

        // A body without an address object (open water, bad coordinates) is
        // a failed tier, not a success with an empty record.
        parsed
            .address
            .and_then(Address::into_place_name)
            .ok_or(FetchError::NoResults { service: SERVICE })
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

/// Address components; every field is optional in practice.
#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    region: Option<String>,
    province: Option<String>,
    state_district: Option<String>,
    country: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl Address {
    /// Pick the primary place name, most specific settlement first. `None`
    /// when nothing in the chain is set, which the caller treats as a
    /// failed tier.
    fn into_place_name(self) -> Option<PlaceName> {
        let name = non_empty(self.city)
            .or_else(|| non_empty(self.town))
            .or_else(|| non_empty(self.village))
            .or_else(|| non_empty(self.municipality))
            .or_else(|| non_empty(self.county))?;

        Some(PlaceName {
            name,
            country: self.country.unwrap_or_default(),
            region: non_empty(self.state)
                .or_else(|| non_empty(self.region))
                .unwrap_or_default(),
            subregion: non_empty(self.province)
                .or_else(|| non_empty(self.state_district))
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_wins_over_town() {
        let address = Address {
            city: Some("Girona".to_string()),
            town: Some("Salt".to_string()),
            ..Address::default()
        };
        let place = address.into_place_name().unwrap();
        assert_eq!(place.name, "Girona");
    }

    #[test]
    fn town_used_when_city_missing_or_empty() {
        let address = Address {
            city: Some(String::new()),
            town: Some("Vidreres".to_string()),
            country: Some("España".to_string()),
            ..Address::default()
        };
        let place = address.into_place_name().unwrap();
        assert_eq!(place.name, "Vidreres");
        assert_eq!(place.country, "España");
    }

    #[test]
    fn village_municipality_county_complete_the_chain() {
        let village = Address {
            village: Some("Caldes".to_string()),
            ..Address::default()
        };
        assert_eq!(village.into_place_name().unwrap().name, "Caldes");

        let county = Address {
            county: Some("La Selva".to_string()),
            ..Address::default()
        };
        assert_eq!(county.into_place_name().unwrap().name, "La Selva");
    }

    #[test]
    fn empty_address_is_no_place() {
        assert!(Address::default().into_place_name().is_none());
    }

    #[test]
    fn region_and_subregion_mapping() {
        let address = Address {
            city: Some("Vidreres".to_string()),
            state: Some("Cataluña".to_string()),
            province: Some("Girona".to_string()),
            country: Some("España".to_string()),
            ..Address::default()
        };
        let place = address.into_place_name().unwrap();
        assert_eq!(place.region, "Cataluña");
        assert_eq!(place.subregion, "Girona");
    }

    #[test]
    fn state_district_backs_up_province() {
        let address = Address {
            town: Some("Berlin".to_string()),
            state_district: Some("Mitte".to_string()),
            ..Address::default()
        };
        assert_eq!(address.into_place_name().unwrap().subregion, "Mitte");
    }

    #[test]
    fn response_without_address_deserializes() {
        let parsed: ReverseResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.address.is_none());
    }
}
