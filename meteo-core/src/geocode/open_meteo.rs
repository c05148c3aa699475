//! Open-Meteo geocoding: coordinate lookup (the second reverse tier) and
//! the place-name search behind the dashboard's search box.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::ReverseGeocoder;
use crate::error::{FetchError, truncate_body};
use crate::model::{Coordinates, LocationSearchResult, PlaceName};

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const SERVICE: &str = "open-meteo geocoding";

/// Maximum matches returned by [`OpenMeteoGeocoder::search`].
const SEARCH_COUNT: &str = "5";

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    http: Client,
    base_url: String,
    language: String,
}

impl OpenMeteoGeocoder {
    pub fn new(http: Client, language: &str) -> Self {
        Self::with_base_url(http, GEOCODING_URL, language)
    }

    /// Point the geocoder at a different endpoint (tests, mirrors).
    pub fn with_base_url(http: Client, base_url: impl Into<String>, language: &str) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            language: language.to_string(),
        }
    }

    /// Search places matching `query`, best upstream matches first, capped
    /// at five. Upstream ranking is kept as-is.
    ///
    /// # Errors
    /// Any [`FetchError`] except `NoResults`: an empty result set is a
    /// successful empty list here.
    pub async fn search(&self, query: &str) -> Result<Vec<LocationSearchResult>, FetchError> {
        let records = self
            .request(&[
                ("name", query.to_string()),
                ("count", SEARCH_COUNT.to_string()),
                ("language", self.language.clone()),
            ])
            .await?;

        Ok(records
            .into_iter()
            .map(GeocodingRecord::into_search_result)
            .collect())
    }

    async fn request(&self, params: &[(&str, String)]) -> Result<Vec<GeocodingRecord>, FetchError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(params)
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

        let parsed: GeocodingResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Parse {
                service: SERVICE,
                source,
            })?;

        Ok(parsed.results)
    }
}

#[async_trait]
impl ReverseGeocoder for OpenMeteoGeocoder {
    fn service(&self) -> &'static str {
        SERVICE
    }

    async fn reverse(&self, coordinates: Coordinates) -> Result<PlaceName, FetchError> {
        let mut records = self
            .request(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("count", "1".to_string()),
                ("language", self.language.clone()),
            ])
            .await?;

        if records.is_empty() {
            return Err(FetchError::NoResults { service: SERVICE });
        }
        Ok(records.remove(0).into_place_name())
    }
}

/// The `results` key is absent entirely when nothing matched.
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingRecord>,
}

#[derive(Debug, Deserialize)]
struct GeocodingRecord {
    name: String,
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
    admin2: Option<String>,
}

impl GeocodingRecord {
    fn into_place_name(self) -> PlaceName {
        PlaceName {
            name: self.name,
            country: self.country.unwrap_or_default(),
            region: self.admin1.unwrap_or_default(),
            subregion: self.admin2.unwrap_or_default(),
        }
    }

    fn into_search_result(self) -> LocationSearchResult {
        LocationSearchResult {
            name: self.name,
            latitude: self.latitude,
            longitude: self.longitude,
            country: self.country.unwrap_or_default(),
            region: self.admin1.unwrap_or_default(),
            subregion: self.admin2.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_results_key_is_zero_records() {
        let parsed: GeocodingResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn record_maps_admin_levels() {
        let parsed: GeocodingResponse = serde_json::from_str(
            r#"{"results":[{"name":"Barcelona","latitude":41.38879,"longitude":2.15899,
                "country":"España","admin1":"Cataluña","admin2":"Barcelona"}]}"#,
        )
        .unwrap();

        let record = parsed.results.into_iter().next().unwrap();
        let result = record.into_search_result();
        assert_eq!(result.name, "Barcelona");
        assert_eq!(result.region, "Cataluña");
        assert_eq!(result.subregion, "Barcelona");
        assert_eq!(result.coordinates().latitude, 41.38879);
    }

    #[test]
    fn record_tolerates_missing_admin_fields() {
        let parsed: GeocodingResponse =
            serde_json::from_str(r#"{"results":[{"name":"Null Island"}]}"#).unwrap();

        let place = parsed
            .results
            .into_iter()
            .next()
            .unwrap()
            .into_place_name();
        assert_eq!(place.name, "Null Island");
        assert!(place.country.is_empty());
        assert!(place.region.is_empty());
        assert!(place.subregion.is_empty());
    }
}
