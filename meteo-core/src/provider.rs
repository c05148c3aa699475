//! Forecast aggregation over the Open-Meteo forecast API.
//!
//! One upstream call fetches current, hourly and daily blocks together; the
//! parallel arrays in the response are reshaped into per-index entries and
//! merged with the reverse-geocoded place name into a [`WeatherSnapshot`].

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{FetchError, truncate_body};
use crate::geocode::{LocationResolver, OpenMeteoGeocoder};
use crate::model::{
    Coordinates, CurrentConditions, DailyEntry, HourlyEntry, LocationSearchResult, PlaceName,
    WeatherSnapshot,
};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const SERVICE: &str = "open-meteo forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
                              precipitation,weather_code,wind_speed_10m,uv_index";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation,weather_code";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
                            sunrise,sunset,precipitation_sum";

/// Minimum query length accepted by [`WeatherService::search`]. Shorter
/// queries return noisy matches from the upstream service.
pub const MIN_QUERY_LEN: usize = 2;

/// Entry point for the dashboard: forecast fetch, place search, and the
/// reverse-geocoding chain behind one shared HTTP client.
#[derive(Debug)]
pub struct WeatherService {
    http: Client,
    forecast_url: String,
    resolver: LocationResolver,
    geocoder: OpenMeteoGeocoder,
}

impl WeatherService {
    /// Service against the public endpoints.
    ///
    /// # Errors
    /// [`FetchError::Network`] if the HTTP client cannot be constructed.
    pub fn new(language: &str) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::Network {
                service: SERVICE,
                source,
            })?;

        let resolver = LocationResolver::new(http.clone(), language);
        let geocoder = OpenMeteoGeocoder::new(http.clone(), language);

        Ok(Self {
            http,
            forecast_url: FORECAST_URL.to_string(),
            resolver,
            geocoder,
        })
    }

    /// Service with explicit endpoints and geocoding chain (tests,
    /// embedding behind a proxy).
    pub fn with_endpoints(
        http: Client,
        forecast_url: impl Into<String>,
        resolver: LocationResolver,
        geocoder: OpenMeteoGeocoder,
    ) -> Self {
        Self {
            http,
            forecast_url: forecast_url.into(),
            resolver,
            geocoder,
        }
    }

    /// Fetch current, hourly and daily weather for `coordinates` in one
    /// upstream call and attach the resolved place name.
    ///
    /// Location resolution degrades internally and cannot abort the call;
    /// only the forecast request itself can fail. No retry is attempted.
    ///
    /// # Errors
    /// [`FetchError::Status`] on a non-success forecast response,
    /// [`FetchError::Network`] / [`FetchError::Parse`] for transport or
    /// malformed-body failures.
    pub async fn fetch_weather(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, FetchError> {
        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
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

        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Parse {
                service: SERVICE,
                source,
            })?;

        let location = self.resolver.resolve(coordinates).await;
        Ok(build_snapshot(parsed, location))
    }

    /// Search up to five places by name.
    ///
    /// Never fails: upstream errors and empty result sets both come back as
    /// an empty list, and queries shorter than [`MIN_QUERY_LEN`] characters
    /// short-circuit without a network call.
    pub async fn search(&self, query: &str) -> Vec<LocationSearchResult> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        match self.geocoder.search(query).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(query, error = %err, "location search failed");
                Vec::new()
            }
        }
    }
}

// --- Open-Meteo forecast response types ---

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: RawCurrent,
    hourly: RawHourly,
    daily: RawDaily,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    precipitation: f64,
    weather_code: i32,
    wind_speed_10m: f64,
    uv_index: f64,
}

/// Parallel arrays, index-aligned by the provider.
#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    precipitation: Vec<f64>,
    weather_code: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    time: Vec<String>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
    precipitation_sum: Vec<f64>,
}

/// Reshape the parallel upstream arrays into per-index entries.
///
/// The `time` array drives the output length. The provider aligns the
/// sibling arrays with it; a shorter sibling yields defaults rather than an
/// out-of-bounds panic.
fn build_snapshot(raw: ForecastResponse, location: PlaceName) -> WeatherSnapshot {
    let current = CurrentConditions {
        temperature: raw.current.temperature_2m,
        feels_like: raw.current.apparent_temperature,
        humidity: raw.current.relative_humidity_2m,
        wind_speed: raw.current.wind_speed_10m,
        precipitation: raw.current.precipitation,
        uv_index: raw.current.uv_index,
        weather_code: raw.current.weather_code,
        observed_at: raw.current.time,
    };

    let RawDaily {
        time,
        weather_code,
        temperature_2m_max,
        temperature_2m_min,
        sunrise,
        sunset,
        precipitation_sum,
    } = raw.daily;
    let daily = time
        .into_iter()
        .enumerate()
        .map(|(i, date)| DailyEntry {
            date,
            max_temp: temperature_2m_max.get(i).copied().unwrap_or_default(),
            min_temp: temperature_2m_min.get(i).copied().unwrap_or_default(),
            weather_code: weather_code.get(i).copied().unwrap_or_default(),
            sunrise: sunrise.get(i).cloned().unwrap_or_default(),
            sunset: sunset.get(i).cloned().unwrap_or_default(),
            precipitation_sum: precipitation_sum.get(i).copied().unwrap_or_default(),
        })
        .collect();

    let RawHourly {
        time,
        temperature_2m,
        precipitation,
        weather_code,
    } = raw.hourly;
    let hourly = time
        .into_iter()
        .enumerate()
        .map(|(i, time)| HourlyEntry {
            time,
            temperature: temperature_2m.get(i).copied().unwrap_or_default(),
            weather_code: weather_code.get(i).copied().unwrap_or_default(),
            precipitation: precipitation.get(i).copied().unwrap_or_default(),
        })
        .collect();

    WeatherSnapshot {
        location,
        current,
        daily,
        hourly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> ForecastResponse {
        serde_json::from_value(json!({
            "current": {
                "time": "2026-08-07T11:45",
                "temperature_2m": 27.3,
                "relative_humidity_2m": 58,
                "apparent_temperature": 29.1,
                "precipitation": 0.0,
                "weather_code": 1,
                "wind_speed_10m": 12.4,
                "uv_index": 6.2
            },
            "hourly": {
                "time": ["2026-08-07T00:00", "2026-08-07T01:00", "2026-08-08T00:00"],
                "temperature_2m": [18.0, 17.5, 19.2],
                "precipitation": [0.0, 0.1, 0.0],
                "weather_code": [0, 2, 3]
            },
            "daily": {
                "time": ["2026-08-07", "2026-08-08"],
                "weather_code": [1, 61],
                "temperature_2m_max": [30.2, 25.0],
                "temperature_2m_min": [18.0, 16.4],
                "sunrise": ["2026-08-07T06:45", "2026-08-08T06:46"],
                "sunset": ["2026-08-07T21:08", "2026-08-08T21:07"],
                "precipitation_sum": [0.0, 4.2]
            }
        }))
        .unwrap()
    }

    #[test]
    fn snapshot_preserves_array_lengths_and_order() {
        let snapshot = build_snapshot(sample_response(), PlaceName::fallback());

        assert_eq!(snapshot.daily.len(), 2);
        assert_eq!(snapshot.hourly.len(), 3);
        assert_eq!(snapshot.daily[0].date, "2026-08-07");
        assert_eq!(snapshot.daily[1].date, "2026-08-08");
        assert_eq!(snapshot.hourly[1].time, "2026-08-07T01:00");
    }

    #[test]
    fn snapshot_zips_fields_by_index() {
        let snapshot = build_snapshot(sample_response(), PlaceName::fallback());

        let second_day = &snapshot.daily[1];
        assert_eq!(second_day.weather_code, 61);
        assert_eq!(second_day.max_temp, 25.0);
        assert_eq!(second_day.min_temp, 16.4);
        assert_eq!(second_day.sunrise, "2026-08-08T06:46");
        assert_eq!(second_day.precipitation_sum, 4.2);

        let second_hour = &snapshot.hourly[1];
        assert_eq!(second_hour.temperature, 17.5);
        assert_eq!(second_hour.precipitation, 0.1);
        assert_eq!(second_hour.weather_code, 2);
    }

    #[test]
    fn snapshot_maps_current_block() {
        let snapshot = build_snapshot(sample_response(), PlaceName::fallback());

        let current = &snapshot.current;
        assert_eq!(current.temperature, 27.3);
        assert_eq!(current.feels_like, 29.1);
        assert_eq!(current.humidity, 58.0);
        assert_eq!(current.wind_speed, 12.4);
        assert_eq!(current.uv_index, 6.2);
        assert_eq!(current.observed_at, "2026-08-07T11:45");
        assert_eq!(snapshot.location.name, "Vidreres");
    }

    #[test]
    fn short_sibling_arrays_default_instead_of_panicking() {
        let raw: ForecastResponse = serde_json::from_value(json!({
            "current": {
                "time": "2026-08-07T11:45",
                "temperature_2m": 20.0,
                "relative_humidity_2m": 50,
                "apparent_temperature": 20.0,
                "precipitation": 0.0,
                "weather_code": 0,
                "wind_speed_10m": 5.0,
                "uv_index": 1.0
            },
            "hourly": {
                "time": ["2026-08-07T00:00", "2026-08-07T01:00"],
                "temperature_2m": [18.0],
                "precipitation": [0.0],
                "weather_code": [0]
            },
            "daily": {
                "time": [],
                "weather_code": [],
                "temperature_2m_max": [],
                "temperature_2m_min": [],
                "sunrise": [],
                "sunset": [],
                "precipitation_sum": []
            }
        }))
        .unwrap();

        let snapshot = build_snapshot(raw, PlaceName::unknown());
        assert_eq!(snapshot.hourly.len(), 2);
        assert_eq!(snapshot.hourly[1].temperature, 0.0);
        assert!(snapshot.daily.is_empty());
    }
}
