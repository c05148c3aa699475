use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting values outside
    /// [-90, 90] latitude / [-180, 180] longitude.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }
}

/// Human-readable place attached to a weather snapshot.
///
/// Components no provider reported are empty strings, never absent fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceName {
    pub name: String,
    pub country: String,
    /// First-level administrative area (state, autonomous community, ...).
    pub region: String,
    /// Second-level administrative area (province, district, ...).
    pub subregion: String,
}

impl PlaceName {
    /// Sentinel record for coordinates no provider could describe.
    pub fn unknown() -> Self {
        Self {
            name: "Unknown location".to_string(),
            country: String::new(),
            region: String::new(),
            subregion: String::new(),
        }
    }

    /// Fixed record used when every geocoding tier is exhausted.
    pub fn fallback() -> Self {
        Self {
            name: "Vidreres".to_string(),
            country: "España".to_string(),
            region: "Cataluña".to_string(),
            subregion: "Girona".to_string(),
        }
    }
}

impl Default for PlaceName {
    fn default() -> Self {
        Self::unknown()
    }
}

/// One observation of the current weather, in the provider's native units
/// (°C, %, km/h, mm, UV index, WMO code).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    pub uv_index: f64,
    pub weather_code: i32,
    /// Provider-local timestamp of the observation, `YYYY-MM-DDTHH:MM`.
    pub observed_at: String,
}

impl CurrentConditions {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }
}

/// One forecast day, in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub weather_code: i32,
    pub sunrise: String,
    pub sunset: String,
    pub precipitation_sum: f64,
}

impl DailyEntry {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }

    /// Parsed calendar date, if the upstream string is well-formed.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// One forecast hour, in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    /// Provider-local timestamp, `YYYY-MM-DDTHH:MM`.
    pub time: String,
    pub temperature: f64,
    pub weather_code: i32,
    pub precipitation: f64,
}

impl HourlyEntry {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }

    /// Calendar-date prefix of `time`, the key that aligns hours with a
    /// daily entry.
    pub fn date_key(&self) -> &str {
        self.time.split('T').next().unwrap_or(self.time.as_str())
    }

    pub fn local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, "%Y-%m-%dT%H:%M").ok()
    }
}

/// One fully-resolved, immutable weather result for a point in time and
/// location. Constructed fresh on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: PlaceName,
    pub current: CurrentConditions,
    pub daily: Vec<DailyEntry>,
    pub hourly: Vec<HourlyEntry>,
}

impl WeatherSnapshot {
    /// Hourly entries whose calendar date matches `date` (`YYYY-MM-DD`).
    ///
    /// Alignment goes through the date string, not positional index: at the
    /// edges of the forecast window a day can carry fewer than 24 hours.
    pub fn hourly_for(&self, date: &str) -> Vec<&HourlyEntry> {
        self.hourly.iter().filter(|h| h.date_key() == date).collect()
    }
}

/// One match from the place-name search, ranked by upstream relevance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSearchResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub region: String,
    pub subregion: String,
}

impl LocationSearchResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl fmt::Display for LocationSearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for part in [&self.subregion, &self.region, &self.country] {
            if !part.is_empty() {
                write!(f, ", {part}")?;
            }
        }
        Ok(())
    }
}

/// Weather condition categories mapped from WMO codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    /// Convert a WMO weather code to a display category.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            61 | 63 | 65 | 80 | 81 | 82 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    /// Icon name for the presentation layer.
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::MainlyClear => "sun_high",
            Self::PartlyCloudy => "cloud_sun",
            Self::Overcast => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle => "cloud_rain",
            Self::Rain => "cloud_rain",
            Self::Snow => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
            Self::Unknown => "question_mark",
        }
    }
}
