use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use meteo_core::provider::MIN_QUERY_LEN;
use meteo_core::{Config, Coordinates, LocationSearchResult, WeatherService, locate};

use crate::render;

/// Built-in starting point when nothing else names a location.
const DEFAULT_COORDINATES: Coordinates = Coordinates {
    latitude: 41.8448,
    longitude: 2.7604,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard for a location.
    Show {
        /// Latitude in decimal degrees; requires --lon.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees; requires --lat.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Forecast day to expand into hours, 0 = today.
        #[arg(long, default_value_t = 0)]
        day: usize,
    },

    /// Search for a place by name and show its weather.
    Search {
        /// Place name, at least two characters.
        query: String,
    },

    /// Pick a default location (and language) for future runs.
    Configure {
        /// Search query to start from; prompted for when absent.
        query: Option<String>,

        /// Language code for place names, e.g. "en" or "es".
        #[arg(long)]
        language: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Show { lat, lon, day } => show(&config, lat, lon, day).await,
            Command::Search { query } => search(&config, &query).await,
            Command::Configure { query, language } => configure(config, query, language).await,
        }
    }
}

async fn show(config: &Config, lat: Option<f64>, lon: Option<f64>, day: usize) -> Result<()> {
    let coordinates = match (lat, lon) {
        (Some(lat), Some(lon)) => Coordinates::new(lat, lon)
            .context("latitude must be in [-90, 90] and longitude in [-180, 180]")?,
        _ => start_coordinates(config).await,
    };

    let service = WeatherService::new(&config.language)?;
    fetch_and_render(&service, coordinates, day).await
}

/// Where the dashboard opens: saved default, then device location, then the
/// built-in starting point.
async fn start_coordinates(config: &Config) -> Coordinates {
    if let Some(saved) = &config.default_location {
        tracing::debug!(name = %saved.name, "using configured default location");
        return saved.coordinates();
    }
    if let Some(located) = locate::current_location().await {
        return located;
    }
    DEFAULT_COORDINATES
}

async fn fetch_and_render(
    service: &WeatherService,
    coordinates: Coordinates,
    day: usize,
) -> Result<()> {
    let snapshot = service
        .fetch_weather(coordinates)
        .await
        .context("weather data unavailable; run the same command again to retry")?;

    render::dashboard(&snapshot, day);
    Ok(())
}

async fn search(config: &Config, query: &str) -> Result<()> {
    if query.trim().chars().count() < MIN_QUERY_LEN {
        bail!("search query must be at least {MIN_QUERY_LEN} characters");
    }

    let service = WeatherService::new(&config.language)?;
    let results = service.search(query).await;
    if results.is_empty() {
        println!("No places found for \"{}\".", query.trim());
        return Ok(());
    }

    let selected = pick_location(results)?;
    println!();
    fetch_and_render(&service, selected.coordinates(), 0).await
}

/// The chosen place flows back to the caller as a plain return value; the
/// display is driven by whoever asked, not by a broadcast event.
fn pick_location(results: Vec<LocationSearchResult>) -> Result<LocationSearchResult> {
    if results.len() == 1 {
        return results
            .into_iter()
            .next()
            .context("search results were empty");
    }

    Select::new("Which place?", results)
        .prompt()
        .context("selection cancelled")
}

async fn configure(mut config: Config, query: Option<String>, language: Option<String>) -> Result<()> {
    if let Some(language) = language {
        config.language = language;
    }

    let query = match query {
        Some(q) => q,
        None => Text::new("Default place to show on startup:")
            .prompt()
            .context("input cancelled")?,
    };
    if query.trim().chars().count() < MIN_QUERY_LEN {
        bail!("search query must be at least {MIN_QUERY_LEN} characters");
    }

    let service = WeatherService::new(&config.language)?;
    let results = service.search(&query).await;
    if results.is_empty() {
        bail!("no places found for \"{}\"", query.trim());
    }

    let selected = pick_location(results)?;
    config.set_default_location(selected.name.clone(), selected.coordinates());
    config.save()?;

    println!(
        "Default location saved: {} ({:.4}, {:.4})",
        selected.name, selected.latitude, selected.longitude
    );
    println!("Config file: {}", Config::config_file_path()?.display());
    Ok(())
}
