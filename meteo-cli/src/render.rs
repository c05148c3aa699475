//! Terminal rendering of the dashboard panels.

use chrono::NaiveDate;
use meteo_core::WeatherSnapshot;

/// Hourly rows are sampled every three hours, like the dashboard's hourly
/// strip.
const HOURLY_STEP: usize = 3;

pub fn dashboard(snapshot: &WeatherSnapshot, day: usize) {
    location_header(snapshot);
    current_panel(snapshot);
    daily_strip(snapshot, day);
    hourly_panel(snapshot, day);
}

fn location_header(snapshot: &WeatherSnapshot) {
    let loc = &snapshot.location;
    let detail: Vec<&str> = [
        loc.subregion.as_str(),
        loc.region.as_str(),
        loc.country.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect();

    if detail.is_empty() {
        println!("{}", loc.name);
    } else {
        println!("{} ({})", loc.name, detail.join(", "));
    }
}

fn current_panel(snapshot: &WeatherSnapshot) {
    let current = &snapshot.current;
    println!();
    println!(
        "Now: {}  {:.1}°C (feels like {:.1}°C)",
        current.condition().description(),
        current.temperature,
        current.feels_like
    );
    println!(
        "     humidity {:.0}%   wind {:.1} km/h   precipitation {:.1} mm   UV {:.1}",
        current.humidity, current.wind_speed, current.precipitation, current.uv_index
    );
}

fn daily_strip(snapshot: &WeatherSnapshot, selected: usize) {
    println!();
    println!("Forecast:");
    for (i, entry) in snapshot.daily.iter().enumerate() {
        let marker = if i == selected { '>' } else { ' ' };
        println!(
            "{} {:<8} {:>5.1}° / {:<5.1}°  {:<14} rain {:>4.1} mm",
            marker,
            day_label(&entry.date, i),
            entry.max_temp,
            entry.min_temp,
            entry.condition().description(),
            entry.precipitation_sum,
        );
    }
}

fn hourly_panel(snapshot: &WeatherSnapshot, day: usize) {
    let Some(entry) = snapshot.daily.get(day) else {
        println!();
        println!("No forecast entry for day {day}.");
        return;
    };

    println!();
    println!(
        "Hours for {} (sunrise {}, sunset {}):",
        entry.date,
        time_label(&entry.sunrise),
        time_label(&entry.sunset)
    );
    for hour in snapshot.hourly_for(&entry.date).iter().step_by(HOURLY_STEP) {
        println!(
            "  {}  {:>5.1}°C  {:<14} {:>4.1} mm",
            time_label(&hour.time),
            hour.temperature,
            hour.condition().description(),
            hour.precipitation,
        );
    }
}

/// "Today" for the first row, weekday + day of month otherwise.
fn day_label(date: &str, index: usize) -> String {
    if index == 0 {
        return "Today".to_string();
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%a %d").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Trailing `HH:MM` of a provider-local timestamp.
fn time_label(value: &str) -> &str {
    value.split('T').nth(1).unwrap_or(value)
}
