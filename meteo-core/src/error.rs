use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the upstream weather and geocoding services.
///
/// Only [`crate::provider::WeatherService::fetch_weather`] propagates these
/// to callers; the geocoding chain and the place search swallow them and
/// degrade to a safe value.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure before any HTTP status was received.
    #[error("request to {service} failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The body was not the JSON shape this service documents.
    #[error("failed to parse {service} response: {source}")]
    Parse {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The service answered successfully but with nothing usable.
    #[error("{service} returned no usable results")]
    NoResults { service: &'static str },
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut cut = MAX;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_caps_long_bodies() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }
}
