//! Best-effort device location via IP geolocation.
//!
//! The dashboard only needs a city-scale starting point, so a single-shot
//! IP lookup stands in for a positioning service. The lookup resolves
//! within five seconds or not at all.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::model::Coordinates;

const IP_GEOLOCATION_URL: &str = "https://ipapi.co/json/";
const LOCATE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// One-shot lookup of the machine's approximate coordinates.
///
/// Every failure path (transport error, timeout, error status, missing or
/// out-of-range fields) returns `None` so the caller can fall back to its
/// own default location.
pub async fn current_location() -> Option<Coordinates> {
    current_location_from(IP_GEOLOCATION_URL).await
}

async fn current_location_from(url: &str) -> Option<Coordinates> {
    let client = match Client::builder()
        .timeout(Duration::from_secs(LOCATE_TIMEOUT_SECS))
        .build()
    {
        Ok(c) => c,
        Err(err) => {
            tracing::warn!(error = %err, "failed to build geolocation client");
            return None;
        }
    };

    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(err) => {
            tracing::debug!(error = %err, "ip geolocation request failed");
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!(status = %response.status(), "ip geolocation returned an error status");
        return None;
    }

    let body: IpApiResponse = match response.json().await {
        Ok(b) => b,
        Err(err) => {
            tracing::debug!(error = %err, "ip geolocation parse error");
            return None;
        }
    };

    let coordinates = Coordinates::new(body.latitude?, body.longitude?)?;
    tracing::debug!(
        lat = coordinates.latitude,
        lon = coordinates.longitude,
        "located via ip"
    );
    Some(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn resolves_coordinates_from_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 41.8448,
                "longitude": 2.7604,
                "city": "Vidreres"
            })))
            .mount(&server)
            .await;

        let located = current_location_from(&format!("{}/json/", server.uri())).await;
        assert_eq!(located, Coordinates::new(41.8448, 2.7604));
    }

    #[tokio::test]
    async fn error_status_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        assert!(
            current_location_from(&format!("{}/json/", server.uri()))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn missing_fields_degrade_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"city": "somewhere"})))
            .mount(&server)
            .await;

        assert!(
            current_location_from(&format!("{}/json/", server.uri()))
                .await
                .is_none()
        );
    }
}
