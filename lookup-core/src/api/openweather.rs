use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::model::{Coordinates, SearchQuery, WeatherReport};

use super::{ApiError, WeatherApi};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeather backend: geocoding via `/geo/1.0/direct`, current weather via
/// `/data/2.5/weather`. Temperatures come back in Kelvin (no `units`
/// parameter is sent).
#[derive(Debug, Clone)]
pub struct OpenWeatherApi {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherApi {
    pub fn new(api_key: String) -> Self {
        Self::with_client(api_key, Client::new())
    }

    /// Use a pre-built HTTP client, e.g. one with a timeout configured.
    pub fn with_client(api_key: String, http: Client) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        }
    }

    /// Point the client at a different host. Used by tests against a mock
    /// server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "issuing request");

        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherApi {
    async fn geocode(&self, query: &SearchQuery) -> Result<Option<Coordinates>, ApiError> {
        let q = format!("{},{}", query.city, query.country);

        let matches: Vec<Coordinates> = self
            .get_json(
                "/geo/1.0/direct",
                &[
                    ("q", q.as_str()),
                    ("limit", "1"),
                    ("type", "like"),
                    ("appid", self.api_key.as_str()),
                ],
            )
            .await?;

        Ok(matches.into_iter().next())
    }

    async fn current_weather(&self, coords: Coordinates) -> Result<WeatherReport, ApiError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        self.get_json(
            "/data/2.5/weather",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
            ],
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // The cut must land on a char boundary or slicing panics.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer) -> OpenWeatherApi {
        OpenWeatherApi::new("KEY".to_string()).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn geocode_sends_expected_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Lima,PE"))
            .and(query_param("limit", "1"))
            .and(query_param("type", "like"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Lima", "lat": -12.05, "lon": -77.04, "country": "PE"}
            ])))
            .mount(&server)
            .await;

        let coords = api(&server)
            .geocode(&SearchQuery::new("Lima", "PE"))
            .await
            .expect("geocode should succeed")
            .expect("a match should be returned");

        assert_eq!(coords.lat, -12.05);
        assert_eq!(coords.lon, -77.04);
    }

    #[tokio::test]
    async fn geocode_empty_array_is_no_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let result = api(&server)
            .geocode(&SearchQuery::new("Nowhere", "XX"))
            .await
            .expect("geocode should succeed");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn current_weather_parses_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "-12.05"))
            .and(query_param("lon", "-77.04"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Lima",
                "main": {"temp": 293.1, "temp_max": 295.0, "temp_min": 291.0, "humidity": 77},
                "weather": [{"description": "clear sky"}],
                "cod": 200
            })))
            .mount(&server)
            .await;

        let report = api(&server)
            .current_weather(Coordinates {
                lat: -12.05,
                lon: -77.04,
            })
            .await
            .expect("weather fetch should succeed");

        assert_eq!(report.name, "Lima");
        assert_eq!(report.main.temp, 293.1);
    }

    #[tokio::test]
    async fn current_weather_rejects_malformed_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Lima",
                "main": {"temp_max": 295.0}
            })))
            .mount(&server)
            .await;

        let err = api(&server)
            .current_weather(Coordinates { lat: 0.0, lon: 0.0 })
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"cod": 401, "message": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let err = api(&server)
            .current_weather(Coordinates { lat: 0.0, lon: 0.0 })
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn truncate_body_caps_length() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert!(truncated.len() < long.len());
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        // 100 three-byte chars: byte 200 falls inside a character.
        let localized = "€".repeat(100);
        let truncated = truncate_body(&localized);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
        assert!(truncated.trim_end_matches("...").chars().all(|c| c == '€'));
    }
}
