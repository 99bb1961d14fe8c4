//! Current-weather lookup by coordinates

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::models::CurrentConditions;

pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";

#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions>;
}

/// OpenWeatherMap current-weather client (metric units)
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WeatherLookup for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        debug!("Requesting current weather for {:.4}, {:.4}", latitude, longitude);

        let response: openweather::CurrentResponse = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .with_context(|| "Failed to reach weather provider")?
            .error_for_status()?
            .json()
            .await
            .with_context(|| "Failed to parse OpenWeather response")?;

        response.try_into()
    }
}

/// `OpenWeather` API response structures
mod openweather {
    use super::{CurrentConditions, anyhow};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub main: MainData,
        #[serde(default)]
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainData {
        pub temp: f64,
    }

    impl TryFrom<CurrentResponse> for CurrentConditions {
        type Error = anyhow::Error;

        fn try_from(response: CurrentResponse) -> anyhow::Result<Self> {
            let description = response
                .weather
                .into_iter()
                .next()
                .map(|condition| condition.description)
                .ok_or(anyhow!("Weather response has no conditions"))?;

            Ok(CurrentConditions {
                description,
                temperature_celsius: response.main.temp,
                display_name: response.name,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_current_weather_parses_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "key-123"))
            .and(query_param("lat", "48.8566"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
                "main": {"temp": 14.2, "humidity": 81},
                "name": "Paris"
            })))
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(reqwest::Client::new(), mock_server.uri(), "key-123");
        let conditions = client.current(48.8566, 2.3522).await.unwrap();

        assert_eq!(conditions.description, "light rain");
        assert_eq!(conditions.temperature_celsius, 14.2);
        assert_eq!(conditions.display_name, "Paris");
    }

    #[tokio::test]
    async fn test_missing_conditions_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "weather": [],
                "main": {"temp": 1.0},
                "name": "Nowhere"
            })))
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(reqwest::Client::new(), mock_server.uri(), "k");
        assert!(client.current(0.0, 0.0).await.is_err());
    }

    #[tokio::test]
    async fn test_provider_error_status_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(reqwest::Client::new(), mock_server.uri(), "bad");
        assert!(client.current(1.0, 2.0).await.is_err());
    }
}
