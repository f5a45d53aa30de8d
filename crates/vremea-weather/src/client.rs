//! HTTP client for the search and forecast endpoints.

use crate::api::{ForecastResponse, SearchRecord};
use crate::types::{Place, WeatherError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("vremea/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Client against the public provider with the default timeout.
    pub fn with_api_key(api_key: Option<String>) -> Result<Self, WeatherError> {
        Self::new(
            DEFAULT_BASE_URL,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ranked place search for free text.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchRecord>, WeatherError> {
        self.get_json("search.json", &[("q", query)]).await
    }

    /// Current conditions plus a one-day hourly horizon, no air quality, no alerts.
    #[instrument(skip(self), fields(place = %place), level = "debug")]
    pub async fn forecast(&self, place: &Place) -> Result<ForecastResponse, WeatherError> {
        let query = place.query();
        self.get_json(
            "forecast.json",
            &[("q", query.as_str()), ("days", "1"), ("aqi", "no"), ("alerts", "no")],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("{} returned status {}", endpoint, status);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            WeatherApiClient::new("http://localhost:8080/v1/", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_default_client_points_at_provider() {
        let client = WeatherApiClient::with_api_key(Some("k".into())).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }
}
