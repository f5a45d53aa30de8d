//! Place resolution: turn partial text into ranked candidate places.
//! Failures are silent; search is a convenience, not primary state.

use crate::client::WeatherApiClient;
use crate::types::{Place, WeatherError};

#[derive(Debug, Clone)]
pub struct PlaceResolver {
    client: WeatherApiClient,
}

impl PlaceResolver {
    pub fn new(client: WeatherApiClient) -> Self {
        Self { client }
    }

    /// Resolve `query` into candidates in the service's rank order.
    /// Returns an empty list when the search service fails.
    pub async fn resolve(&self, query: &str) -> Vec<Place> {
        match self.try_resolve(query).await {
            Ok(places) => places,
            Err(e) => {
                tracing::debug!("Place search unavailable for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but reports search failures.
    pub async fn try_resolve(&self, query: &str) -> Result<Vec<Place>, WeatherError> {
        let records = self.client.search(query).await?;
        let places: Vec<Place> = records.into_iter().map(|r| r.into_place()).collect();
        tracing::debug!("Resolved '{}' to {} candidates", query, places.len());
        Ok(places)
    }
}
