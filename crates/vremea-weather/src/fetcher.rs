//! Forecast retrieval with degrade-to-fallback on failure.

use crate::client::WeatherApiClient;
use crate::types::{ForecastSnapshot, Place, WeatherError};

/// Entries kept from the provider's day horizon
pub const DEFAULT_HOURLY_LIMIT: usize = 24;

#[derive(Debug, Clone)]
pub struct ForecastFetcher {
    client: WeatherApiClient,
    fallback: Place,
    hourly_limit: usize,
}

impl ForecastFetcher {
    pub fn new(client: WeatherApiClient) -> Self {
        Self {
            client,
            fallback: Place::fallback(),
            hourly_limit: DEFAULT_HOURLY_LIMIT,
        }
    }

    pub fn with_fallback(mut self, fallback: Place) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_hourly_limit(mut self, hourly_limit: usize) -> Self {
        self.hourly_limit = hourly_limit;
        self
    }

    pub fn fallback(&self) -> &Place {
        &self.fallback
    }

    /// Fetch the forecast for `place`.
    ///
    /// - `Ok(None)`: `place` is missing a name or region; nothing was requested.
    /// - `Ok(Some(_))`: tagged with `place`, or with the fallback place
    ///   (`is_fallback`) when the requested place failed.
    /// - `Err(ProviderUnavailable)`: the fallback failed too.
    pub async fn fetch(&self, place: &Place) -> Result<Option<ForecastSnapshot>, WeatherError> {
        if !place.is_well_formed() {
            tracing::warn!(
                "Skipping forecast for malformed place: name={:?} region={:?}",
                place.name(),
                place.region()
            );
            return Ok(None);
        }

        let primary = match self.fetch_tagged(place, false).await {
            Ok(snapshot) => {
                tracing::info!("Fetched forecast for {}", place);
                return Ok(Some(snapshot));
            }
            Err(e) => e,
        };

        if place == &self.fallback {
            tracing::error!("Forecast for fallback place {} failed: {}", place, primary);
            return Err(WeatherError::ProviderUnavailable {
                primary: Box::new(primary),
                fallback: None,
            });
        }

        tracing::warn!(
            "Forecast for {} failed ({}), falling back to {}",
            place,
            primary,
            self.fallback
        );

        match self.fetch_tagged(&self.fallback, true).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(fallback) => {
                tracing::error!(
                    "Fallback forecast for {} failed too: {}",
                    self.fallback,
                    fallback
                );
                Err(WeatherError::ProviderUnavailable {
                    primary: Box::new(primary),
                    fallback: Some(Box::new(fallback)),
                })
            }
        }
    }

    async fn fetch_tagged(
        &self,
        place: &Place,
        is_fallback: bool,
    ) -> Result<ForecastSnapshot, WeatherError> {
        let response = self.client.forecast(place).await?;
        response.into_snapshot(place.clone(), is_fallback, self.hourly_limit)
    }
}
